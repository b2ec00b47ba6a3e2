//! Video display surface a camera stream is bound to

use std::cell::RefCell;
use std::rc::Rc;

use crate::platform::MediaStream;

struct VideoState<S> {
    src_object: Option<S>,
    paused: bool,
    ended: bool,
    autoplay: bool,
    clear_on_pause: bool,
    /// Stream detached by the last pause when `clear_on_pause` is set
    stashed: Option<S>,
}

/// Shared handle to a video element-like surface
///
/// Binding a stream starts playback when autoplay is on (the default).
/// With clear-on-pause enabled, pausing detaches the stream and the
/// next `play` puts it back.
pub struct VideoSurface<S> {
    state: Rc<RefCell<VideoState<S>>>,
}

impl<S> Clone for VideoSurface<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<S> Default for VideoSurface<S> {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(VideoState {
                src_object: None,
                paused: true,
                ended: false,
                autoplay: true,
                clear_on_pause: false,
                stashed: None,
            })),
        }
    }
}

impl<S: MediaStream> VideoSurface<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface that stays paused after a stream is bound until `play`
    pub fn without_autoplay() -> Self {
        let surface = Self::default();
        surface.state.borrow_mut().autoplay = false;
        surface
    }

    /// Bind or unbind the stream shown by this surface
    pub fn set_src_object(&self, stream: Option<S>) {
        let mut state = self.state.borrow_mut();
        let bound = stream.is_some();
        if bound {
            // a newly bound stream supersedes whatever the last pause detached
            state.stashed = None;
        }
        state.src_object = stream;
        state.ended = false;
        if bound && state.autoplay {
            state.paused = false;
        }
    }

    pub fn src_object(&self) -> Option<S> {
        self.state.borrow().src_object.clone()
    }

    pub fn has_src_object(&self) -> bool {
        self.state.borrow().src_object.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    pub fn is_ended(&self) -> bool {
        self.state.borrow().ended
    }

    /// Mark playback as finished, e.g. when the stream's source went away
    pub fn set_ended(&self, ended: bool) {
        self.state.borrow_mut().ended = ended;
    }

    pub(crate) fn set_clear_on_pause(&self, enabled: bool) {
        self.state.borrow_mut().clear_on_pause = enabled;
    }

    /// Pause playback; a no-op when already paused
    pub fn pause(&self) {
        let mut state = self.state.borrow_mut();
        if state.paused {
            return;
        }
        state.paused = true;
        if state.clear_on_pause {
            state.stashed = state.src_object.take();
            log::debug!("Video paused, stream detached");
        } else {
            log::debug!("Video paused");
        }
    }

    /// Resume playback, reattaching a stream detached by `pause`
    pub fn play(&self) {
        let mut state = self.state.borrow_mut();
        if state.clear_on_pause {
            if let Some(stream) = state.stashed.take() {
                state.src_object = Some(stream);
            }
        }
        state.paused = false;
        state.ended = false;
        log::debug!("Video playing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockStream;

    #[test]
    fn test_binding_starts_playback() {
        let video = VideoSurface::new();
        assert!(video.is_paused());
        assert!(!video.has_src_object());

        video.set_src_object(Some(MockStream::new("cam-1", 64, 48)));
        assert!(!video.is_paused());
        assert_eq!(video.src_object().map(|s| s.id().to_string()), Some("cam-1".into()));
    }

    #[test]
    fn test_without_autoplay_stays_paused() {
        let video = VideoSurface::without_autoplay();
        video.set_src_object(Some(MockStream::new("cam-1", 64, 48)));
        assert!(video.is_paused());
        video.play();
        assert!(!video.is_paused());
    }

    #[test]
    fn test_pause_keeps_stream_by_default() {
        let video = VideoSurface::new();
        video.set_src_object(Some(MockStream::new("cam-1", 64, 48)));
        video.pause();
        assert!(video.is_paused());
        assert!(video.has_src_object());
    }

    #[test]
    fn test_clear_on_pause_detaches_and_play_reattaches() {
        let video = VideoSurface::new();
        video.set_clear_on_pause(true);
        video.set_src_object(Some(MockStream::new("cam-1", 64, 48)));

        video.pause();
        assert!(!video.has_src_object());

        // a second pause must not overwrite the stash with nothing
        video.pause();

        video.play();
        assert!(!video.is_paused());
        assert_eq!(video.src_object().map(|s| s.id().to_string()), Some("cam-1".into()));
    }

    #[test]
    fn test_rebinding_while_paused_drops_stash() {
        let video = VideoSurface::new();
        video.set_clear_on_pause(true);
        let first = MockStream::new("cam-a", 64, 48);
        video.set_src_object(Some(first.clone()));
        video.pause();

        // camera switch while detached: old tracks stop, new stream bound
        first.stop_tracks();
        video.set_src_object(Some(MockStream::new("cam-b", 32, 24)));
        video.play();

        assert_eq!(video.src_object().map(|s| s.id().to_string()), Some("cam-b".into()));
        assert!(video.src_object().and_then(|s| s.current_frame()).is_some());
    }
}
