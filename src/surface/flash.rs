//! Torch toggle control

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::Notify;

#[derive(Debug)]
struct FlashState {
    label: String,
    visible: bool,
    disabled: bool,
}

/// Shared handle to a flash button
///
/// The session shows, hides, disables and relabels it; the caller only
/// reads its state and calls [`FlashButton::click`].
#[derive(Clone, Debug)]
pub struct FlashButton {
    state: Rc<RefCell<FlashState>>,
    clicked: Rc<Notify>,
}

impl FlashButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(FlashState {
                label: label.into(),
                visible: true,
                disabled: false,
            })),
            clicked: Rc::new(Notify::new()),
        }
    }

    pub fn label(&self) -> String {
        self.state.borrow().label.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    /// Press the button; ignored while hidden or disabled
    pub fn click(&self) -> bool {
        let state = self.state.borrow();
        if !state.visible || state.disabled {
            return false;
        }
        self.clicked.notify_one();
        true
    }

    /// Resolves on the next accepted click
    pub async fn clicked(&self) {
        self.clicked.notified().await;
    }

    pub(crate) fn set_label(&self, label: &str) {
        self.state.borrow_mut().label = label.to_string();
    }

    pub(crate) fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    pub(crate) fn set_disabled(&self, disabled: bool) {
        self.state.borrow_mut().disabled = disabled;
    }
}
