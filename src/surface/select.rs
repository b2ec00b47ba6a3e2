//! Device selection list

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::Notify;

/// One entry of the selection list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Default)]
struct SelectState {
    options: Vec<SelectOption>,
    value: String,
}

/// Shared handle to a camera selection list
///
/// `set_value` is the programmatic setter and stays silent; `select`
/// models a user choice and raises a change event when the value moves.
#[derive(Clone, Debug, Default)]
pub struct CameraSelect {
    state: Rc<RefCell<SelectState>>,
    changed: Rc<Notify>,
}

impl CameraSelect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.state.borrow().options.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push_option(&self, option: SelectOption) {
        let mut state = self.state.borrow_mut();
        if state.options.is_empty() {
            state.value = option.value.clone();
        }
        state.options.push(option);
    }

    /// Current value; empty when nothing is selected
    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    /// Set the value without raising a change event
    ///
    /// Values that match no option clear the selection.
    pub fn set_value(&self, value: &str) {
        let mut state = self.state.borrow_mut();
        state.value = if state.options.iter().any(|o| o.value == value) {
            value.to_string()
        } else {
            String::new()
        };
    }

    /// Choose an option as a user would; returns whether the value changed
    pub fn select(&self, value: &str) -> bool {
        let before = self.value();
        self.set_value(value);
        let moved = self.value() != before;
        if moved {
            self.changed.notify_one();
        }
        moved
    }

    /// Resolves on the next change event
    pub async fn changed(&self) {
        self.changed.notified().await;
    }
}
