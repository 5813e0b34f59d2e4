//! Rendering seam for the generation surface
//!
//! The controller owns [`UiState`](crate::ui::UiState) and hands a view a
//! snapshot after every change. A terminal front end and a recording view
//! for tests are provided.

pub mod console;
pub mod mock;

pub use console::ConsoleView;
pub use mock::RecordingView;

use crate::ui::UiState;

pub trait View: Send + Sync {
    /// Called with the controller's state lock held; must not call back into
    /// the controller.
    fn render(&self, state: &UiState);
}
