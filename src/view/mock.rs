use super::View;
use crate::ui::UiState;
use std::sync::{Arc, Mutex};

/// Keeps every rendered snapshot so tests can replay the transitions.
#[derive(Clone, Default)]
pub struct RecordingView {
    frames: Arc<Mutex<Vec<UiState>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<UiState> {
        self.frames.lock().unwrap().clone()
    }

    pub fn render_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<UiState> {
        self.frames.lock().unwrap().last().cloned()
    }

    /// The `is_loading` value of each frame where it differs from the one
    /// before, starting from idle.
    pub fn loading_transitions(&self) -> Vec<bool> {
        let frames = self.frames.lock().unwrap();
        let mut current = false;
        let mut transitions = Vec::new();
        for frame in frames.iter() {
            if frame.is_loading != current {
                current = frame.is_loading;
                transitions.push(current);
            }
        }
        transitions
    }
}

impl View for RecordingView {
    fn render(&self, state: &UiState) {
        self.frames.lock().unwrap().push(state.clone());
    }
}
