use super::View;
use crate::ui::{Indicator, Output, UiState};
use std::sync::Mutex;
use tracing::{error, info};

/// Renders state transitions to the log and the final result to stdout.
pub struct ConsoleView {
    last: Mutex<Option<UiState>>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for ConsoleView {
    fn render(&self, state: &UiState) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let previous = last.replace(state.clone());

        let indicator_changed = previous.as_ref().map(|p| p.indicator) != Some(state.indicator);
        if indicator_changed {
            match state.indicator {
                Indicator::Busy => info!("Generating..."),
                Indicator::Idle => info!("Ready"),
            }
        }

        if previous.as_ref().map(|p| &p.output) == Some(&state.output) {
            return;
        }
        match &state.output {
            Output::Empty => {}
            Output::Image { src } => {
                info!("Image received ({} characters)", src.len());
                println!("{}", state.status_text);
            }
            Output::Error { text } => {
                error!("{}", text);
                eprintln!("{}", text);
            }
        }
    }
}
