//! Observable UI state for a single generation surface.

use crate::capture::CapturedImage;
use crate::models::DEFAULT_STRENGTH;

pub const CONNECTION_ERROR_TEXT: &str = "Connection Error";
pub const DECODE_ERROR_TEXT: &str = "Image Decode Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Idle,
    Busy,
}

/// What the output area currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Empty,
    Image { src: String },
    Error { text: String },
}

impl Output {
    /// Visible text of the output area; an image has none.
    pub fn text(&self) -> &str {
        match self {
            Output::Error { text } => text,
            Output::Empty | Output::Image { .. } => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub is_loading: bool,
    pub trigger_enabled: bool,
    pub indicator: Indicator,
    pub uploaded_image: Option<CapturedImage>,
    pub strength: f32,
    pub elapsed_seconds: Option<f64>,
    pub status_text: String,
    pub output: Output,
}

impl UiState {
    pub fn new(strength: f32) -> Self {
        Self {
            is_loading: false,
            trigger_enabled: true,
            indicator: Indicator::Idle,
            uploaded_image: None,
            strength,
            elapsed_seconds: None,
            status_text: String::new(),
            output: Output::Empty,
        }
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        self.trigger_enabled = !loading;
        self.indicator = if loading {
            Indicator::Busy
        } else {
            Indicator::Idle
        };
    }

    /// Enter the loading state and wipe the previous result.
    pub(crate) fn begin(&mut self) {
        self.set_loading(true);
        self.elapsed_seconds = None;
        self.status_text.clear();
        self.output = Output::Empty;
    }

    pub(crate) fn show_image(&mut self, src: String, elapsed_seconds: f64) {
        self.output = Output::Image { src };
        self.elapsed_seconds = Some(elapsed_seconds);
        self.status_text = format!("Generated in {:.2}s", elapsed_seconds);
    }

    pub(crate) fn show_error(&mut self, text: String) {
        self.output = Output::Error { text };
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(DEFAULT_STRENGTH)
    }
}
