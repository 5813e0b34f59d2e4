//! Lifecycle of a single "generate" action.

use crate::api::{GenerateClient, GenerationService};
use crate::capture::ImageCapture;
use crate::image::{DataUrlDecoder, DecodedImage, ImageDecoder};
use crate::models::{validate_strength, Config, GenerationRequest};
use crate::ui::{UiState, CONNECTION_ERROR_TEXT, DECODE_ERROR_TEXT};
use crate::view::View;
use crate::{Error, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How a call to [`GenerationController::generate`] ended.
///
/// None of these is fatal; the controller is ready for another attempt
/// after every one of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The prompt was blank. Nothing was sent and nothing changed.
    Skipped,
    /// Another generation was already in flight.
    Busy,
    Generated {
        src: String,
        image: DecodedImage,
        elapsed: Duration,
    },
    ServiceError(String),
    TransportError(String),
    DecodeFailed(String),
}

impl Outcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, Outcome::Generated { .. })
    }
}

/// Injectable collaborators used to construct a [`GenerationController`].
pub struct ControllerServices {
    pub service: Arc<dyn GenerationService>,
    pub decoder: Arc<dyn ImageDecoder>,
    pub view: Arc<dyn View>,
}

pub struct GenerationController {
    service: Arc<dyn GenerationService>,
    decoder: Arc<dyn ImageDecoder>,
    view: Arc<dyn View>,
    capture: ImageCapture,
    state: Mutex<UiState>,
    in_flight: AtomicBool,
    seed: Option<u64>,
    guidance_scale: Option<f32>,
}

/// Resets the loading state when a generation leaves scope, however it
/// leaves.
struct LoadingGuard<'a> {
    controller: &'a GenerationController,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.controller.update(|state| state.set_loading(false));
        self.controller.in_flight.store(false, Ordering::Release);
    }
}

impl GenerationController {
    pub fn with_services(
        services: ControllerServices,
        capture: ImageCapture,
        strength: f32,
    ) -> Self {
        Self {
            service: services.service,
            decoder: services.decoder,
            view: services.view,
            capture,
            state: Mutex::new(UiState::new(strength)),
            in_flight: AtomicBool::new(false),
            seed: None,
            guidance_scale: None,
        }
    }

    /// Wire the HTTP client and image decoder described by `config`.
    pub fn from_config(config: &Config, view: Arc<dyn View>) -> Result<Self> {
        info!("Backend: {}", config.base_url);
        let service = GenerateClient::new(config)?;

        Ok(Self::with_services(
            ControllerServices {
                service: Arc::new(service),
                decoder: Arc::new(DataUrlDecoder::new()),
                view,
            },
            ImageCapture::new(config.max_upload_bytes),
            config.default_strength,
        ))
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: Option<f32>) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    /// Snapshot of the current UI state.
    pub fn state(&self) -> UiState {
        self.lock_state().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Read a reference image from disk and attach it to later requests.
    ///
    /// A rejected file leaves the previously captured image in place.
    pub async fn capture_image(&self, path: &Path) -> Result<()> {
        let captured = self.capture.read(path).await?;
        self.update(|state| state.uploaded_image = Some(captured));
        Ok(())
    }

    pub fn clear_image(&self) {
        self.update(|state| state.uploaded_image = None);
    }

    pub fn set_strength(&self, strength: f32) -> Result<()> {
        let strength = validate_strength(strength)?;
        self.update(|state| state.strength = strength);
        Ok(())
    }

    pub async fn generate(&self, prompt: &str) -> Outcome {
        let (image, strength) = {
            let state = self.lock_state();
            (
                state.uploaded_image.as_ref().map(|i| i.data_url.clone()),
                state.strength,
            )
        };

        let Some(request) = GenerationRequest::new(prompt, image, strength) else {
            debug!("Ignoring generate trigger with a blank prompt");
            return Outcome::Skipped;
        };
        let request = request
            .with_seed(self.seed)
            .with_guidance_scale(self.guidance_scale);

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Generation already in flight; ignoring trigger");
            return Outcome::Busy;
        }
        let _guard = LoadingGuard { controller: self };

        self.update(UiState::begin);
        info!("Generating image for prompt: {}", request.prompt);
        let started = Instant::now();

        self.run(&request, started).await
    }

    async fn run(&self, request: &GenerationRequest, started: Instant) -> Outcome {
        let src = match self.service.generate(request).await {
            Ok(src) => src,
            Err(Error::Service(detail)) => {
                warn!("Generation rejected by backend: {}", detail);
                let text = format!("Error: {}", detail);
                self.update(|state| state.show_error(text));
                return Outcome::ServiceError(detail);
            }
            Err(e) => {
                error!("Generation request failed: {}", e);
                self.update(|state| state.show_error(CONNECTION_ERROR_TEXT.to_string()));
                return Outcome::TransportError(e.to_string());
            }
        };

        match self.decoder.decode(&src).await {
            Ok(image) => {
                let elapsed = started.elapsed();
                info!(
                    "Generated {}x{} {} in {:.2}s",
                    image.width,
                    image.height,
                    image.mime,
                    elapsed.as_secs_f64()
                );
                let shown = src.clone();
                self.update(|state| state.show_image(shown, elapsed.as_secs_f64()));
                Outcome::Generated {
                    src,
                    image,
                    elapsed,
                }
            }
            Err(e) => {
                error!("Returned image could not be decoded: {}", e);
                self.update(|state| state.show_error(DECODE_ERROR_TEXT.to_string()));
                Outcome::DecodeFailed(e.to_string())
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, UiState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply a mutation and render it. The lock is held across the render so
    /// the view sees snapshots in the order they were made.
    fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut UiState),
    {
        let mut state = self.lock_state();
        mutate(&mut state);
        self.view.render(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockReply, MOCK_IMAGE_SRC};
    use crate::api::MockGenerationClient;
    use crate::image::MockImageDecoder;
    use crate::ui::{Indicator, Output};
    use crate::view::RecordingView;
    use pretty_assertions::assert_eq;

    struct Harness {
        controller: GenerationController,
        service: Arc<MockGenerationClient>,
        decoder: Arc<MockImageDecoder>,
        view: RecordingView,
    }

    fn harness_with(service: MockGenerationClient, decoder: MockImageDecoder) -> Harness {
        let service = Arc::new(service);
        let decoder = Arc::new(decoder);
        let view = RecordingView::new();

        let controller = GenerationController::with_services(
            ControllerServices {
                service: service.clone(),
                decoder: decoder.clone(),
                view: Arc::new(view.clone()),
            },
            ImageCapture::default(),
            0.8,
        );

        Harness {
            controller,
            service,
            decoder,
            view,
        }
    }

    fn harness() -> Harness {
        harness_with(MockGenerationClient::new(), MockImageDecoder::new())
    }

    #[tokio::test]
    async fn test_blank_prompt_is_noop() {
        let h = harness();
        let before = h.controller.state();

        for prompt in ["", "   ", "\n\t "] {
            assert_eq!(h.controller.generate(prompt).await, Outcome::Skipped);
        }

        assert_eq!(h.service.get_call_count(), 0);
        assert_eq!(h.view.render_count(), 0);
        assert_eq!(h.controller.state(), before);
    }

    #[tokio::test]
    async fn test_success_renders_image_and_elapsed() {
        let h = harness();

        let outcome = h.controller.generate("a cat").await;
        assert!(outcome.is_generated());

        let state = h.controller.state();
        assert_eq!(
            state.output,
            Output::Image {
                src: MOCK_IMAGE_SRC.to_string()
            }
        );
        assert!(state.status_text.starts_with("Generated in "));
        assert!(state.status_text.ends_with('s'));
        assert!(state.elapsed_seconds.is_some());
        assert!(!state.is_loading);
        assert!(state.trigger_enabled);
        assert_eq!(state.indicator, Indicator::Idle);
        assert_eq!(h.decoder.decoded_sources(), vec![MOCK_IMAGE_SRC]);
    }

    #[tokio::test]
    async fn test_start_clears_previous_output_before_request() {
        let h = harness_with(
            MockGenerationClient::new()
                .with_reply(MockReply::Image(MOCK_IMAGE_SRC.to_string()))
                .with_reply(MockReply::Service("bad prompt".to_string())),
            MockImageDecoder::new(),
        );

        h.controller.generate("first").await;
        h.controller.generate("second").await;

        let frames = h.view.frames();
        let second_start = frames
            .iter()
            .rposition(|f| f.is_loading && f.output == Output::Empty)
            .unwrap();
        assert!(frames[second_start].status_text.is_empty());
        assert!(frames[second_start].elapsed_seconds.is_none());
        assert_eq!(h.controller.state().output.text(), "Error: bad prompt");
    }

    #[tokio::test]
    async fn test_loading_toggles_once_per_outcome() {
        let replies = [
            MockReply::Image(MOCK_IMAGE_SRC.to_string()),
            MockReply::Service("bad prompt".to_string()),
            MockReply::Transport("connection refused".to_string()),
        ];

        for reply in replies {
            let h = harness_with(
                MockGenerationClient::new().with_reply(reply),
                MockImageDecoder::new(),
            );

            h.controller.generate("a cat").await;

            assert_eq!(h.view.loading_transitions(), vec![true, false]);
            assert!(!h.view.last().unwrap().is_loading);
            assert!(!h.controller.state().is_loading);
            assert!(!h.controller.is_in_flight());
        }
    }

    #[tokio::test]
    async fn test_service_error_text() {
        let h = harness_with(
            MockGenerationClient::new().with_reply(MockReply::Service("bad prompt".to_string())),
            MockImageDecoder::new(),
        );

        let outcome = h.controller.generate("a cat").await;

        assert_eq!(outcome, Outcome::ServiceError("bad prompt".to_string()));
        assert_eq!(h.controller.state().output.text(), "Error: bad prompt");
        assert_eq!(h.decoder.get_decode_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_text() {
        let h = harness_with(
            MockGenerationClient::new()
                .with_reply(MockReply::Transport("connection refused".to_string())),
            MockImageDecoder::new(),
        );

        let outcome = h.controller.generate("a cat").await;

        assert!(matches!(outcome, Outcome::TransportError(_)));
        assert_eq!(h.controller.state().output.text(), "Connection Error");
    }

    #[tokio::test]
    async fn test_decode_failure_shows_error_without_status() {
        let h = harness_with(
            MockGenerationClient::new(),
            MockImageDecoder::new().with_failure(true),
        );

        let outcome = h.controller.generate("a cat").await;

        assert!(matches!(outcome, Outcome::DecodeFailed(_)));
        let state = h.controller.state();
        assert_eq!(state.output.text(), "Image Decode Error");
        assert!(state.status_text.is_empty());
        assert!(state.elapsed_seconds.is_none());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_request_carries_strength_and_no_image() {
        let h = harness();
        h.controller.set_strength(0.35).unwrap();

        h.controller.generate("  a cat  ").await;

        let requests = h.service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "a cat");
        assert_eq!(requests[0].height, 1024);
        assert_eq!(requests[0].width, 1024);
        assert_eq!(requests[0].steps, 8);
        assert_eq!(requests[0].image, None);
        assert_eq!(requests[0].strength, Some(0.35));
    }

    #[tokio::test]
    async fn test_seed_and_guidance_are_forwarded() {
        let service = Arc::new(MockGenerationClient::new());
        let controller = GenerationController::with_services(
            ControllerServices {
                service: service.clone(),
                decoder: Arc::new(MockImageDecoder::new()),
                view: Arc::new(RecordingView::new()),
            },
            ImageCapture::default(),
            0.8,
        )
        .with_seed(Some(42))
        .with_guidance_scale(Some(0.0));

        controller.generate("a cat").await;

        let request = &service.requests()[0];
        assert_eq!(request.seed, Some(42));
        assert_eq!(request.guidance_scale, Some(0.0));
    }

    #[tokio::test]
    async fn test_invalid_strength_is_rejected() {
        let h = harness();

        let err = h.controller.set_strength(1.5).unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(h.controller.state().strength, 0.8);
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_busy() {
        let h = harness_with(
            MockGenerationClient::new().with_delay(Duration::from_millis(100)),
            MockImageDecoder::new(),
        );

        let (first, second) = tokio::join!(h.controller.generate("one"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            h.controller.generate("two").await
        });

        assert!(first.is_generated());
        assert_eq!(second, Outcome::Busy);
        assert_eq!(h.service.get_call_count(), 1);
        assert_eq!(h.view.loading_transitions(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_dropped_generation_still_cleans_up() {
        let h = harness_with(
            MockGenerationClient::new().with_delay(Duration::from_secs(5)),
            MockImageDecoder::new(),
        );

        let result =
            tokio::time::timeout(Duration::from_millis(20), h.controller.generate("a cat")).await;
        assert!(result.is_err());

        let state = h.controller.state();
        assert!(!state.is_loading);
        assert!(state.trigger_enabled);
        assert!(!h.controller.is_in_flight());
        assert_eq!(h.view.loading_transitions(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_capture_then_clear_sends_null_image() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ref.gif");
        std::fs::write(&path, b"GIF89a\x01\x00\x01\x00").unwrap();
        let h = harness();

        h.controller.capture_image(&path).await.unwrap();
        let captured = h.controller.state().uploaded_image.unwrap();
        assert!(captured.data_url.starts_with("data:image/gif;base64,"));

        h.controller.generate("with image").await;
        h.controller.clear_image();
        h.controller.generate("without image").await;

        let requests = h.service.requests();
        assert_eq!(requests[0].image.as_deref(), Some(captured.data_url.as_str()));
        assert_eq!(requests[1].image, None);
    }

    #[tokio::test]
    async fn test_rejected_capture_keeps_previous_image() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("ref.gif");
        let bad = dir.path().join("notes.txt");
        std::fs::write(&good, b"GIF89a\x01\x00\x01\x00").unwrap();
        std::fs::write(&bad, b"hello").unwrap();
        let h = harness();

        h.controller.capture_image(&good).await.unwrap();
        assert!(h.controller.capture_image(&bad).await.is_err());

        let uploaded = h.controller.state().uploaded_image.unwrap();
        assert_eq!(uploaded.file_name, "ref.gif");
    }

    #[tokio::test]
    async fn test_elapsed_includes_decode_time() {
        let decode_delay = Duration::from_millis(200);
        let h = harness_with(
            MockGenerationClient::new(),
            MockImageDecoder::new().with_delay(decode_delay),
        );

        let outcome = h.controller.generate("a cat").await;

        match outcome {
            Outcome::Generated { elapsed, .. } => assert!(elapsed >= decode_delay),
            other => panic!("expected generated image, got {:?}", other),
        }
        let state = h.controller.state();
        assert!(state.elapsed_seconds.unwrap() >= decode_delay.as_secs_f64());
        assert_eq!(h.view.last().unwrap(), state);
    }

    #[tokio::test]
    async fn test_dropped_during_decode_still_cleans_up() {
        let h = harness_with(
            MockGenerationClient::new(),
            MockImageDecoder::new().with_delay(Duration::from_secs(5)),
        );

        let result =
            tokio::time::timeout(Duration::from_millis(50), h.controller.generate("a cat")).await;
        assert!(result.is_err());

        assert_eq!(h.service.get_call_count(), 1);
        assert!(!h.controller.state().is_loading);
        assert!(!h.controller.is_in_flight());
        assert_eq!(h.view.loading_transitions(), vec![true, false]);
        assert_eq!(h.view.last().unwrap().output, Output::Empty);
    }

    #[test]
    fn test_view_ends_on_latest_state_under_contention() {
        let h = harness();
        let controller = &h.controller;

        std::thread::scope(|s| {
            for worker in 0..4u32 {
                s.spawn(move || {
                    for n in 0..200u32 {
                        controller
                            .set_strength(((worker + n) % 11) as f32 / 10.0)
                            .unwrap();
                        if n % 7 == 0 {
                            controller.clear_image();
                        }
                    }
                });
            }
        });

        assert_eq!(h.view.last().unwrap(), controller.state());
    }
}
