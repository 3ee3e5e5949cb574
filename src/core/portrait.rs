//! One portrait edit: compose the request, make one call, pull out one image.

use std::sync::atomic::{AtomicBool, Ordering};

use super::color::ColorVariant;
use super::data_url;
use super::error::PortraitError;
use super::prompt::compose_instructions;
use crate::api::{
    Content, ContentPart, GenerateRequest, GenerateResponse, GeminiClient, GenerationBackend,
    GenerationConfig,
};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// MIME type every generated portrait is wrapped with
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// Portrait generation client.
///
/// Stateless between calls apart from the in-flight flag, which rejects a
/// second call while one is still outstanding.
pub struct PortraitGenerator<B = GeminiClient> {
    backend: B,
    model: String,
    in_flight: AtomicBool,
}

impl<B: GenerationBackend> PortraitGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            model: DEFAULT_MODEL.to_string(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Edit `subject` so the person wears the branded hoodie in `color`.
    ///
    /// Returns the generated image as a `data:image/png;base64,` URL. Fails
    /// with [`PortraitError::NoImageProduced`] when the first candidate's
    /// first part carries no image, and passes backend failures through
    /// unchanged. Never retries.
    pub async fn generate(
        &self,
        subject: &str,
        reference: Option<&str>,
        color: ColorVariant,
        adjustment: &str,
    ) -> Result<String, PortraitError> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let request = build_request(subject, reference, color, adjustment);

        tracing::info!(
            model = %self.model,
            color = color.as_str(),
            with_reference = reference.is_some(),
            "Generating portrait"
        );

        let response = match self.backend.generate_content(&self.model, &request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Gemini API error: {}", e);
                return Err(e);
            }
        };

        extract_image(&response)
    }
}

/// Build the generateContent body: subject image, optional reference image,
/// then the instructions. The model conditions on that order.
pub fn build_request(
    subject: &str,
    reference: Option<&str>,
    color: ColorVariant,
    adjustment: &str,
) -> GenerateRequest {
    let mut parts = Vec::with_capacity(3);

    let subject = data_url::decode(subject);
    parts.push(ContentPart::inline_data(subject.mime_type, subject.data));

    if let Some(reference) = reference {
        let reference = data_url::decode(reference);
        parts.push(ContentPart::inline_data(reference.mime_type, reference.data));
    }

    parts.push(ContentPart::text(compose_instructions(color, adjustment)));

    GenerateRequest {
        contents: vec![Content { parts, role: None }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
        }),
    }
}

/// Wrap the image in the first part of the first candidate as a PNG data URL
pub fn extract_image(response: &GenerateResponse) -> Result<String, PortraitError> {
    match response.first_part().and_then(ContentPart::as_inline_data) {
        Some(inline) => Ok(data_url::encode(OUTPUT_MIME_TYPE, &inline.data)),
        None => {
            if let Some(reason) = response.refusal_reason() {
                tracing::warn!("Generation refused: {}", reason);
            }
            Err(PortraitError::NoImageProduced)
        }
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, PortraitError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PortraitError::GenerationInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    use crate::core::prompt::ADJUSTMENTS_MARKER;

    /// Records every request and answers with a canned response
    struct FakeBackend {
        reply: Mutex<Option<Result<GenerateResponse, PortraitError>>>,
        seen: Mutex<Vec<(String, GenerateRequest)>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn replying(body: serde_json::Value) -> Self {
            Self {
                reply: Mutex::new(Some(Ok(serde_json::from_value(body).unwrap()))),
                seen: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn failing(err: PortraitError) -> Self {
            Self {
                reply: Mutex::new(Some(Err(err))),
                seen: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn parts(&self) -> Vec<ContentPart> {
            self.seen.lock().unwrap()[0].1.contents[0].parts.clone()
        }
    }

    #[async_trait]
    impl GenerationBackend for FakeBackend {
        async fn generate_content(
            &self,
            model: &str,
            request: &GenerateRequest,
        ) -> Result<GenerateResponse, PortraitError> {
            self.seen
                .lock()
                .unwrap()
                .push((model.to_string(), request.clone()));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(GenerateResponse::default()))
        }
    }

    fn image_reply(data: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "image/jpeg", "data": data } }] },
                "finishReason": "STOP"
            }]
        })
    }

    fn text_of(part: &ContentPart) -> &str {
        match part {
            ContentPart::Text { text } => text,
            other => panic!("expected text part, got {:?}", other),
        }
    }

    #[test]
    fn request_without_reference_has_one_image_then_text() {
        let request = build_request("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "");
        let parts = &request.contents[0].parts;

        assert_eq!(parts.len(), 2);
        let subject = parts[0].as_inline_data().unwrap();
        assert_eq!(subject.mime_type, "image/jpeg");
        assert_eq!(subject.data, "AAA");
        assert!(!text_of(&parts[1]).contains(ADJUSTMENTS_MARKER));
        assert_eq!(
            request
                .generation_config
                .as_ref()
                .unwrap()
                .response_modalities
                .as_deref(),
            Some(&["IMAGE".to_string()][..])
        );
    }

    #[test]
    fn request_with_reference_puts_subject_first() {
        let request = build_request(
            "data:image/jpeg;base64,AAA",
            Some("data:image/png;base64,BBB"),
            ColorVariant::White,
            "",
        );
        let parts = &request.contents[0].parts;

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].as_inline_data().unwrap().data, "AAA");
        assert_eq!(parts[1].as_inline_data().unwrap().data, "BBB");
        assert_eq!(parts[1].as_inline_data().unwrap().mime_type, "image/png");
        assert!(parts[2].as_inline_data().is_none());
    }

    #[tokio::test]
    async fn end_to_end_with_reference_and_adjustment() {
        let generator = PortraitGenerator::new(FakeBackend::replying(image_reply("CCC")));

        let result = generator
            .generate(
                "data:image/jpeg;base64,AAA",
                Some("data:image/png;base64,BBB"),
                ColorVariant::Black,
                "brighter lighting",
            )
            .await
            .unwrap();

        assert_eq!(result, "data:image/png;base64,CCC");

        let seen = generator.backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, DEFAULT_MODEL);
        drop(seen);

        let parts = generator.backend.parts();
        assert_eq!(parts.len(), 3);
        let subject = parts[0].as_inline_data().unwrap();
        assert_eq!((subject.mime_type.as_str(), subject.data.as_str()), ("image/jpeg", "AAA"));
        let reference = parts[1].as_inline_data().unwrap();
        assert_eq!((reference.mime_type.as_str(), reference.data.as_str()), ("image/png", "BBB"));
        let text = text_of(&parts[2]);
        assert!(text.contains("The hoodie must be black."));
        assert!(text.ends_with("Additional User Adjustments: brighter lighting"));
    }

    #[tokio::test]
    async fn output_is_always_wrapped_as_png() {
        let generator = PortraitGenerator::new(FakeBackend::replying(image_reply("XYZ")))
            .with_model("gemini-3-pro-image-preview");
        let result = generator
            .generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "")
            .await
            .unwrap();
        assert_eq!(result, "data:image/png;base64,XYZ");
        assert_eq!(generator.backend.seen.lock().unwrap()[0].0, "gemini-3-pro-image-preview");
    }

    #[tokio::test]
    async fn inline_data_without_mime_type_is_wrapped_as_png() {
        let generator = PortraitGenerator::new(FakeBackend::replying(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "CCC" } }] } }]
        })));
        let result = generator
            .generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "")
            .await
            .unwrap();
        assert_eq!(result, "data:image/png;base64,CCC");
    }

    #[tokio::test]
    async fn dropped_call_releases_the_flag() {
        let gate = Arc::new(Notify::new());
        let mut backend = FakeBackend::replying(image_reply("TWO"));
        backend.gate = Some(gate.clone());
        let generator = PortraitGenerator::new(backend);

        let cut_off = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            generator.generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, ""),
        )
        .await;
        assert!(cut_off.is_err());
        assert!(!generator.is_busy());

        // Lets the next call through the gate
        gate.notify_one();
        let result = generator
            .generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "")
            .await
            .unwrap();
        assert_eq!(result, "data:image/png;base64,TWO");
        assert_eq!(generator.backend.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn text_only_reply_is_no_image() {
        let generator = PortraitGenerator::new(FakeBackend::replying(serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "I can't do that" },
                    { "inlineData": { "mimeType": "image/png", "data": "LATE" } }
                ] },
                "finishReason": "STOP"
            }]
        })));

        let err = generator
            .generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "")
            .await
            .unwrap_err();
        assert!(matches!(err, PortraitError::NoImageProduced));
        assert_eq!(err.to_string(), "No image generated.");
    }

    #[tokio::test]
    async fn empty_reply_is_no_image() {
        let generator = PortraitGenerator::new(FakeBackend::replying(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })));
        let err = generator
            .generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "")
            .await
            .unwrap_err();
        assert!(matches!(err, PortraitError::NoImageProduced));
    }

    #[tokio::test]
    async fn backend_errors_pass_through_unchanged() {
        let generator = PortraitGenerator::new(FakeBackend::failing(PortraitError::Api {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        }));

        let err = generator
            .generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "")
            .await
            .unwrap_err();
        match err {
            PortraitError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Resource has been exhausted");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!generator.is_busy());
    }

    #[tokio::test]
    async fn overlapping_call_is_rejected_until_first_finishes() {
        let gate = Arc::new(Notify::new());
        let mut backend = FakeBackend::replying(image_reply("ONE"));
        backend.gate = Some(gate.clone());
        let generator = Arc::new(PortraitGenerator::new(backend));

        let first = {
            let generator = generator.clone();
            tokio::spawn(async move {
                generator
                    .generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "")
                    .await
            })
        };

        while !generator.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = generator
            .generate("data:image/jpeg;base64,AAA", None, ColorVariant::Green, "")
            .await;
        assert!(matches!(second, Err(PortraitError::GenerationInProgress)));

        gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), "data:image/png;base64,ONE");
        assert!(!generator.is_busy());
    }
}
