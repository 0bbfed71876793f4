//! Contract with the external stencil generation service.
//!
//! Generation itself is an opaque image-to-image call: the service receives
//! the source photo and a fixed instruction and answers with an image, or with
//! text when it refuses. Only the image answer can feed the pipeline.

use crate::error::{Error, Result};
use crate::payload::EncodedPayload;

/// Instruction sent along with every source photo.
pub const STENCIL_INSTRUCTION: &str = "Convert this tattoo photo into a clean tattoo stencil: \
     pure black line art on a plain white background. Trace every outline with crisp, \
     continuous lines of even weight, drop all shading, color, skin texture and lighting, \
     and keep the original composition and proportions. Output only the image.";

/// What the service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResponse {
    /// An inline image payload.
    Image(EncodedPayload),
    /// A text-only reply, typically a refusal.
    Text(String),
    /// No candidates at all.
    Empty,
}

impl GenerationResponse {
    /// Extract the stencil image, treating any other answer as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalService`] for text or empty responses.
    pub fn into_stencil(self) -> Result<EncodedPayload> {
        match self {
            Self::Image(payload) => Ok(payload),
            Self::Text(reply) if reply.trim().is_empty() => Err(Error::ExternalService(
                "the service returned no image".to_string(),
            )),
            Self::Text(reply) => Err(Error::ExternalService(format!(
                "the service returned text instead of an image: {}",
                reply.trim()
            ))),
            Self::Empty => Err(Error::ExternalService(
                "the service returned no candidates".to_string(),
            )),
        }
    }
}

/// An image-to-image service turning a tattoo photo into a stencil.
pub trait StencilGenerator {
    /// Send `source` with `instruction` and return the raw answer.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::ExternalService`] when the call itself fails.
    fn generate(&self, source: &EncodedPayload, instruction: &str) -> Result<GenerationResponse>;
}

impl<G: StencilGenerator + ?Sized> StencilGenerator for &G {
    fn generate(&self, source: &EncodedPayload, instruction: &str) -> Result<GenerationResponse> {
        (**self).generate(source, instruction)
    }
}

impl<G: StencilGenerator + ?Sized> StencilGenerator for Box<G> {
    fn generate(&self, source: &EncodedPayload, instruction: &str) -> Result<GenerationResponse> {
        (**self).generate(source, instruction)
    }
}

/// A generator that answers with the source itself.
///
/// Used when the input already is a stencil, e.g. for re-exporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughGenerator;

impl StencilGenerator for PassthroughGenerator {
    fn generate(&self, source: &EncodedPayload, _instruction: &str) -> Result<GenerationResponse> {
        Ok(GenerationResponse::Image(source.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MimeType;

    #[test]
    fn image_response_yields_payload() {
        let payload = EncodedPayload::new(MimeType::Png, vec![9, 9]);
        let stencil = GenerationResponse::Image(payload.clone())
            .into_stencil()
            .unwrap();
        assert_eq!(stencil, payload);
    }

    #[test]
    fn text_response_is_a_service_failure() {
        let err = GenerationResponse::Text("I can't help with that.".to_string())
            .into_stencil()
            .unwrap_err();
        assert!(matches!(err, Error::ExternalService(_)));
        assert!(err.to_string().contains("can't help"));
    }

    #[test]
    fn empty_responses_are_service_failures() {
        for response in [GenerationResponse::Empty, GenerationResponse::Text("  ".into())] {
            assert!(matches!(
                response.into_stencil(),
                Err(Error::ExternalService(_))
            ));
        }
    }

    #[test]
    fn passthrough_returns_source() {
        let source = EncodedPayload::new(MimeType::Jpeg, vec![1, 2, 3]);
        let response = PassthroughGenerator
            .generate(&source, STENCIL_INSTRUCTION)
            .unwrap();
        assert_eq!(response, GenerationResponse::Image(source));
    }
}
