//! One stencil project from upload to export.
//!
//! A session walks `Idle -> Processing -> Success | Error`. A successful
//! submission keeps the original upload, the generated stencil and its keyed
//! preview; any failure drops them so the user starts over with a new upload.

use image::RgbaImage;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::export::{self, ExportArtifact, ExportFormat};
use crate::frame::ExportFrameSpec;
use crate::keying;
use crate::payload::{self, EncodedPayload};
use crate::service::{StencilGenerator, STENCIL_INSTRUCTION};

/// Where a session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Waiting for an upload.
    Idle,
    /// A submission is being generated.
    Processing,
    /// A stencil is ready to preview and export.
    Success,
    /// The last submission failed with this message.
    Error(String),
}

/// Which stencil variant to preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    /// The stencil as generated, on white.
    #[default]
    Clean,
    /// The stencil with its background keyed out.
    Transparent,
}

struct Results {
    original: EncodedPayload,
    stencil: RgbaImage,
    transparent: RgbaImage,
}

/// Orchestrates generation, preview and export for one user.
pub struct StencilSession<G> {
    generator: G,
    spec: ExportFrameSpec,
    status: Status,
    results: Option<Results>,
}

impl<G: StencilGenerator> StencilSession<G> {
    /// Create an idle session around a generation service.
    pub fn new(generator: G, spec: ExportFrameSpec) -> Self {
        Self {
            generator,
            spec,
            status: Status::Idle,
            results: None,
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Frame configuration used for exports.
    #[must_use]
    pub fn spec(&self) -> &ExportFrameSpec {
        &self.spec
    }

    /// The upload behind the current stencil.
    #[must_use]
    pub fn original(&self) -> Option<&EncodedPayload> {
        self.results.as_ref().map(|r| &r.original)
    }

    /// Submit a source photo and generate its stencil.
    ///
    /// Replaces any previous results. On failure the status carries the error
    /// message and no partial results are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalService`] if the service yields no image and
    /// [`Error::Decode`] if its image cannot be decoded.
    pub fn submit(&mut self, source: EncodedPayload) -> Result<()> {
        self.results = None;
        self.status = Status::Processing;

        match self.generate(&source) {
            Ok(stencil) => {
                let transparent = keying::key_transparent(&stencil);
                info!(
                    width = stencil.width(),
                    height = stencil.height(),
                    "stencil generated"
                );
                self.results = Some(Results {
                    original: source,
                    stencil,
                    transparent,
                });
                self.status = Status::Success;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "stencil generation failed");
                self.status = Status::Error(e.to_string());
                Err(e)
            }
        }
    }

    fn generate(&self, source: &EncodedPayload) -> Result<RgbaImage> {
        // make sure the upload itself is readable before calling out
        source.decode()?;
        self.generator
            .generate(source, STENCIL_INSTRUCTION)?
            .into_stencil()?
            .decode()
    }

    /// The chosen stencil variant as a PNG payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if there is no stencil yet, or an encoding
    /// error.
    pub fn preview(&self, mode: PreviewMode) -> Result<EncodedPayload> {
        let results = self.ready()?;
        let img = match mode {
            PreviewMode::Clean => &results.stencil,
            PreviewMode::Transparent => &results.transparent,
        };
        payload::encode_png(img)
    }

    /// Export the current stencil.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if there is no stencil yet, or any
    /// compositing or encoding failure.
    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact> {
        let results = self.ready()?;
        export::export_with_keyed(&results.stencil, &results.transparent, format, &self.spec)
    }

    /// Drop all results and return to `Idle`.
    pub fn reset(&mut self) {
        self.results = None;
        self.status = Status::Idle;
    }

    fn ready(&self) -> Result<&Results> {
        self.results.as_ref().ok_or(Error::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{GenerationResponse, PassthroughGenerator};
    use image::Rgba;

    struct Refusing;

    impl StencilGenerator for Refusing {
        fn generate(&self, _: &EncodedPayload, _: &str) -> Result<GenerationResponse> {
            Ok(GenerationResponse::Text("cannot process this image".to_string()))
        }
    }

    fn upload() -> EncodedPayload {
        let img = RgbaImage::from_fn(8, 8, |x, y| {
            if x == y {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        payload::encode_png(&img).unwrap()
    }

    #[test]
    fn new_session_is_idle_without_results() {
        let session = StencilSession::new(PassthroughGenerator, ExportFrameSpec::default());
        assert_eq!(*session.status(), Status::Idle);
        assert!(session.original().is_none());
        assert!(matches!(
            session.preview(PreviewMode::Clean),
            Err(Error::NotReady)
        ));
        assert!(matches!(
            session.export(ExportFormat::Png),
            Err(Error::NotReady)
        ));
    }

    #[test]
    fn successful_submit_enables_preview_and_export() {
        let mut session = StencilSession::new(PassthroughGenerator, ExportFrameSpec::default());
        session.submit(upload()).unwrap();
        assert_eq!(*session.status(), Status::Success);
        assert_eq!(session.original(), Some(&upload()));

        let clean = session.preview(PreviewMode::Clean).unwrap().decode().unwrap();
        let keyed = session.preview(PreviewMode::Transparent).unwrap().decode().unwrap();
        assert_eq!(clean.get_pixel(1, 0)[3], 255);
        assert_eq!(keyed.get_pixel(1, 0)[3], 0);
        assert_eq!(keyed.get_pixel(3, 3)[3], 255);

        let artifact = session.export(ExportFormat::Jpg).unwrap();
        assert_eq!(artifact.file_name, "EasyInkLab-stencil.jpg");
    }

    #[test]
    fn png_export_frames_the_preview_image() {
        let mut session = StencilSession::new(PassthroughGenerator, ExportFrameSpec::default());
        session.submit(upload()).unwrap();

        let results = session.ready().unwrap();
        let expected = export::export_with_keyed(
            &results.stencil,
            &results.transparent,
            ExportFormat::Png,
            session.spec(),
        )
        .unwrap();
        assert_eq!(session.export(ExportFormat::Png).unwrap(), expected);
    }

    #[test]
    fn refusal_sets_error_status() {
        let mut session = StencilSession::new(Refusing, ExportFrameSpec::default());
        let err = session.submit(upload()).unwrap_err();
        assert!(matches!(err, Error::ExternalService(_)));
        let Status::Error(message) = session.status() else {
            panic!("expected error status");
        };
        assert!(message.contains("cannot process"));
        assert!(session.original().is_none());
    }

    #[test]
    fn undecodable_upload_fails_before_generation() {
        let mut session = StencilSession::new(PassthroughGenerator, ExportFrameSpec::default());
        let bogus = EncodedPayload::new(crate::payload::MimeType::Png, vec![0; 4]);
        assert!(matches!(session.submit(bogus), Err(Error::Decode(_))));
        assert!(matches!(session.status(), Status::Error(_)));
    }

    #[test]
    fn failed_resubmit_discards_previous_stencil() {
        let generator: Box<dyn StencilGenerator> = Box::new(PassthroughGenerator);
        let mut session = StencilSession::new(generator, ExportFrameSpec::default());
        session.submit(upload()).unwrap();
        let bogus = EncodedPayload::new(crate::payload::MimeType::Png, vec![1]);
        assert!(session.submit(bogus).is_err());
        assert!(session.export(ExportFormat::Png).is_err());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut session = StencilSession::new(PassthroughGenerator, ExportFrameSpec::default());
        session.submit(upload()).unwrap();
        session.reset();
        assert_eq!(*session.status(), Status::Idle);
        assert!(session.preview(PreviewMode::Transparent).is_err());
    }
}
