//! Luma keying and branded export framing for tattoo line-art stencils.
//!
//! A stencil is black line art on white paper, produced from a tattoo photo by
//! an external image generation service. This crate takes it from there: it
//! keys the paper to transparency, composites the stencil into a padded,
//! bordered frame with a brand footer, and produces the export artifacts (a
//! JPG, a transparent PNG and a print-ready page).
//!
//! # Quick Start
//!
//! ```no_run
//! use inklab_stencil::{compositor, keying, payload, ExportFrameSpec};
//!
//! let stencil = image::open("stencil.png").unwrap().to_rgba8();
//! let keyed = keying::key_transparent(&stencil);
//! let framed = compositor::composite(&keyed, true, &ExportFrameSpec::default()).unwrap();
//! println!("{}", payload::encode_png(&framed).unwrap().to_data_uri());
//! ```
//!
//! # Sessions
//!
//! [`StencilSession`] drives the whole flow around a [`StencilGenerator`]:
//!
//! ```no_run
//! use inklab_stencil::{
//!     EncodedPayload, ExportFormat, ExportFrameSpec, PassthroughGenerator, StencilSession,
//! };
//!
//! let mut session = StencilSession::new(PassthroughGenerator, ExportFrameSpec::default());
//! let upload = EncodedPayload::from_path("stencil.png".as_ref()).unwrap();
//! session.submit(upload).unwrap();
//! let artifact = session.export(ExportFormat::Png).unwrap();
//! artifact.write_to(artifact.file_name.as_ref()).unwrap();
//! ```

#![deny(missing_docs)]

pub mod compositor;
mod engine;
pub mod error;
pub mod export;
pub mod frame;
pub mod keying;
#[cfg(feature = "cli")]
pub mod logger;
pub mod payload;
pub mod print;
pub mod service;
pub mod session;
pub mod text;

pub use engine::{
    default_output_dir, is_supported_image, output_path, ProcessOptions, ProcessResult,
    StencilEngine,
};
pub use error::{Error, Result};
pub use export::{ArtifactContent, ExportArtifact, ExportFormat};
pub use frame::{Color, ExportFrameSpec, FrameLayout, TextLine};
pub use payload::{EncodedPayload, MimeType};
pub use service::{GenerationResponse, PassthroughGenerator, StencilGenerator};
pub use session::{PreviewMode, Status, StencilSession};
