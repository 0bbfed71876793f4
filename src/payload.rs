//! Self-describing encoded image payloads and data URIs.

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgb, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// Quality used for JPEG exports.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// MIME types accepted and produced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
}

impl MimeType {
    /// The MIME string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// The `image` format used to decode payloads of this type.
    #[must_use]
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    /// Map a detected image format to a supported MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMimeType`] for anything but PNG or JPEG.
    pub fn from_image_format(format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Png => Ok(Self::Png),
            ImageFormat::Jpeg => Ok(Self::Jpeg),
            other => Err(Error::UnsupportedMimeType(other.to_mime_type().to_string())),
        }
    }
}

impl FromStr for MimeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            other => Err(Error::UnsupportedMimeType(other.to_string())),
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded image bytes tagged with their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Encoding of `bytes`.
    pub mime: MimeType,
    /// The encoded image.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedPayload")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl EncodedPayload {
    /// Wrap already-encoded bytes.
    #[must_use]
    pub fn new(mime: MimeType, bytes: Vec<u8>) -> Self {
        Self { mime, bytes }
    }

    /// Parse a `data:<mime>;base64,<data>` URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayload`] if the URI is malformed or the data is
    /// not valid base64, and [`Error::UnsupportedMimeType`] for types other
    /// than PNG and JPEG.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidPayload("missing 'data:' prefix".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidPayload("missing ',' separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidPayload("payload is not base64 encoded".into()))?;

        let mime: MimeType = mime.parse()?;
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| Error::InvalidPayload(format!("bad base64 data: {e}")))?;
        if bytes.is_empty() {
            return Err(Error::InvalidPayload("empty image data".into()));
        }

        Ok(Self { mime, bytes })
    }

    /// Read an image file, detecting its type from the content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Decode`] if
    /// its content is not a recognizable image format, and
    /// [`Error::UnsupportedMimeType`] for images other than PNG and JPEG.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let format = image::guess_format(&bytes).map_err(Error::Decode)?;
        Ok(Self {
            mime: MimeType::from_image_format(format)?,
            bytes,
        })
    }

    /// Format as a `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Decode into an RGBA raster using the format named by the MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes are not a valid image of that type.
    pub fn decode(&self) -> Result<RgbaImage> {
        let img = image::load_from_memory_with_format(&self.bytes, self.mime.image_format())
            .map_err(Error::Decode)?;
        Ok(img.to_rgba8())
    }
}

/// Encode a raster losslessly as PNG, alpha included.
///
/// # Errors
///
/// Returns [`Error::Image`] if encoding fails.
pub fn encode_png(img: &RgbaImage) -> Result<EncodedPayload> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(EncodedPayload::new(MimeType::Png, bytes))
}

/// Encode a raster as JPEG, compositing any transparency onto white first.
///
/// # Errors
///
/// Returns [`Error::Image`] if encoding fails.
pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> Result<EncodedPayload> {
    let flat = flatten_onto_white(img);
    let mut cursor = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut cursor, quality).write_image(
        flat.as_raw(),
        flat.width(),
        flat.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(EncodedPayload::new(MimeType::Jpeg, cursor.into_inner()))
}

/// Source-over composite of `img` onto an opaque white page.
#[must_use]
pub fn flatten_onto_white(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let px = img.get_pixel(x, y);
        let alpha = u16::from(px[3]);
        let mix = |c: u8| {
            let v = (u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255;
            // v <= 255 since it is a convex combination of two bytes
            #[allow(clippy::cast_possible_truncation)]
            {
                v as u8
            }
        };
        Rgb([mix(px[0]), mix(px[1]), mix(px[2])])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> RgbaImage {
        RgbaImage::from_fn(6, 4, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 0])
            }
        })
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let img = checker();
        let payload = encode_png(&img).unwrap();
        assert_eq!(payload.mime, MimeType::Png);
        assert_eq!(payload.decode().unwrap(), img);
    }

    #[test]
    fn data_uri_round_trip() {
        let payload = encode_png(&checker()).unwrap();
        let uri = payload.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(EncodedPayload::from_data_uri(&uri).unwrap(), payload);
    }

    #[test]
    fn jpeg_payload_decodes_to_same_size() {
        let img = RgbaImage::from_pixel(16, 9, Rgba([40, 40, 40, 255]));
        let payload = encode_jpeg(&img, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(payload.mime, MimeType::Jpeg);
        let uri = payload.to_data_uri();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(payload.decode().unwrap().dimensions(), (16, 9));
    }

    #[test]
    fn flatten_puts_transparency_on_white() {
        let img = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let flat = flatten_onto_white(&img);
        assert_eq!(*flat.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*flat.get_pixel(1, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn mime_parsing() {
        assert_eq!("image/png".parse::<MimeType>().unwrap(), MimeType::Png);
        assert_eq!("IMAGE/JPEG".parse::<MimeType>().unwrap(), MimeType::Jpeg);
        assert_eq!("image/jpg".parse::<MimeType>().unwrap(), MimeType::Jpeg);
        assert!(matches!(
            "image/gif".parse::<MimeType>(),
            Err(Error::UnsupportedMimeType(_))
        ));
    }

    #[test]
    fn malformed_data_uris_are_rejected() {
        for uri in [
            "image/png;base64,AAAA",
            "data:image/png;base64",
            "data:image/png,AAAA",
            "data:image/png;base64,!!!!",
            "data:image/png;base64,",
        ] {
            assert!(
                matches!(EncodedPayload::from_data_uri(uri), Err(Error::InvalidPayload(_))),
                "{uri} should be rejected"
            );
        }
        assert!(matches!(
            EncodedPayload::from_data_uri("data:image/gif;base64,R0lGOD=="),
            Err(Error::UnsupportedMimeType(_))
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let payload = EncodedPayload::new(MimeType::Png, b"not a png".to_vec());
        assert!(matches!(payload.decode(), Err(Error::Decode(_))));
    }

    #[test]
    fn from_path_detects_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stencil.bin");
        std::fs::write(&path, encode_png(&checker()).unwrap().bytes).unwrap();
        let payload = EncodedPayload::from_path(&path).unwrap();
        assert_eq!(payload.mime, MimeType::Png);
    }

    #[test]
    fn from_path_separates_unknown_and_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();

        let notes = dir.path().join("notes.png");
        std::fs::write(&notes, b"just some text").unwrap();
        assert!(matches!(
            EncodedPayload::from_path(&notes),
            Err(Error::Decode(_))
        ));

        let bitmap = dir.path().join("stencil.bmp");
        checker().save(&bitmap).unwrap();
        assert!(matches!(
            EncodedPayload::from_path(&bitmap),
            Err(Error::UnsupportedMimeType(_))
        ));
    }
}
