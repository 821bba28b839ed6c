//! Shrinks an image until it fits an attachment limit.
//!
//! The search is a fixed grid: JPEG quality steps down from
//! [`QUALITY_START`] to [`QUALITY_FLOOR`] at full size, then the image is
//! scaled down at the floor quality until [`SCALE_FLOOR_PERCENT`]. The first
//! encoding under the ceiling wins.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, Rgb, RgbImage};
use thiserror::Error;

pub const QUALITY_START: u8 = 90;
pub const QUALITY_FLOOR: u8 = 30;
pub const QUALITY_STEP: u8 = 10;
pub const SCALE_STEP_PERCENT: u8 = 10;
pub const SCALE_FLOOR_PERCENT: u8 = 30;

#[derive(Debug, Error)]
pub enum ReencodeError {
    #[error("could not decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("could not encode image: {0}")]
    Encode(#[source] ImageError),
    #[error("re-encode worker failed: {0}")]
    Worker(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub quality: u8,
    pub scale_percent: u8,
}

impl Attempt {
    pub fn scale(&self) -> f32 {
        f32::from(self.scale_percent) / 100.0
    }
}

#[derive(Clone, Debug)]
pub struct Reencoded {
    pub bytes: Vec<u8>,
    /// `None` when the input was returned untouched.
    pub attempt: Option<Attempt>,
    pub fits: bool,
}

/// Returns `bytes` unchanged when already within `ceiling`. Otherwise returns
/// the first grid point that fits, or the smallest encoding produced (never
/// larger than the input) when none does.
pub fn fit_within(bytes: &[u8], ceiling: usize) -> Result<Reencoded, ReencodeError> {
    if bytes.len() <= ceiling {
        return Ok(Reencoded {
            bytes: bytes.to_vec(),
            attempt: None,
            fits: true,
        });
    }

    let image = image::load_from_memory(bytes).map_err(ReencodeError::Decode)?;
    let flat = flatten_on_white(&image);
    let mut best: Option<(Vec<u8>, Attempt)> = None;

    let qualities = (QUALITY_FLOOR..=QUALITY_START)
        .rev()
        .step_by(usize::from(QUALITY_STEP));
    for quality in qualities {
        let attempt = Attempt {
            quality,
            scale_percent: 100,
        };
        let encoded = encode_jpeg(&flat, quality)?;
        tracing::debug!("re-encode q={quality} -> {} bytes", encoded.len());
        if encoded.len() <= ceiling {
            return Ok(fitted(encoded, attempt));
        }
        keep_smaller(&mut best, encoded, attempt);
    }

    let scales = (1..)
        .map(|i| 100 - i * SCALE_STEP_PERCENT)
        .take_while(|s| *s >= SCALE_FLOOR_PERCENT);
    for scale_percent in scales {
        let attempt = Attempt {
            quality: QUALITY_FLOOR,
            scale_percent,
        };
        let resized = scale(&flat, attempt.scale());
        let encoded = encode_jpeg(&resized, QUALITY_FLOOR)?;
        tracing::debug!(
            "re-encode q={QUALITY_FLOOR} scale={scale_percent}% -> {} bytes",
            encoded.len()
        );
        if encoded.len() <= ceiling {
            return Ok(fitted(encoded, attempt));
        }
        keep_smaller(&mut best, encoded, attempt);
    }

    match best {
        Some((encoded, attempt)) if encoded.len() < bytes.len() => Ok(Reencoded {
            bytes: encoded,
            attempt: Some(attempt),
            fits: false,
        }),
        _ => Ok(Reencoded {
            bytes: bytes.to_vec(),
            attempt: None,
            fits: false,
        }),
    }
}

/// [`fit_within`] on the blocking pool, keeping the async workers free.
pub async fn fit_within_blocking(
    bytes: bytes::Bytes,
    ceiling: usize,
) -> Result<Reencoded, ReencodeError> {
    tokio::task::spawn_blocking(move || fit_within(&bytes, ceiling))
        .await
        .map_err(|e| ReencodeError::Worker(e.to_string()))?
}

fn fitted(bytes: Vec<u8>, attempt: Attempt) -> Reencoded {
    Reencoded {
        bytes,
        attempt: Some(attempt),
        fits: true,
    }
}

fn keep_smaller(best: &mut Option<(Vec<u8>, Attempt)>, encoded: Vec<u8>, attempt: Attempt) {
    if best.as_ref().map_or(true, |(b, _)| encoded.len() < b.len()) {
        *best = Some((encoded, attempt));
    }
}

fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let pixel = rgba.get_pixel(x, y);
        let alpha = u16::from(pixel[3]);
        let blend =
            |channel: u8| -> u8 { (((u16::from(channel) * alpha) + (255 * (255 - alpha))) / 255) as u8 };
        Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])])
    })
}

fn scale(image: &RgbImage, factor: f32) -> RgbImage {
    let width = ((image.width() as f32 * factor) as u32).max(1);
    let height = ((image.height() as f32 * factor) as u32).max(1);
    image::imageops::resize(image, width, height, FilterType::Triangle)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ReencodeError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .map_err(ReencodeError::Encode)?;
    Ok(out)
}
