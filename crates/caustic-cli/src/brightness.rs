//! Target image loading and brightness extraction.
//!
//! A target image enters the pipeline as a scalar field holding one
//! brightness value per pixel, the plain average of the red, green and
//! blue channels. The image is scaled first and cropped second, so crop
//! coordinates always refer to the scaled image.

use std::path::Path;

use anyhow::{Context, Result};
use caustic_core::ScalarField;
use image::{DynamicImage, imageops::FilterType};
use tracing::{debug, info};

/// Pixel-aligned crop rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Parses a `LEFT,TOP,WIDTH,HEIGHT` crop string.
pub fn parse_crop(spec: &str) -> Result<CropRect, String> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!(
            "expected LEFT,TOP,WIDTH,HEIGHT, got {} value(s)",
            parts.len()
        ));
    }

    let mut values = [0u32; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{part}' is not a pixel count"))?;
    }

    let [left, top, width, height] = values;
    if width == 0 || height == 0 {
        return Err("crop width and height must be positive".to_string());
    }

    Ok(CropRect {
        left,
        top,
        width,
        height,
    })
}

/// Loads an image file and reduces it to a per-pixel brightness field.
pub fn load_brightness(path: &Path, scale: f64, crop: Option<CropRect>) -> Result<ScalarField> {
    info!("Loading target image from {:?}", path);
    let image = image::open(path).with_context(|| format!("Failed to open image {:?}", path))?;
    brightness_field(image, scale, crop)
}

fn brightness_field(
    mut image: DynamicImage,
    scale: f64,
    crop: Option<CropRect>,
) -> Result<ScalarField> {
    if scale != 1.0 {
        if scale <= 0.0 || !scale.is_finite() {
            return Err(anyhow::anyhow!("scale must be a positive number, got {scale}"));
        }
        let width = (f64::from(image.width()) * scale).round() as u32;
        let height = (f64::from(image.height()) * scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(anyhow::anyhow!("scaling by {scale} leaves no pixels"));
        }
        debug!(
            "scaling image from {}x{} to {width}x{height}",
            image.width(),
            image.height()
        );
        image = image.resize_exact(width, height, FilterType::Triangle);
    }

    if let Some(rect) = crop {
        let right = u64::from(rect.left) + u64::from(rect.width);
        let bottom = u64::from(rect.top) + u64::from(rect.height);
        if right > u64::from(image.width()) || bottom > u64::from(image.height()) {
            return Err(anyhow::anyhow!(
                "crop rectangle (left {}, top {}, {}x{}) exceeds the {}x{} scaled image",
                rect.left,
                rect.top,
                rect.width,
                rect.height,
                image.width(),
                image.height()
            ));
        }
        debug!(
            "cropping {}x{} region at ({}, {})",
            rect.width, rect.height, rect.left, rect.top
        );
        image = image.crop_imm(rect.left, rect.top, rect.width, rect.height);
    }

    let rgb = image.to_rgb8();
    Ok(ScalarField::from_fn(
        rgb.width() as usize,
        rgb.height() as usize,
        |x, y| {
            let [r, g, b] = rgb.get_pixel(x as u32, y as u32).0;
            (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0
        },
    ))
}
