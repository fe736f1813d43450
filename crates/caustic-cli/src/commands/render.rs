//! caustic render command - draw a scalar field CSV as a grayscale image.

use std::path::Path;

use anyhow::{Context, Result};
use caustic_core::{ScalarField, load_scalar_csv};
use colored::Colorize;
use image::{Rgb, RgbImage};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct RenderResult {
    input: String,
    output: String,
    width: usize,
    height: usize,
    max_value: f64,
    clipped_pixels: usize,
}

pub fn run(input: &Path, output_path: &Path, cli: &Cli) -> Result<()> {
    let field = load_scalar_csv(input)?;
    let (pixels, max_value, clipped_pixels) = draw_field(&field)?;

    pixels
        .save(output_path)
        .with_context(|| format!("Failed to save image to {:?}", output_path))?;

    let result = RenderResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        width: field.width(),
        height: field.height(),
        max_value,
        clipped_pixels,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Rendered {} to {}", input.display(), output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                println!("  {}: {}x{} pixels", "Size".cyan(), result.width, result.height);
                println!("  {}: {:.6}", "Max value".cyan(), result.max_value);
                if result.clipped_pixels > 0 {
                    println!(
                        "  {}: {} value(s) outside 0..=255 drawn red",
                        "Clipped".yellow(),
                        result.clipped_pixels
                    );
                }
            }
        }
    }

    Ok(())
}

/// Draws one pixel per element, scaled so the largest element lands on 255.
///
/// Elements the scale cannot place in `0..=255` are drawn red. That covers
/// negative values and anything that turns non-finite under the scale, so a
/// bad solve shows up in the picture instead of wrapping around silently.
fn draw_field(field: &ScalarField) -> Result<(RgbImage, f64, usize)> {
    let max_value = field.max()?;
    let factor = 255.0 / max_value;

    let mut clipped = 0usize;
    let mut pixels = RgbImage::new(field.width() as u32, field.height() as u32);
    for y in 0..field.height() {
        for x in 0..field.width() {
            let value = (field.get(x, y) * factor).round() as i32;
            let pixel = if (0..256).contains(&value) {
                let gray = value as u8;
                Rgb([gray, gray, gray])
            } else {
                clipped += 1;
                Rgb([255, 0, 0])
            };
            pixels.put_pixel(x as u32, y as u32, pixel);
        }
    }

    Ok((pixels, max_value, clipped))
}
