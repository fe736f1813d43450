//! CSV persistence for fields and lenses.
//!
//! Scalar fields serialize as one text row per grid row of comma-separated
//! numbers. Vector fields serialize as scattered `x, y, vx, vy` records,
//! one per line; readers accept the records in any order and size the
//! field from the largest coordinates seen. Positions missing from a
//! vector document default to the zero vector.
//!
//! [`save_csv`], [`load_scalar_csv`] and [`load_vector_csv`] wrap the text
//! forms in file I/O.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use nalgebra::Vector2;
use tracing::debug;

use crate::error::{CausticError, CausticResult};
use crate::lens::Lens;
use crate::scalar::ScalarField;
use crate::vector::VectorField;

/// Serialization into the CSV interchange format of the pipeline.
pub trait CsvExport {
    /// Renders the value as CSV text.
    fn to_csv(&self) -> String;
}

impl CsvExport for ScalarField {
    fn to_csv(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height() {
            let row: Vec<String> = (0..self.width())
                .map(|x| self.get(x, y).to_string())
                .collect();
            out.push_str(&row.join(", "));
            out.push('\n');
        }
        out
    }
}

impl CsvExport for VectorField {
    fn to_csv(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height() {
            for x in 0..self.width() {
                let v = self.get(x, y);
                out.push_str(&format!("{x}, {y}, {}, {}\n", v.x, v.y));
            }
        }
        out
    }
}

impl CsvExport for Lens {
    /// A lens serializes as the vector field of its vertex positions.
    fn to_csv(&self) -> String {
        self.positions().to_csv()
    }
}

/// Parses a scalar field from rows of comma-separated numbers.
///
/// Blank lines are skipped. All rows must have the same number of values,
/// and the document must contain at least one row.
pub fn parse_scalar_field(text: &str) -> CausticResult<ScalarField> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let mut row = Vec::with_capacity(rows.first().map_or(0, Vec::len));
        for cell in line.split(',') {
            row.push(parse_number::<f64>(cell, "value", line_number)?);
        }
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(CausticError::malformed_csv(
                    line_number,
                    format!(
                        "row has {} values but earlier rows have {}",
                        row.len(),
                        first.len()
                    ),
                ));
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(CausticError::malformed_csv(1, "document contains no rows"));
    }
    let width = rows[0].len();
    let height = rows.len();
    Ok(ScalarField::from_fn(width, height, |x, y| rows[y][x]))
}

/// Largest element count a parsed vector field may declare.
///
/// The reader sizes the field from the largest coordinates present in the
/// document, so this bounds what a single record can make it allocate.
pub const MAX_FIELD_ELEMENTS: usize = 1 << 24;

/// Parses a vector field from scattered `x, y, vx, vy` records.
///
/// Records may appear in any order; a repeated position keeps the last
/// record. The field spans from the origin to the largest coordinates in
/// the document; documents declaring more than [`MAX_FIELD_ELEMENTS`]
/// elements are rejected as malformed.
pub fn parse_vector_field(text: &str) -> CausticResult<VectorField> {
    let mut records: Vec<(usize, usize, Vector2<f64>)> = Vec::new();
    let mut max_x = 0;
    let mut max_y = 0;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != 4 {
            return Err(CausticError::malformed_csv(
                line_number,
                format!("expected 4 values, got {}", parts.len()),
            ));
        }
        let x = parse_number::<usize>(parts[0], "x coordinate", line_number)?;
        let y = parse_number::<usize>(parts[1], "y coordinate", line_number)?;
        let vx = parse_number::<f64>(parts[2], "x component", line_number)?;
        let vy = parse_number::<f64>(parts[3], "y component", line_number)?;
        max_x = max_x.max(x);
        max_y = max_y.max(y);
        records.push((x, y, Vector2::new(vx, vy)));
    }

    if records.is_empty() {
        return Err(CausticError::malformed_csv(
            1,
            "document contains no records",
        ));
    }

    let too_large = match (max_x.checked_add(1), max_y.checked_add(1)) {
        (Some(width), Some(height)) => match width.checked_mul(height) {
            Some(elements) => elements > MAX_FIELD_ELEMENTS,
            None => true,
        },
        _ => true,
    };
    if too_large {
        return Err(CausticError::malformed_csv(
            1,
            format!("coordinates declare a field larger than {MAX_FIELD_ELEMENTS} elements"),
        ));
    }

    let mut field = VectorField::zeros(max_x + 1, max_y + 1);
    for (x, y, v) in records {
        field.set(x, y, v);
    }
    Ok(field)
}

fn parse_number<T: FromStr>(cell: &str, what: &str, line_number: usize) -> CausticResult<T> {
    let trimmed = cell.trim();
    trimmed.parse::<T>().map_err(|_| {
        CausticError::malformed_csv(line_number, format!("`{trimmed}` is not a valid {what}"))
    })
}

/// Writes a value's CSV rendering to `path`.
pub fn save_csv(value: &impl CsvExport, path: &Path) -> CausticResult<()> {
    debug!("saving field CSV to {:?}", path);
    fs::write(path, value.to_csv()).map_err(|e| CausticError::io_write(path, e))
}

/// Loads a scalar field from the CSV file at `path`.
pub fn load_scalar_csv(path: &Path) -> CausticResult<ScalarField> {
    debug!("loading scalar field CSV from {:?}", path);
    let text = fs::read_to_string(path).map_err(|e| CausticError::io_read(path, e))?;
    parse_scalar_field(&text)
}

/// Loads a vector field from the CSV file at `path`.
pub fn load_vector_csv(path: &Path) -> CausticResult<VectorField> {
    debug!("loading vector field CSV from {:?}", path);
    let text = fs::read_to_string(path).map_err(|e| CausticError::io_read(path, e))?;
    parse_vector_field(&text)
}
