use crate::errors::InvalidParamsError;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

/// Largest font size Word accepts, in points.
pub const MAX_FONT_SIZE_PT: f64 = 1638.0;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{6}$").expect("regex"));

/// Accept `RRGGBB` or `#RRGGBB` and return the upper-case digits.
pub fn normalize_hex_color(tool: &'static str, field: &str, value: &str) -> Result<String> {
    let digits = value.trim().trim_start_matches('#');
    if !HEX_COLOR_RE.is_match(digits) {
        return Err(InvalidParamsError::new(
            tool,
            format!("invalid color '{value}': expected 6 hex digits like 'FF0000' or '#FF0000'"),
        )
        .with_path(field)
        .into());
    }
    Ok(digits.to_ascii_uppercase())
}

/// Strip control characters other than newline and tab.
pub fn sanitize_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

pub fn ensure_positive(tool: &'static str, field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(
            InvalidParamsError::new(tool, format!("{field} must be a positive integer"))
                .with_path(field)
                .into(),
        );
    }
    Ok(())
}

pub fn validate_font_size(tool: &'static str, points: f64) -> Result<u32> {
    if !points.is_finite() || !(1.0..=MAX_FONT_SIZE_PT).contains(&points) {
        return Err(InvalidParamsError::new(
            tool,
            format!("font_size {points} is out of range (1-{MAX_FONT_SIZE_PT} points)"),
        )
        .with_path("text_format.font_size")
        .into());
    }
    Ok((points * 2.0).round() as u32)
}
