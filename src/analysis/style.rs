use super::{BorderFacts, BorderSide, CellView, MarkupError, normalize_horizontal};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextFormatSnapshot {
    pub font_family: Option<String>,
    /// Points.
    pub font_size: Option<f64>,
    pub font_color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underlined: Option<bool>,
    pub strikethrough: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AlignmentSnapshot {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundSnapshot {
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BordersSnapshot {
    pub top: Option<BorderFacts>,
    pub bottom: Option<BorderFacts>,
    pub left: Option<BorderFacts>,
    pub right: Option<BorderFacts>,
}

impl BordersSnapshot {
    pub fn side_mut(&mut self, side: BorderSide) -> &mut Option<BorderFacts> {
        match side {
            BorderSide::Top => &mut self.top,
            BorderSide::Bottom => &mut self.bottom,
            BorderSide::Left => &mut self.left,
            BorderSide::Right => &mut self.right,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BorderFacts> {
        [&self.top, &self.bottom, &self.left, &self.right]
            .into_iter()
            .flatten()
    }
}

/// Explicit formatting overrides found on a cell. Absent values are
/// inherited from paragraph, table or document styles and are not resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CellStyle {
    pub text_format: TextFormatSnapshot,
    pub alignment: AlignmentSnapshot,
    pub background: BackgroundSnapshot,
    pub borders: BordersSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleExtraction {
    pub style: CellStyle,
    pub failures: Vec<MarkupError>,
}

pub fn extract_cell_style(cell: &dyn CellView) -> StyleExtraction {
    let mut out = StyleExtraction::default();
    let style = &mut out.style;
    let failures = &mut out.failures;

    match cell.paragraph_alignment() {
        Ok(value) => style.alignment.horizontal = value.as_deref().map(normalize_horizontal),
        Err(err) => failures.push(err),
    }

    match cell.first_run() {
        Ok(Some(run)) => {
            style.text_format = TextFormatSnapshot {
                font_family: run.font_family,
                font_size: run.half_points.map(|half| f64::from(half) / 2.0),
                font_color: run.color,
                bold: Some(run.bold.unwrap_or(false)),
                italic: Some(run.italic.unwrap_or(false)),
                underlined: Some(run.underline.unwrap_or(false)),
                strikethrough: Some(run.strike.unwrap_or(false)),
            };
        }
        Ok(None) => {}
        Err(err) => failures.push(err),
    }

    let markup = cell.markup();

    match markup.shading_fill() {
        Ok(fill) => style.background.color = fill,
        Err(err) => failures.push(err),
    }

    match markup.vertical_alignment() {
        Ok(value) => style.alignment.vertical = value.map(|v| v.to_ascii_lowercase()),
        Err(err) => failures.push(err),
    }

    for side in BorderSide::iter() {
        match markup.border(side) {
            Ok(border) => *style.borders.side_mut(side) = border,
            Err(err) => failures.push(err),
        }
    }

    out
}
