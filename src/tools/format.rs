use super::param_enums::{BorderStyle, BorderWidth, HorizontalAlignment, VerticalAlignment};
use super::with_session;
use crate::analysis::BorderSide;
use crate::document::edit::{self, BorderSpec, TextFormat};
use crate::errors::InvalidParamsError;
use crate::model::FormatCellResponse;
use crate::state::AppState;
use crate::validation::{normalize_hex_color, validate_font_size};
use anyhow::Result;
use docx_rs::TableCell;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TextFormatInput {
    #[serde(default)]
    pub font_family: Option<String>,
    /// Points, 1 to 1638.
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Hex colour, `RRGGBB` or `#RRGGBB`.
    #[serde(default)]
    pub font_color: Option<String>,
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub italic: Option<bool>,
    #[serde(default)]
    pub underline: Option<bool>,
    #[serde(default)]
    pub strikethrough: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AlignmentInput {
    #[serde(default)]
    pub horizontal: Option<HorizontalAlignment>,
    #[serde(default)]
    pub vertical: Option<VerticalAlignment>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BorderSideInput {
    #[serde(default)]
    pub style: Option<BorderStyle>,
    #[serde(default)]
    pub width: Option<BorderWidth>,
    /// Hex colour, default `000000`.
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BordersInput {
    #[serde(default)]
    pub top: Option<BorderSideInput>,
    #[serde(default)]
    pub bottom: Option<BorderSideInput>,
    #[serde(default)]
    pub left: Option<BorderSideInput>,
    #[serde(default)]
    pub right: Option<BorderSideInput>,
}

impl BordersInput {
    fn sides(&self) -> impl Iterator<Item = (BorderSide, &BorderSideInput)> {
        [
            (BorderSide::Top, self.top.as_ref()),
            (BorderSide::Bottom, self.bottom.as_ref()),
            (BorderSide::Left, self.left.as_ref()),
            (BorderSide::Right, self.right.as_ref()),
        ]
        .into_iter()
        .filter_map(|(side, input)| input.map(|input| (side, input)))
    }
}

fn resolve_text_format(tool: &'static str, input: &TextFormatInput) -> Result<TextFormat> {
    let half_points = input
        .font_size
        .map(|points| validate_font_size(tool, points))
        .transpose()?;
    let color = input
        .font_color
        .as_deref()
        .map(|color| normalize_hex_color(tool, "text_format.font_color", color))
        .transpose()?;
    let font_family = match input.font_family.as_deref().map(str::trim) {
        Some("") => {
            return Err(InvalidParamsError::new(tool, "font_family must not be empty")
                .with_path("text_format.font_family")
                .into());
        }
        other => other.map(str::to_string),
    };
    Ok(TextFormat {
        font_family,
        half_points,
        color,
        bold: input.bold,
        italic: input.italic,
        underline: input.underline,
        strike: input.strikethrough,
    })
}

fn resolve_borders(tool: &'static str, input: &BordersInput) -> Result<Vec<(BorderSide, BorderSpec)>> {
    let mut sides = Vec::new();
    for (side, spec) in input.sides() {
        let color = match spec.color.as_deref() {
            Some(color) => normalize_hex_color(tool, &format!("borders.{side}.color"), color)?,
            None => "000000".to_string(),
        };
        sides.push((
            side,
            BorderSpec {
                border_type: spec.style.unwrap_or_default().to_docx(),
                size: spec.width.unwrap_or_default().eighth_points(),
                color,
            },
        ));
    }
    if sides.is_empty() {
        return Err(
            InvalidParamsError::new(tool, "at least one border side must be provided")
                .with_path("borders")
                .into(),
        );
    }
    Ok(sides)
}

fn ensure_alignment(tool: &'static str, alignment: &AlignmentInput) -> Result<()> {
    if alignment.horizontal.is_none() && alignment.vertical.is_none() {
        return Err(
            InvalidParamsError::new(tool, "provide horizontal and/or vertical alignment")
                .with_path("alignment")
                .into(),
        );
    }
    Ok(())
}

fn apply_alignment(cell: &mut TableCell, alignment: &AlignmentInput, applied: &mut Vec<String>) {
    if let Some(horizontal) = alignment.horizontal {
        edit::apply_horizontal_alignment(cell, horizontal.to_docx());
        applied.push("horizontal_alignment".to_string());
    }
    if let Some(vertical) = alignment.vertical {
        edit::apply_vertical_alignment(cell, vertical.to_docx());
        applied.push("vertical_alignment".to_string());
    }
}

/// Validate up front, then run `apply` against the addressed cell.
async fn format_one_cell<F>(
    state: Arc<AppState>,
    tool: &'static str,
    target: CellTarget,
    apply: F,
) -> Result<FormatCellResponse>
where
    F: FnOnce(&mut TableCell, &mut Vec<String>) + Send + 'static,
{
    let CellTarget {
        file_path,
        table_index,
        row_index,
        column_index,
    } = target;
    with_session(state, tool, file_path, move |_, path, session| {
        let table = session.table_mut(table_index)?;
        let cell = edit::cell_mut(table, row_index, column_index)?;
        let mut applied = Vec::new();
        apply(cell, &mut applied);
        tracing::debug!(
            tool,
            path = %path.display(),
            table_index,
            row_index,
            column_index,
            ?applied,
            "cell formatted"
        );
        Ok(FormatCellResponse {
            table_index,
            row_index,
            column_index,
            applied,
        })
    })
    .await
}

struct CellTarget {
    file_path: String,
    table_index: usize,
    row_index: usize,
    column_index: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatCellTextParams {
    pub file_path: String,
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    pub text_format: TextFormatInput,
}

pub async fn format_cell_text(
    state: Arc<AppState>,
    params: FormatCellTextParams,
) -> Result<FormatCellResponse> {
    const TOOL: &str = "format_cell_text";
    let format = resolve_text_format(TOOL, &params.text_format)?;
    if format.is_empty() {
        return Err(InvalidParamsError::new(TOOL, "text_format has no attributes to apply")
            .with_path("text_format")
            .into());
    }
    let target = CellTarget {
        file_path: params.file_path,
        table_index: params.table_index,
        row_index: params.row_index,
        column_index: params.column_index,
    };
    format_one_cell(state, TOOL, target, move |cell, applied| {
        edit::apply_text_format(cell, &format);
        applied.push("text_format".to_string());
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatCellAlignmentParams {
    pub file_path: String,
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    #[serde(default)]
    pub horizontal: Option<HorizontalAlignment>,
    /// `top`, `middle` or `bottom`.
    #[serde(default)]
    pub vertical: Option<VerticalAlignment>,
}

pub async fn format_cell_alignment(
    state: Arc<AppState>,
    params: FormatCellAlignmentParams,
) -> Result<FormatCellResponse> {
    const TOOL: &str = "format_cell_alignment";
    let alignment = AlignmentInput {
        horizontal: params.horizontal,
        vertical: params.vertical,
    };
    ensure_alignment(TOOL, &alignment)?;
    let target = CellTarget {
        file_path: params.file_path,
        table_index: params.table_index,
        row_index: params.row_index,
        column_index: params.column_index,
    };
    format_one_cell(state, TOOL, target, move |cell, applied| {
        apply_alignment(cell, &alignment, applied);
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatCellBackgroundParams {
    pub file_path: String,
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    /// Hex colour, `RRGGBB` or `#RRGGBB`.
    pub color: String,
}

pub async fn format_cell_background(
    state: Arc<AppState>,
    params: FormatCellBackgroundParams,
) -> Result<FormatCellResponse> {
    const TOOL: &str = "format_cell_background";
    let fill = normalize_hex_color(TOOL, "color", &params.color)?;
    let target = CellTarget {
        file_path: params.file_path,
        table_index: params.table_index,
        row_index: params.row_index,
        column_index: params.column_index,
    };
    format_one_cell(state, TOOL, target, move |cell, applied| {
        edit::apply_background(cell, &fill);
        applied.push("background_color".to_string());
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatCellBordersParams {
    pub file_path: String,
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    pub borders: BordersInput,
}

pub async fn format_cell_borders(
    state: Arc<AppState>,
    params: FormatCellBordersParams,
) -> Result<FormatCellResponse> {
    const TOOL: &str = "format_cell_borders";
    let sides = resolve_borders(TOOL, &params.borders)?;
    let target = CellTarget {
        file_path: params.file_path,
        table_index: params.table_index,
        row_index: params.row_index,
        column_index: params.column_index,
    };
    format_one_cell(state, TOOL, target, move |cell, applied| {
        edit::apply_borders(cell, &sides);
        applied.push("borders".to_string());
    })
    .await
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CellFormattingInput {
    #[serde(default)]
    pub text_format: Option<TextFormatInput>,
    #[serde(default)]
    pub alignment: Option<AlignmentInput>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub borders: Option<BordersInput>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatCellParams {
    pub file_path: String,
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    pub formatting: CellFormattingInput,
}

/// Every part is validated before the cell is touched, so a bad part leaves
/// the cell unchanged.
pub async fn format_cell(
    state: Arc<AppState>,
    params: FormatCellParams,
) -> Result<FormatCellResponse> {
    const TOOL: &str = "format_cell";
    let formatting = params.formatting;
    let text_format = formatting
        .text_format
        .as_ref()
        .map(|input| resolve_text_format(TOOL, input))
        .transpose()?
        .filter(|format| !format.is_empty());
    let alignment = formatting.alignment;
    if let Some(alignment) = &alignment {
        ensure_alignment(TOOL, alignment)?;
    }
    let fill = formatting
        .background_color
        .as_deref()
        .map(|color| normalize_hex_color(TOOL, "formatting.background_color", color))
        .transpose()?;
    let borders = formatting
        .borders
        .as_ref()
        .map(|input| resolve_borders(TOOL, input))
        .transpose()?;

    if text_format.is_none() && alignment.is_none() && fill.is_none() && borders.is_none() {
        return Err(InvalidParamsError::new(TOOL, "formatting has nothing to apply")
            .with_path("formatting")
            .into());
    }

    let target = CellTarget {
        file_path: params.file_path,
        table_index: params.table_index,
        row_index: params.row_index,
        column_index: params.column_index,
    };
    format_one_cell(state, TOOL, target, move |cell, applied| {
        if let Some(format) = &text_format {
            edit::apply_text_format(cell, format);
            applied.push("text_format".to_string());
        }
        if let Some(alignment) = &alignment {
            apply_alignment(cell, alignment, applied);
        }
        if let Some(fill) = &fill {
            edit::apply_background(cell, fill);
            applied.push("background_color".to_string());
        }
        if let Some(sides) = &borders {
            edit::apply_borders(cell, sides);
            applied.push("borders".to_string());
        }
    })
    .await
}
