use super::merge::{
    MergeDescriptor, continues_region_above, detect_merge, resolve_vertical_extent,
};
use super::style::{
    AlignmentSnapshot, BackgroundSnapshot, BordersSnapshot, CellStyle, TextFormatSnapshot,
    extract_cell_style,
};
use super::{MarkupError, TableView};
use chrono::{SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Attach per-cell style snapshots and fill the style summary.
    pub include_cell_details: bool,
    /// Measure the real height of vertically merged regions instead of
    /// reporting every vertical merge as a single row.
    pub resolve_vertical_spans: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableInfo {
    pub index: usize,
    pub rows: usize,
    pub columns: usize,
    pub style_name: Option<String>,
    pub alignment: Option<String>,
    pub width: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HeaderInfo {
    pub has_header: bool,
    pub header_row_index: Option<usize>,
    pub header_cells: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CellPosition {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CellContent {
    pub text: String,
    pub is_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CellAnalysis {
    pub position: CellPosition,
    pub content: CellContent,
    pub text_format: TextFormatSnapshot,
    pub alignment: AlignmentSnapshot,
    pub background: BackgroundSnapshot,
    pub borders: BordersSnapshot,
    pub merge: Option<MergeDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MergeAnalysis {
    pub merged_cells_count: usize,
    pub merge_regions: Vec<MergeDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StyleConsistency {
    pub fonts: bool,
    pub alignment: bool,
    pub borders: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StyleSummary {
    pub font_families: Vec<String>,
    pub font_sizes: Vec<f64>,
    pub colors: Vec<String>,
    pub background_colors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WarningStage {
    Merge,
    Style,
}

/// A cell whose markup could not be fully read. The report still contains
/// whatever was extracted for that cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisWarning {
    pub row: usize,
    pub column: usize,
    pub stage: WarningStage,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableStructureReport {
    pub table_info: TableInfo,
    pub header_info: HeaderInfo,
    pub cells: Vec<Vec<CellAnalysis>>,
    pub merge_analysis: MergeAnalysis,
    pub style_consistency: StyleConsistency,
    pub style_summary: StyleSummary,
    pub warnings: Vec<AnalysisWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileInfo {
    pub path: String,
    pub total_tables: usize,
    pub analysis_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentAnalysis {
    pub file_info: FileInfo,
    pub tables: Vec<TableStructureReport>,
}

/// Row 0 is treated as a header when every one of its cells has non-blank
/// text. Fully populated data rows are reported as headers too.
pub fn detect_header(table: &dyn TableView) -> HeaderInfo {
    let cell_count = if table.row_count() > 0 {
        table.cell_count(0)
    } else {
        0
    };
    let texts: Vec<String> = (0..cell_count)
        .filter_map(|column| table.cell(0, column).map(|cell| cell.text()))
        .collect();

    let has_header = !texts.is_empty()
        && texts.len() == cell_count
        && texts.iter().all(|text| !text.trim().is_empty());

    if has_header {
        HeaderInfo {
            has_header,
            header_row_index: Some(0),
            header_cells: Some(texts),
        }
    } else {
        HeaderInfo {
            has_header,
            header_row_index: None,
            header_cells: None,
        }
    }
}

#[derive(Default)]
struct StyleAccumulator {
    font_families: BTreeSet<String>,
    alignments: BTreeSet<String>,
    border_styles: BTreeSet<String>,
    font_sizes: Vec<f64>,
    colors: BTreeSet<String>,
    background_colors: BTreeSet<String>,
}

impl StyleAccumulator {
    fn observe(&mut self, style: &CellStyle) {
        if let Some(family) = &style.text_format.font_family {
            self.font_families.insert(family.clone());
        }
        if let Some(horizontal) = &style.alignment.horizontal {
            self.alignments.insert(horizontal.clone());
        }
        for border in style.borders.iter() {
            if let Some(kind) = &border.style {
                self.border_styles.insert(kind.clone());
            }
        }
        if let Some(size) = style.text_format.font_size {
            self.font_sizes.push(size);
        }
        if let Some(color) = &style.text_format.font_color {
            self.colors.insert(color.clone());
        }
        if let Some(fill) = &style.background.color {
            self.background_colors.insert(fill.clone());
        }
    }

    fn consistency(&self) -> StyleConsistency {
        StyleConsistency {
            fonts: self.font_families.len() <= 1,
            alignment: self.alignments.len() <= 1,
            borders: self.border_styles.len() <= 1,
        }
    }

    fn into_summary(mut self) -> StyleSummary {
        self.font_sizes.sort_by(f64::total_cmp);
        self.font_sizes.dedup();
        StyleSummary {
            font_families: self.font_families.into_iter().collect(),
            font_sizes: self.font_sizes,
            colors: self.colors.into_iter().collect(),
            background_colors: self.background_colors.into_iter().collect(),
        }
    }
}

fn warning(row: usize, column: usize, stage: WarningStage, err: &MarkupError) -> AnalysisWarning {
    AnalysisWarning {
        row,
        column,
        stage,
        reason: err.to_string(),
    }
}

/// Build the structure report for one table.
///
/// Every cell is visited once and its style is extracted once, whatever the
/// detail flag says: consistency is always computed from the full grid,
/// while snapshots and summary lists are only emitted with details enabled.
pub fn analyze_table(
    table: &dyn TableView,
    index: usize,
    options: AnalyzeOptions,
) -> TableStructureReport {
    let properties = table.properties();
    let row_count = table.row_count();

    let mut cells = Vec::with_capacity(row_count);
    let mut merge_regions = Vec::new();
    let mut warnings = Vec::new();
    let mut styles = StyleAccumulator::default();

    for row in 0..row_count {
        let mut row_cells = Vec::with_capacity(table.cell_count(row));
        for column in 0..table.cell_count(row) {
            let Some(cell) = table.cell(row, column) else {
                continue;
            };

            let merge = match detect_merge(cell.markup(), row, column) {
                Ok(Some(mut descriptor)) => {
                    // Resolved regions already cover the continuation cells below.
                    if !options.resolve_vertical_spans {
                        merge_regions.push(descriptor.clone());
                    } else if !continues_region_above(table, row, column) {
                        if let Err(err) = resolve_vertical_extent(table, &mut descriptor) {
                            warnings.push(warning(row, column, WarningStage::Merge, &err));
                        }
                        merge_regions.push(descriptor.clone());
                    }
                    Some(descriptor)
                }
                Ok(None) => None,
                Err(err) => {
                    warnings.push(warning(row, column, WarningStage::Merge, &err));
                    None
                }
            };

            let extraction = extract_cell_style(cell);
            for err in &extraction.failures {
                warnings.push(warning(row, column, WarningStage::Style, err));
            }
            styles.observe(&extraction.style);

            let style = if options.include_cell_details {
                extraction.style
            } else {
                CellStyle::default()
            };

            let text = cell.text();
            row_cells.push(CellAnalysis {
                position: CellPosition { row, column },
                content: CellContent {
                    is_empty: text.trim().is_empty(),
                    text,
                },
                text_format: style.text_format,
                alignment: style.alignment,
                background: style.background,
                borders: style.borders,
                merge,
            });
        }
        cells.push(row_cells);
    }

    let style_consistency = styles.consistency();
    let style_summary = if options.include_cell_details {
        styles.into_summary()
    } else {
        StyleSummary::default()
    };

    TableStructureReport {
        table_info: TableInfo {
            index,
            rows: row_count,
            columns: table.column_count(),
            style_name: properties.style_name,
            alignment: properties.alignment,
            width: properties.width,
        },
        header_info: detect_header(table),
        cells,
        merge_analysis: MergeAnalysis {
            merged_cells_count: merge_regions.len(),
            merge_regions,
        },
        style_consistency,
        style_summary,
        warnings,
    }
}

pub fn analyze_document<'a, I>(
    path: impl Into<String>,
    tables: I,
    options: AnalyzeOptions,
) -> DocumentAnalysis
where
    I: IntoIterator<Item = &'a dyn TableView>,
{
    let tables: Vec<TableStructureReport> = tables
        .into_iter()
        .enumerate()
        .map(|(index, table)| analyze_table(table, index, options))
        .collect();

    DocumentAnalysis {
        file_info: FileInfo {
            path: path.into(),
            total_tables: tables.len(),
            analysis_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        tables,
    }
}
