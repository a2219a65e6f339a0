#![allow(dead_code)]
//! In-memory table views for driving the analyzer without documents.

use docx_table_mcp::analysis::{
    BorderFacts, BorderSide, CellMarkup, CellView, MarkupError, RunFacts, TableProperties,
    TableView, VerticalMerge,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct FakeCell {
    text: String,
    alignment: Option<String>,
    run: Option<RunFacts>,
    span: Option<usize>,
    vmerge: Option<VerticalMerge>,
    fill: Option<String>,
    valign: Option<String>,
    borders: HashMap<BorderSide, BorderFacts>,
    broken_run: bool,
    broken_borders: bool,
}

impl FakeCell {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            run: Some(RunFacts::default()),
            ..Self::default()
        }
    }

    /// A cell without any run, like an untouched blank cell.
    pub fn blank() -> Self {
        Self::default()
    }

    fn run_mut(&mut self) -> &mut RunFacts {
        self.run.get_or_insert_with(RunFacts::default)
    }

    pub fn font(mut self, family: &str) -> Self {
        self.run_mut().font_family = Some(family.to_string());
        self
    }

    pub fn half_points(mut self, half_points: u32) -> Self {
        self.run_mut().half_points = Some(half_points);
        self
    }

    pub fn bold(mut self) -> Self {
        self.run_mut().bold = Some(true);
        self
    }

    pub fn italic(mut self) -> Self {
        self.run_mut().italic = Some(true);
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.run_mut().color = Some(color.to_string());
        self
    }

    pub fn align(mut self, horizontal: &str) -> Self {
        self.alignment = Some(horizontal.to_string());
        self
    }

    pub fn valign(mut self, vertical: &str) -> Self {
        self.valign = Some(vertical.to_string());
        self
    }

    pub fn span(mut self, span: usize) -> Self {
        self.span = Some(span);
        self
    }

    pub fn vmerge(mut self, marker: VerticalMerge) -> Self {
        self.vmerge = Some(marker);
        self
    }

    pub fn fill(mut self, fill: &str) -> Self {
        self.fill = Some(fill.to_string());
        self
    }

    pub fn border(mut self, side: BorderSide, style: &str) -> Self {
        self.borders.insert(
            side,
            BorderFacts {
                style: Some(style.to_string()),
                width: Some(4),
                color: Some("000000".to_string()),
            },
        );
        self
    }

    pub fn broken_run(mut self) -> Self {
        self.broken_run = true;
        self
    }

    pub fn broken_borders(mut self) -> Self {
        self.broken_borders = true;
        self
    }
}

impl CellMarkup for FakeCell {
    fn grid_span(&self) -> Result<Option<usize>, MarkupError> {
        Ok(self.span)
    }

    fn vertical_merge(&self) -> Result<Option<VerticalMerge>, MarkupError> {
        Ok(self.vmerge)
    }

    fn shading_fill(&self) -> Result<Option<String>, MarkupError> {
        Ok(self.fill.clone())
    }

    fn vertical_alignment(&self) -> Result<Option<String>, MarkupError> {
        Ok(self.valign.clone())
    }

    fn border(&self, side: BorderSide) -> Result<Option<BorderFacts>, MarkupError> {
        if self.broken_borders {
            return Err(MarkupError::unreadable("tcBorders", "truncated element"));
        }
        Ok(self.borders.get(&side).cloned())
    }
}

impl CellView for FakeCell {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn paragraph_alignment(&self) -> Result<Option<String>, MarkupError> {
        Ok(self.alignment.clone())
    }

    fn first_run(&self) -> Result<Option<RunFacts>, MarkupError> {
        if self.broken_run {
            return Err(MarkupError::unexpected("sz", "\"huge\""));
        }
        Ok(self.run.clone())
    }

    fn markup(&self) -> &dyn CellMarkup {
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    rows: Vec<Vec<FakeCell>>,
    properties: TableProperties,
}

impl FakeTable {
    pub fn new(rows: Vec<Vec<FakeCell>>) -> Self {
        Self {
            rows,
            properties: TableProperties::default(),
        }
    }

    pub fn from_texts(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|text| FakeCell::text(text)).collect())
                .collect(),
        )
    }

    pub fn with_style(mut self, style_name: &str) -> Self {
        self.properties.style_name = Some(style_name.to_string());
        self
    }
}

impl TableView for FakeTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_count(&self, row: usize) -> usize {
        self.rows.get(row).map(Vec::len).unwrap_or(0)
    }

    fn cell(&self, row: usize, column: usize) -> Option<&dyn CellView> {
        self.rows
            .get(row)?
            .get(column)
            .map(|cell| cell as &dyn CellView)
    }

    fn properties(&self) -> TableProperties {
        self.properties.clone()
    }
}
