use docx_table_mcp::analysis::{
    AnalyzeOptions, BorderSide, MergeType, TableView, VerticalMerge, WarningStage,
    analyze_document, analyze_table,
};

mod support;

use support::fakes::{FakeCell, FakeTable};

const DETAILED: AnalyzeOptions = AnalyzeOptions {
    include_cell_details: true,
    resolve_vertical_spans: false,
};

const SUMMARY_ONLY: AnalyzeOptions = AnalyzeOptions {
    include_cell_details: false,
    resolve_vertical_spans: false,
};

#[test]
fn populated_first_row_is_reported_as_header() {
    let table = FakeTable::from_texts(&[&["Name", "Age"], &["Ada", "36"]]);
    let report = analyze_table(&table, 0, DETAILED);

    assert!(report.header_info.has_header);
    assert_eq!(report.header_info.header_row_index, Some(0));
    assert_eq!(
        report.header_info.header_cells,
        Some(vec!["Name".to_string(), "Age".to_string()])
    );
}

#[test]
fn numeric_first_row_still_counts_as_header() {
    let table = FakeTable::from_texts(&[&["1", "2", "3"], &["4", "5", "6"]]);
    let report = analyze_table(&table, 0, SUMMARY_ONLY);

    assert!(report.header_info.has_header);
    assert_eq!(
        report.header_info.header_cells,
        Some(vec!["1".to_string(), "2".to_string(), "3".to_string()])
    );
}

#[test]
fn blank_cell_in_first_row_means_no_header() {
    let table = FakeTable::from_texts(&[&["Name", "  "], &["Ada", "36"]]);
    let report = analyze_table(&table, 0, SUMMARY_ONLY);

    assert!(!report.header_info.has_header);
    assert_eq!(report.header_info.header_row_index, None);
    assert_eq!(report.header_info.header_cells, None);
}

#[test]
fn empty_table_has_no_header_and_no_cells() {
    let table = FakeTable::new(Vec::new());
    let report = analyze_table(&table, 3, DETAILED);

    assert_eq!(report.table_info.index, 3);
    assert_eq!(report.table_info.rows, 0);
    assert_eq!(report.table_info.columns, 0);
    assert!(!report.header_info.has_header);
    assert!(report.cells.is_empty());
}

#[test]
fn grid_span_is_a_horizontal_merge() {
    let table = FakeTable::new(vec![
        vec![FakeCell::text("Quarter").span(3)],
        vec![FakeCell::text("Q1"), FakeCell::text("Q2"), FakeCell::text("Q3")],
    ]);
    let report = analyze_table(&table, 0, DETAILED);

    assert_eq!(report.merge_analysis.merged_cells_count, 1);
    let region = &report.merge_analysis.merge_regions[0];
    assert_eq!(region.merge_type, MergeType::Horizontal);
    assert_eq!(region.span_cols, 3);
    assert_eq!(region.span_rows, 1);
    assert_eq!((region.start_col, region.end_col), (0, 2));
    assert_eq!(report.cells[0][0].merge.as_ref(), Some(region));
    assert!(report.cells[1][0].merge.is_none());
}

#[test]
fn vertical_marker_reports_single_row_span_by_default() {
    let table = FakeTable::new(vec![
        vec![
            FakeCell::text("Region").vmerge(VerticalMerge::Restart),
            FakeCell::text("North"),
        ],
        vec![
            FakeCell::blank().vmerge(VerticalMerge::Continue),
            FakeCell::text("South"),
        ],
    ]);
    let report = analyze_table(&table, 0, DETAILED);

    assert_eq!(report.merge_analysis.merged_cells_count, 2);
    for region in &report.merge_analysis.merge_regions {
        assert_eq!(region.merge_type, MergeType::Vertical);
        assert_eq!(region.span_rows, 1);
        assert_eq!(region.span_cols, 1);
        assert_eq!(region.start_row, region.end_row);
    }
}

#[test]
fn span_with_vertical_marker_is_both() {
    let table = FakeTable::new(vec![vec![
        FakeCell::text("Block")
            .span(2)
            .vmerge(VerticalMerge::Restart),
    ]]);
    let report = analyze_table(&table, 0, SUMMARY_ONLY);

    let region = &report.merge_analysis.merge_regions[0];
    assert_eq!(region.merge_type, MergeType::Both);
    assert_eq!(region.span_cols, 2);
}

#[test]
fn resolving_vertical_spans_measures_the_region() {
    let table = FakeTable::new(vec![
        vec![
            FakeCell::text("Region").vmerge(VerticalMerge::Restart),
            FakeCell::text("North"),
        ],
        vec![
            FakeCell::blank().vmerge(VerticalMerge::Continue),
            FakeCell::text("South"),
        ],
        vec![
            FakeCell::blank().vmerge(VerticalMerge::Continue),
            FakeCell::text("East"),
        ],
        vec![FakeCell::text("Other"), FakeCell::text("West")],
    ]);
    let options = AnalyzeOptions {
        include_cell_details: false,
        resolve_vertical_spans: true,
    };
    let report = analyze_table(&table, 0, options);

    assert_eq!(report.merge_analysis.merged_cells_count, 1);
    let start = &report.merge_analysis.merge_regions[0];
    assert_eq!(start.start_row, 0);
    assert_eq!(start.end_row, 2);
    assert_eq!(start.span_rows, 3);
    assert!(report.warnings.is_empty());
    assert!(report.cells[1][0].merge.is_some());
}

#[test]
fn vertical_resolution_follows_grid_columns_past_spans() {
    let table = FakeTable::new(vec![
        vec![
            FakeCell::text("Wide").span(2),
            FakeCell::text("Tall").vmerge(VerticalMerge::Restart),
        ],
        vec![
            FakeCell::text("a"),
            FakeCell::text("b"),
            FakeCell::blank().vmerge(VerticalMerge::Continue),
        ],
    ]);
    let options = AnalyzeOptions {
        include_cell_details: false,
        resolve_vertical_spans: true,
    };
    let report = analyze_table(&table, 0, options);

    let tall = report
        .merge_analysis
        .merge_regions
        .iter()
        .find(|region| region.merge_type == MergeType::Vertical && region.start_row == 0)
        .expect("vertical region");
    assert_eq!(tall.span_rows, 2);
}

#[test]
fn one_unset_font_does_not_break_consistency() {
    let table = FakeTable::new(vec![vec![
        FakeCell::text("a").font("Arial"),
        FakeCell::text("b").font("Arial"),
        FakeCell::text("c").font("Arial"),
        FakeCell::text("d"),
    ]]);
    let report = analyze_table(&table, 0, DETAILED);

    assert!(report.style_consistency.fonts);
    assert_eq!(report.style_summary.font_families, vec!["Arial".to_string()]);
}

#[test]
fn two_fonts_or_alignments_are_inconsistent() {
    let table = FakeTable::new(vec![vec![
        FakeCell::text("a").font("Arial").align("left"),
        FakeCell::text("b").font("Calibri").align("center"),
    ]]);
    let report = analyze_table(&table, 0, SUMMARY_ONLY);

    assert!(!report.style_consistency.fonts);
    assert!(!report.style_consistency.alignment);
    assert!(report.style_consistency.borders);
}

#[test]
fn border_styles_feed_consistency() {
    let table = FakeTable::new(vec![vec![
        FakeCell::text("a").border(BorderSide::Top, "single"),
        FakeCell::text("b").border(BorderSide::Bottom, "double"),
    ]]);
    let report = analyze_table(&table, 0, DETAILED);

    assert!(!report.style_consistency.borders);
    let top = report.cells[0][0].borders.top.as_ref().expect("top border");
    assert_eq!(top.style.as_deref(), Some("single"));
}

#[test]
fn repeated_analysis_serializes_identically() {
    let table = FakeTable::new(vec![
        vec![
            FakeCell::text("Name").bold().font("Arial").fill("D9E2F3"),
            FakeCell::text("Score").bold().span(2),
        ],
        vec![
            FakeCell::text("Ada").half_points(22),
            FakeCell::text("9").align("right"),
            FakeCell::text("10").valign("center"),
        ],
    ])
    .with_style("TableGrid");

    let first = serde_json::to_string(&analyze_table(&table, 0, DETAILED)).unwrap();
    let second = serde_json::to_string(&analyze_table(&table, 0, DETAILED)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn disabling_details_keeps_structure_and_drops_snapshots() {
    let table = FakeTable::new(vec![
        vec![
            FakeCell::text("Name").bold().font("Arial").color("1F4E79"),
            FakeCell::text("Total").bold().span(2).fill("FFFF00"),
        ],
        vec![
            FakeCell::text("Ada").font("Calibri").half_points(24),
            FakeCell::text("1"),
            FakeCell::text("2"),
        ],
    ]);

    let detailed = analyze_table(&table, 0, DETAILED);
    let summary = analyze_table(&table, 0, SUMMARY_ONLY);

    assert_eq!(detailed.table_info, summary.table_info);
    assert_eq!(detailed.header_info, summary.header_info);
    assert_eq!(detailed.merge_analysis, summary.merge_analysis);
    assert_eq!(detailed.style_consistency, summary.style_consistency);
    assert!(!summary.style_consistency.fonts);

    for (full_row, bare_row) in detailed.cells.iter().zip(&summary.cells) {
        for (full, bare) in full_row.iter().zip(bare_row) {
            assert_eq!(full.position, bare.position);
            assert_eq!(full.content, bare.content);
            assert_eq!(full.merge, bare.merge);
            assert_eq!(bare.text_format.font_family, None);
            assert_eq!(bare.text_format.bold, None);
            assert_eq!(bare.background.color, None);
        }
    }

    assert_eq!(detailed.cells[0][0].text_format.bold, Some(true));
    assert_eq!(detailed.cells[1][0].text_format.font_size, Some(12.0));
    assert_eq!(
        detailed.style_summary.font_families,
        vec!["Arial".to_string(), "Calibri".to_string()]
    );
    assert_eq!(detailed.style_summary.background_colors, vec!["FFFF00".to_string()]);
    assert!(summary.style_summary.font_families.is_empty());
    assert!(summary.style_summary.font_sizes.is_empty());
    assert!(summary.style_summary.colors.is_empty());
    assert!(summary.style_summary.background_colors.is_empty());
}

#[test]
fn cells_without_runs_have_no_text_format() {
    let table = FakeTable::new(vec![vec![FakeCell::blank().fill("EEEEEE")]]);
    let report = analyze_table(&table, 0, DETAILED);

    let cell = &report.cells[0][0];
    assert!(cell.content.is_empty);
    assert_eq!(cell.text_format.bold, None);
    assert_eq!(cell.background.color.as_deref(), Some("EEEEEE"));
}

#[test]
fn unreadable_markup_becomes_a_warning() {
    let table = FakeTable::new(vec![
        vec![
            FakeCell::text("Name").broken_run().fill("D9E2F3"),
            FakeCell::text("Age").broken_borders().bold(),
        ],
        vec![FakeCell::text("Ada"), FakeCell::text("36")],
    ]);
    let report = analyze_table(&table, 0, DETAILED);

    assert_eq!(report.table_info.rows, 2);
    assert!(report.header_info.has_header);

    let run_warnings: Vec<_> = report
        .warnings
        .iter()
        .filter(|warning| (warning.row, warning.column) == (0, 0))
        .collect();
    assert_eq!(run_warnings.len(), 1);
    assert_eq!(run_warnings[0].stage, WarningStage::Style);

    let border_warnings = report
        .warnings
        .iter()
        .filter(|warning| (warning.row, warning.column) == (0, 1))
        .count();
    assert_eq!(border_warnings, 4);

    let first = &report.cells[0][0];
    assert_eq!(first.content.text, "Name");
    assert_eq!(first.text_format.bold, None);
    assert_eq!(first.background.color.as_deref(), Some("D9E2F3"));

    let second = &report.cells[0][1];
    assert_eq!(second.text_format.bold, Some(true));
    assert!(second.borders.top.is_none());
}

#[test]
fn document_analysis_indexes_every_table() {
    let first = FakeTable::from_texts(&[&["A", "B"]]);
    let second = FakeTable::from_texts(&[&["x", ""], &["y", "z"]]);
    let tables: Vec<&dyn TableView> = vec![&first, &second];

    let analysis = analyze_document("reports/q1.docx", tables, SUMMARY_ONLY);

    assert_eq!(analysis.file_info.path, "reports/q1.docx");
    assert_eq!(analysis.file_info.total_tables, 2);
    assert!(!analysis.file_info.analysis_timestamp.is_empty());
    assert_eq!(analysis.tables[1].table_info.index, 1);
    assert!(analysis.tables[0].header_info.has_header);
    assert!(!analysis.tables[1].header_info.has_header);
}
