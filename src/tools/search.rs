use super::param_enums::SearchMode;
use super::{row_texts, with_session};
use crate::errors::{DocxTableError, InvalidParamsError};
use crate::model::{SearchMatch, SearchResponse, SearchSummary};
use crate::state::AppState;
use anyhow::Result;
use docx_rs::Table;
use regex::{Regex, RegexBuilder};
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_MAX_RESULTS: usize = 500;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchTableContentParams {
    pub file_path: String,
    pub query: String,
    /// `contains` (default), `exact` or `regex`.
    #[serde(default)]
    pub search_mode: Option<SearchMode>,
    #[serde(default)]
    pub case_sensitive: Option<bool>,
    /// Restrict the search to these tables; all tables when omitted.
    #[serde(default)]
    pub table_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

pub type SearchTableHeadersParams = SearchTableContentParams;

/// Query compiled once per search.
#[derive(Debug)]
pub enum CellMatcher {
    Contains { needle: String, case_sensitive: bool },
    Exact { needle: String, case_sensitive: bool },
    Pattern(Regex),
}

impl CellMatcher {
    pub fn new(
        tool: &'static str,
        query: &str,
        mode: SearchMode,
        case_sensitive: bool,
    ) -> Result<Self> {
        if query.is_empty() {
            return Err(InvalidParamsError::new(tool, "query must not be empty")
                .with_path("query")
                .into());
        }
        let fold = |value: &str| {
            if case_sensitive {
                value.to_string()
            } else {
                value.to_lowercase()
            }
        };
        Ok(match mode {
            SearchMode::Contains => Self::Contains {
                needle: fold(query),
                case_sensitive,
            },
            SearchMode::Exact => Self::Exact {
                needle: fold(query.trim()),
                case_sensitive,
            },
            SearchMode::Regex => Self::Pattern(
                RegexBuilder::new(query)
                    .case_insensitive(!case_sensitive)
                    .build()
                    .map_err(|e| {
                        InvalidParamsError::new(tool, format!("invalid regex: {e}"))
                            .with_path("query")
                    })?,
            ),
        })
    }

    /// The matched portion of `text`, if any.
    pub fn find(&self, text: &str) -> Option<String> {
        match self {
            Self::Contains {
                needle,
                case_sensitive,
            } => {
                if *case_sensitive {
                    text.find(needle.as_str()).map(|_| needle.clone())
                } else {
                    find_case_insensitive(text, needle)
                }
            }
            Self::Exact {
                needle,
                case_sensitive,
            } => {
                let candidate = text.trim();
                let equal = if *case_sensitive {
                    candidate == needle
                } else {
                    candidate.to_lowercase() == *needle
                };
                equal.then(|| candidate.to_string())
            }
            Self::Pattern(regex) => regex.find(text).map(|m| m.as_str().to_string()),
        }
    }
}

/// Locate `needle` (already lower-cased) in `text` and return the original
/// slice so the caller sees the text as written.
fn find_case_insensitive(text: &str, needle: &str) -> Option<String> {
    text.char_indices().find_map(|(start, _)| {
        let rest = &text[start..];
        lowered_prefix_len(rest, needle).map(|len| rest[..len].to_string())
    })
}

/// Byte length of the prefix of `haystack` whose lower-cased form is
/// `needle`.
fn lowered_prefix_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut expected = needle.chars().peekable();
    for (offset, ch) in haystack.char_indices() {
        for lower in ch.to_lowercase() {
            if expected.next() != Some(lower) {
                return None;
            }
        }
        if expected.peek().is_none() {
            return Some(offset + ch.len_utf8());
        }
    }
    None
}

struct SearchScope {
    headers_only: bool,
}

fn search_tables(
    tool: &'static str,
    tables: &[&Table],
    params: SearchTableContentParams,
    scope: SearchScope,
) -> Result<SearchResponse> {
    let mode = params.search_mode.unwrap_or_default();
    let case_sensitive = params.case_sensitive.unwrap_or(false);
    let matcher = CellMatcher::new(tool, &params.query, mode, case_sensitive)?;
    let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS).max(1);

    let selected: Vec<usize> = match &params.table_indices {
        Some(indices) => {
            let mut indices = indices.clone();
            indices.sort_unstable();
            indices.dedup();
            if let Some(&index) = indices.iter().find(|&&index| index >= tables.len()) {
                return Err(DocxTableError::TableIndexOutOfRange {
                    index,
                    count: tables.len(),
                }
                .into());
            }
            indices
        }
        None => (0..tables.len()).collect(),
    };

    let mut matches = Vec::new();
    let mut total_matches = 0usize;
    let mut cells_searched = 0usize;
    let mut per_table: BTreeMap<String, usize> = BTreeMap::new();

    for &table_index in &selected {
        let texts = row_texts(tables[table_index]);
        let row_limit = if scope.headers_only { 1 } else { texts.len() };
        for (row_index, row) in texts.into_iter().take(row_limit).enumerate() {
            for (column_index, cell_value) in row.into_iter().enumerate() {
                cells_searched += 1;
                let Some(matched_text) = matcher.find(&cell_value) else {
                    continue;
                };
                total_matches += 1;
                *per_table.entry(table_index.to_string()).or_default() += 1;
                if matches.len() < max_results {
                    matches.push(SearchMatch {
                        table_index,
                        row_index,
                        column_index,
                        cell_value,
                        matched_text,
                    });
                }
            }
        }
    }

    Ok(SearchResponse {
        query: params.query,
        search_mode: mode.as_str().to_string(),
        case_sensitive,
        truncated: total_matches > matches.len(),
        matches,
        total_matches,
        tables_searched: selected.len(),
        summary: SearchSummary {
            tables_with_matches: per_table.len(),
            total_cells_searched: cells_searched,
            matches_per_table: per_table,
        },
    })
}

pub async fn search_table_content(
    state: Arc<AppState>,
    params: SearchTableContentParams,
) -> Result<SearchResponse> {
    const TOOL: &str = "search_table_content";
    let file_path = params.file_path.clone();
    with_session(state, TOOL, file_path, move |_, _, session| {
        search_tables(
            TOOL,
            &session.tables(),
            params,
            SearchScope {
                headers_only: false,
            },
        )
    })
    .await
}

pub async fn search_table_headers(
    state: Arc<AppState>,
    params: SearchTableHeadersParams,
) -> Result<SearchResponse> {
    const TOOL: &str = "search_table_headers";
    let file_path = params.file_path.clone();
    with_session(state, TOOL, file_path, move |_, _, session| {
        search_tables(
            TOOL,
            &session.tables(),
            params,
            SearchScope { headers_only: true },
        )
    })
    .await
}
