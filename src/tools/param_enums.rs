use docx_rs::{AlignmentType, BorderType, VAlignType};
use schemars::JsonSchema;
use serde::de;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum TablePosition {
    #[default]
    End,
    Beginning,
    AfterParagraph,
}

impl TablePosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::End => "end",
            Self::Beginning => "beginning",
            Self::AfterParagraph => "after_paragraph",
        }
    }
}

impl fmt::Display for TablePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TablePosition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "end" => Ok(Self::End),
            "beginning" | "start" => Ok(Self::Beginning),
            "after_paragraph" | "afterparagraph" | "after-paragraph" => Ok(Self::AfterParagraph),
            other => Err(de::Error::unknown_variant(
                other,
                &["end", "beginning", "after_paragraph"],
            )),
        }
    }
}

/// Where inserted rows or columns go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum InsertPosition {
    #[default]
    End,
    Beginning,
    AtIndex,
}

impl InsertPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::End => "end",
            Self::Beginning => "beginning",
            Self::AtIndex => "at_index",
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InsertPosition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "end" => Ok(Self::End),
            "beginning" | "start" => Ok(Self::Beginning),
            "at_index" | "atindex" | "at-index" | "index" => Ok(Self::AtIndex),
            other => Err(de::Error::unknown_variant(
                other,
                &["end", "beginning", "at_index"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum TableDataFormat {
    #[default]
    Array,
    Object,
    Csv,
}

impl TableDataFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Object => "object",
            Self::Csv => "csv",
        }
    }
}

impl<'de> Deserialize<'de> for TableDataFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "array" | "rows" => Ok(Self::Array),
            "object" | "records" => Ok(Self::Object),
            "csv" => Ok(Self::Csv),
            other => Err(de::Error::unknown_variant(
                other,
                &["array", "object", "csv"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum SearchMode {
    #[default]
    Contains,
    Exact,
    Regex,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Exact => "exact",
            Self::Regex => "regex",
        }
    }
}

impl<'de> Deserialize<'de> for SearchMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "contains" => Ok(Self::Contains),
            "exact" => Ok(Self::Exact),
            "regex" | "regexp" => Ok(Self::Regex),
            other => Err(de::Error::unknown_variant(
                other,
                &["contains", "exact", "regex"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
    Justify,
}

impl HorizontalAlignment {
    pub fn to_docx(self) -> AlignmentType {
        match self {
            Self::Left => AlignmentType::Left,
            Self::Center => AlignmentType::Center,
            Self::Right => AlignmentType::Right,
            Self::Justify => AlignmentType::Both,
        }
    }
}

impl<'de> Deserialize<'de> for HorizontalAlignment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "left" | "start" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" | "end" => Ok(Self::Right),
            "justify" | "justified" | "both" => Ok(Self::Justify),
            other => Err(de::Error::unknown_variant(
                other,
                &["left", "center", "right", "justify"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

impl VerticalAlignment {
    pub fn to_docx(self) -> VAlignType {
        match self {
            Self::Top => VAlignType::Top,
            Self::Middle => VAlignType::Center,
            Self::Bottom => VAlignType::Bottom,
        }
    }
}

impl<'de> Deserialize<'de> for VerticalAlignment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "middle" | "center" | "centre" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            other => Err(de::Error::unknown_variant(
                other,
                &["top", "middle", "bottom"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum BorderStyle {
    None,
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    pub fn to_docx(self) -> BorderType {
        match self {
            Self::None => BorderType::None,
            Self::Solid => BorderType::Single,
            Self::Dashed => BorderType::Dashed,
            Self::Dotted => BorderType::Dotted,
            Self::Double => BorderType::Double,
        }
    }
}

impl<'de> Deserialize<'de> for BorderStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "none" | "nil" => Ok(Self::None),
            "solid" | "single" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "double" => Ok(Self::Double),
            other => Err(de::Error::unknown_variant(
                other,
                &["none", "solid", "dashed", "dotted", "double"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum BorderWidth {
    #[default]
    Thin,
    Medium,
    Thick,
}

impl BorderWidth {
    /// Width in eighths of a point.
    pub fn eighth_points(self) -> usize {
        match self {
            Self::Thin => 4,
            Self::Medium => 8,
            Self::Thick => 12,
        }
    }
}

impl<'de> Deserialize<'de> for BorderWidth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "thin" => Ok(Self::Thin),
            "medium" => Ok(Self::Medium),
            "thick" => Ok(Self::Thick),
            other => Err(de::Error::unknown_variant(
                other,
                &["thin", "medium", "thick"],
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enums_accept_case_and_aliases() {
        let v: VerticalAlignment = serde_json::from_value(json!("Center")).unwrap();
        assert_eq!(v, VerticalAlignment::Middle);
        let p: InsertPosition = serde_json::from_value(json!("AT_INDEX")).unwrap();
        assert_eq!(p, InsertPosition::AtIndex);
        let f: TableDataFormat = serde_json::from_value(json!("records")).unwrap();
        assert_eq!(f, TableDataFormat::Object);
    }

    #[test]
    fn unknown_variants_list_the_valid_ones() {
        let err = serde_json::from_value::<BorderStyle>(json!("wavy")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("wavy"));
        assert!(message.contains("`solid`"));
    }
}
