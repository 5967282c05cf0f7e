//! Extraction result input models.
//!
//! The upstream extractor returns loosely typed JSON: scalars may arrive as
//! strings, numbers or booleans and any field may be missing or `null`.
//! Decoding is lenient and always yields text cells.

use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};

use crate::spec::ExportError;

/// Page-indexed extraction result. Read-only input to the export pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionResult {
    /// Pages in document order.
    #[serde(deserialize_with = "deserialize_null_default")]
    pub pages: Vec<ExtractionPage>,
}

/// Fields and tables found on one page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionPage {
    /// 1-based page number; `0` when the extractor omitted it.
    #[serde(deserialize_with = "deserialize_page_number")]
    pub page_number: u32,
    /// Key/value fields in extraction order.
    #[serde(deserialize_with = "deserialize_null_default")]
    pub fields: Vec<ExtractionField>,
    /// Tables in extraction order.
    #[serde(deserialize_with = "deserialize_null_default")]
    pub tables: Vec<ExtractionTable>,
}

/// One key/value field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionField {
    /// Field label.
    #[serde(deserialize_with = "deserialize_text")]
    pub label: String,
    /// Field value, possibly empty.
    #[serde(deserialize_with = "deserialize_text")]
    pub value: String,
}

/// One table of free-text cells. Rows may be shorter or longer than headers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionTable {
    /// Table name, possibly empty.
    #[serde(deserialize_with = "deserialize_text")]
    pub table_name: String,
    /// Header labels.
    #[serde(deserialize_with = "deserialize_text_seq")]
    pub headers: Vec<String>,
    /// Data rows.
    #[serde(deserialize_with = "deserialize_text_grid")]
    pub rows: Vec<Vec<String>>,
}

impl ExtractionResult {
    /// Decode from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ExportError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ExportError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Whether no page carries any field or table.
    pub fn is_empty(&self) -> bool {
        self.pages
            .iter()
            .all(|page| page.fields.is_empty() && page.tables.is_empty())
    }
}

impl ExtractionPage {
    /// Page number, falling back to the 1-based `position` when omitted.
    pub fn page_number_or(&self, position: usize) -> u32 {
        if self.page_number > 0 {
            self.page_number
        } else {
            u32::try_from(position + 1).unwrap_or(u32::MAX)
        }
    }
}

impl ExtractionField {
    /// Build a field.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl ExtractionTable {
    /// Build a table from borrowed text.
    pub fn new(table_name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            table_name: table_name.to_string(),
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    /// Whether any row length differs from the header length.
    pub fn is_ragged(&self) -> bool {
        self.count_ragged_rows() > 0
    }

    /// Number of rows whose length differs from the header length.
    pub fn count_ragged_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.len() != self.headers.len())
            .count()
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region LenientDecoding

#[derive(Deserialize)]
#[serde(untagged)]
enum EnumRawScalar {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
}

impl EnumRawScalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(val) => val,
            Self::Integer(val) => val.to_string(),
            Self::Unsigned(val) => val.to_string(),
            Self::Float(val) => val.to_string(),
            Self::Boolean(val) => val.to_string(),
        }
    }
}

fn convert_raw_to_text(value: Option<EnumRawScalar>) -> String {
    value.map(EnumRawScalar::into_text).unwrap_or_default()
}

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(convert_raw_to_text(Option::<EnumRawScalar>::deserialize(
        deserializer,
    )?))
}

fn deserialize_text_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let l_values = Option::<Vec<Option<EnumRawScalar>>>::deserialize(deserializer)?;
    Ok(l_values
        .unwrap_or_default()
        .into_iter()
        .map(convert_raw_to_text)
        .collect())
}

fn deserialize_text_grid<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let l_rows = Option::<Vec<Option<Vec<Option<EnumRawScalar>>>>>::deserialize(deserializer)?;
    Ok(l_rows
        .unwrap_or_default()
        .into_iter()
        .map(|row| {
            row.unwrap_or_default()
                .into_iter()
                .map(convert_raw_to_text)
                .collect()
        })
        .collect())
}

fn deserialize_page_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n_page = match Option::<EnumRawScalar>::deserialize(deserializer)? {
        Some(EnumRawScalar::Integer(val)) => u32::try_from(val).unwrap_or(0),
        Some(EnumRawScalar::Unsigned(val)) => u32::try_from(val).unwrap_or(0),
        Some(EnumRawScalar::Float(val)) if val.fract() == 0.0 && val >= 1.0 => {
            u32::try_from(val as u64).unwrap_or(0)
        }
        Some(EnumRawScalar::Text(val)) => val.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    };
    Ok(n_page)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
