//! Shared XLSX export specification models.

use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::{
    C_FILE_NAME_DEFAULT, C_PLACEHOLDER_TEXT, C_SHEET_NAME_PLACEHOLDER, C_SHEET_NAME_SUMMARY,
    C_TABLE_LABEL_DEFAULT, N_HEIGHT_ROW_BODY, N_HEIGHT_ROW_HEADER, N_WIDTH_CELL_MAX,
    N_WIDTH_CELL_MIN, N_WIDTH_PADDING_BODY, N_WIDTH_PADDING_HEADER,
    derive_default_export_formats, derive_summary_width_policy,
};
use crate::util::{derive_num_format, format_number_display};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Presentation descriptor attached to one cell.
///
/// Every field is optional so presets can be layered with [`Self::with_`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Border color for all sides.
    pub border_color: Option<String>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            border_color: other
                .border_color
                .clone()
                .or_else(|| self.border_color.clone()),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Preset descriptors consumed by the style engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportFormats {
    /// Header row descriptor.
    pub header: SpecCellFormat,
    /// Base descriptor for every data row.
    pub body: SpecCellFormat,
    /// Patch for even data rows.
    pub band_even: SpecCellFormat,
    /// Patch for odd data rows.
    pub band_odd: SpecCellFormat,
    /// Patch for text data cells.
    pub text: SpecCellFormat,
    /// Patch for numeric data cells.
    pub number: SpecCellFormat,
}

impl Default for SpecExportFormats {
    fn default() -> Self {
        derive_default_export_formats()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Kind tag of a classified cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCellValueKind {
    /// Free text, dates and identifiers.
    Text,
    /// Parsed numeric quantity.
    Number,
}

/// Classified cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Text value, written verbatim.
    Text(String),
    /// Numeric value with the decimal places its display mask reproduces.
    Number {
        /// Parsed value.
        value: f64,
        /// Decimal places shown by the display mask.
        decimal_places: usize,
    },
}

impl EnumCellValue {
    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Build an integer-masked numeric value.
    pub fn integer(value: impl Into<f64>) -> Self {
        Self::Number {
            value: value.into(),
            decimal_places: 0,
        }
    }

    /// Value kind tag.
    pub fn kind(&self) -> EnumCellValueKind {
        match self {
            Self::Text(_) => EnumCellValueKind::Text,
            Self::Number { .. } => EnumCellValueKind::Number,
        }
    }

    /// Display mask for numeric values; `None` for text.
    pub fn num_format(&self) -> Option<String> {
        match self {
            Self::Text(_) => None,
            Self::Number { decimal_places, .. } => Some(derive_num_format(*decimal_places)),
        }
    }

    /// Text as it renders in the spreadsheet.
    pub fn to_display_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number {
                value,
                decimal_places,
            } => format_number_display(*value, *decimal_places),
        }
    }
}

/// Closed set of cell presentation tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCellStyle {
    /// Row 0 of every grid.
    HeaderCell,
    /// Data row with even sheet row index.
    EvenDataCell,
    /// Data row with odd sheet row index.
    OddDataCell,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthPolicy

/// Column width estimation bounds and paddings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColumnWidthPolicy {
    /// Default lower bound.
    pub width_min: usize,
    /// Default upper bound.
    pub width_max: usize,
    /// Padding added to header cell lengths.
    pub width_padding_header: usize,
    /// Padding added to data cell lengths.
    pub width_padding_body: usize,
    /// Per-column lower bounds; `0` or a missing entry falls back to `width_min`.
    pub widths_min_by_col: Vec<usize>,
    /// Per-column upper bounds; `0` or a missing entry falls back to `width_max`.
    pub widths_max_by_col: Vec<usize>,
}

impl Default for SpecColumnWidthPolicy {
    fn default() -> Self {
        Self {
            width_min: N_WIDTH_CELL_MIN,
            width_max: N_WIDTH_CELL_MAX,
            width_padding_header: N_WIDTH_PADDING_HEADER,
            width_padding_body: N_WIDTH_PADDING_BODY,
            widths_min_by_col: vec![],
            widths_max_by_col: vec![],
        }
    }
}

impl SpecColumnWidthPolicy {
    /// Lower bound for column `col_idx`.
    pub fn width_min_at(&self, col_idx: usize) -> usize {
        match self.widths_min_by_col.get(col_idx) {
            Some(&n_width) if n_width > 0 => n_width,
            _ => self.width_min,
        }
    }

    /// Upper bound for column `col_idx`.
    pub fn width_max_at(&self, col_idx: usize) -> usize {
        match self.widths_max_by_col.get(col_idx) {
            Some(&n_width) if n_width > 0 => n_width,
            _ => self.width_max,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Export-wide options controlling naming, layout and presentation defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecExportOptions {
    /// Presentation presets.
    pub formats: SpecExportFormats,
    /// Width policy for table sheets.
    pub policy_width: SpecColumnWidthPolicy,
    /// Width policy for the summary sheet.
    pub policy_width_summary: SpecColumnWidthPolicy,
    /// Header row height in points.
    pub height_row_header: f64,
    /// Data row height in points.
    pub height_row_body: f64,
    /// Summary sheet name.
    pub sheet_name_summary: String,
    /// Placeholder sheet name.
    pub sheet_name_placeholder: String,
    /// Placeholder notice text.
    pub placeholder_text: String,
    /// Label prefix for unnamed tables.
    pub table_label_default: String,
    /// Workbook title document property.
    pub doc_title: String,
    /// Workbook author document property.
    pub doc_author: String,
    /// Plan table grids on the rayon pool.
    pub if_parallel_tables: bool,
    /// File name used when no output path is given.
    pub file_name_default: String,
}

impl Default for SpecExportOptions {
    fn default() -> Self {
        Self {
            formats: SpecExportFormats::default(),
            policy_width: SpecColumnWidthPolicy::default(),
            policy_width_summary: derive_summary_width_policy(),
            height_row_header: N_HEIGHT_ROW_HEADER,
            height_row_body: N_HEIGHT_ROW_BODY,
            sheet_name_summary: C_SHEET_NAME_SUMMARY.to_string(),
            sheet_name_placeholder: C_SHEET_NAME_PLACEHOLDER.to_string(),
            placeholder_text: C_PLACEHOLDER_TEXT.to_string(),
            table_label_default: C_TABLE_LABEL_DEFAULT.to_string(),
            doc_title: "Invoice Data Extraction".to_string(),
            doc_author: "Invoice Extractor".to_string(),
            if_parallel_tables: true,
            file_name_default: C_FILE_NAME_DEFAULT.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorkbookSpecification

/// One styled cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCell {
    /// Classified value.
    pub value: EnumCellValue,
    /// Presentation tag.
    pub style: EnumCellStyle,
    /// Presentation descriptor derived from `style` and `value`.
    pub format: SpecCellFormat,
}

/// Inclusive zero-based cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCellRange {
    /// First row.
    pub row_first: usize,
    /// First column.
    pub col_first: usize,
    /// Last row.
    pub row_last: usize,
    /// Last column.
    pub col_last: usize,
}

/// Sheet-level display directives.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetLayout {
    /// Rows frozen above the scroll area.
    pub row_freeze: Option<usize>,
    /// Autofilter rectangle.
    pub autofilter: Option<SpecCellRange>,
    /// Header row height in points.
    pub height_row_header: f64,
    /// Data row height in points.
    pub height_row_body: f64,
}

/// One named sheet ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheet {
    /// Unique sheet name.
    pub name: String,
    /// Row-major cells; row 0 is the header row. Rows may be ragged.
    pub rows: Vec<Vec<SpecCell>>,
    /// Width per column in character units.
    pub widths: Vec<usize>,
    /// Display directives.
    pub layout: SpecSheetLayout,
}

impl SpecSheet {
    /// Cell at `(row_idx, col_idx)`, `None` when absent.
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Option<&SpecCell> {
        self.rows.get(row_idx).and_then(|row| row.get(col_idx))
    }

    /// Values of one row, empty when the row is absent.
    pub fn row_values(&self, row_idx: usize) -> Vec<EnumCellValue> {
        self.rows
            .get(row_idx)
            .map(|row| row.iter().map(|cell| cell.value.clone()).collect())
            .unwrap_or_default()
    }
}

/// Fully assembled workbook. Never empty of sheets.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWorkbook {
    /// Sheets in output order.
    pub sheets: Vec<SpecSheet>,
    /// Title document property.
    pub doc_title: String,
    /// Author document property.
    pub doc_author: String,
    /// Non-fatal diagnostics collected while building.
    pub warnings: Vec<String>,
}

impl SpecWorkbook {
    /// Sheet names in output order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    /// Look up a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&SpecSheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportAndErrors

/// Per-export report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportReport {
    /// Output file, when written to disk.
    pub path_file_out: Option<PathBuf>,
    /// Sheet names in output order.
    pub sheets: Vec<String>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecExportReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

/// Export failures. Only container serialization and input decoding fail.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The container library rejected a write.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Filesystem failure while writing the output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Extraction result JSON could not be decoded.
    #[error("invalid extraction result: {0}")]
    Json(#[from] serde_json::Error),
    /// Row index beyond the container limit.
    #[error("row index overflow: {0}")]
    RowOverflow(usize),
    /// Column index beyond the container limit.
    #[error("column index overflow: {0}")]
    ColumnOverflow(usize),
    /// Writer used after `close()`.
    #[error("cannot write after close()")]
    Closed,
    /// In-memory writer asked to save to disk.
    #[error("writer has no output path")]
    MissingOutputPath,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
