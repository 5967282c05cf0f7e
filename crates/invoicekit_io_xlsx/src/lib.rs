//! `invoicekit_io_xlsx` v1:
//! Spreadsheet export of page-indexed invoice extraction results.
//!
//! Module layout:
//! - `conf`    : constants and default presets
//! - `spec`    : specs/models/options
//! - `model`   : lenient extraction result input
//! - `util`    : pure helpers (sanitize, classify, widths, sheet names)
//! - `style`   : cell presentation descriptors and sheet layout
//! - `builder` : workbook assembly
//! - `writer`  : pure-Rust writer kernel
pub mod builder;
pub mod conf;
pub mod model;
pub mod spec;
pub mod style;
pub mod util;
pub mod writer;

pub use builder::{build_workbook, derive_table_sheet_label};
pub use conf::{
    C_FILE_NAME_DEFAULT, N_LEN_EXCEL_CELL_TEXT_MAX, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use model::{ExtractionField, ExtractionPage, ExtractionResult, ExtractionTable};
pub use spec::{
    EnumCellStyle, EnumCellValue, EnumCellValueKind, ExportError, SpecCell, SpecCellFormat,
    SpecCellRange, SpecColumnWidthPolicy, SpecExportFormats, SpecExportOptions, SpecExportReport,
    SpecSheet, SpecSheetLayout, SpecWorkbook,
};
pub use style::{derive_cell_format, derive_cell_style};
pub use util::{
    SheetNameRegistry, classify_and_format, estimate_column_widths, sanitize_sheet_name,
    sanitize_text,
};
pub use writer::{XlsxWriter, export_to_xlsx, write_workbook_to_buffer};
