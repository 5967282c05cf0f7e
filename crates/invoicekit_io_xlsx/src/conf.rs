//! XLSX export constants and default preset factories.

use crate::spec::{SpecCellFormat, SpecColumnWidthPolicy, SpecExportFormats};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Excel cell text maximum length.
pub const N_LEN_EXCEL_CELL_TEXT_MAX: usize = 32_767;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Currency symbols stripped before numeric parsing.
pub const TUP_CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₹'];
/// Non-word marks kept at the edges of sanitized text.
///
/// `#` ends labels such as "Invoice #", `%` ends rates, `&` and `@` join
/// names and addresses, and currency symbols lead or trail amounts.
pub const TUP_EDGE_MARKS_KEPT: [char; 9] = ['#', '%', '&', '@', '$', '€', '£', '¥', '₹'];
/// Upper bound for decimal places reproduced by a number mask.
pub const N_DECIMAL_PLACES_MAX: usize = 10;

/// Integer display mask with thousands grouping.
pub const C_NUM_FORMAT_INTEGER: &str = "#,##0";

/// Default output file name.
pub const C_FILE_NAME_DEFAULT: &str = "extracted_invoice_data.xlsx";
/// Sheet holding all key/value fields.
pub const C_SHEET_NAME_SUMMARY: &str = "Summary";
/// Sheet emitted when the extraction result holds no data.
pub const C_SHEET_NAME_PLACEHOLDER: &str = "Info";
/// Notice written into the placeholder sheet.
pub const C_PLACEHOLDER_TEXT: &str = "No data found in document";
/// Label prefix for tables without a usable name.
pub const C_TABLE_LABEL_DEFAULT: &str = "Table";
/// Summary sheet header row.
pub const TUP_SUMMARY_HEADER: [&str; 3] = ["Page", "Field Name", "Value"];

/// Default lower width bound in character units.
pub const N_WIDTH_CELL_MIN: usize = 12;
/// Default upper width bound in character units.
pub const N_WIDTH_CELL_MAX: usize = 100;
/// Width padding for header cells.
pub const N_WIDTH_PADDING_HEADER: usize = 6;
/// Width padding for data cells.
pub const N_WIDTH_PADDING_BODY: usize = 3;

/// Header row height in points.
pub const N_HEIGHT_ROW_HEADER: f64 = 25.0;
/// Data row height in points.
pub const N_HEIGHT_ROW_BODY: f64 = 18.0;

/// Build the default presentation presets used by the style engine.
pub fn derive_default_export_formats() -> SpecExportFormats {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        border: Some(1),
        text_wrap: Some(true),
        ..Default::default()
    };

    SpecExportFormats {
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            font_size: Some(11),
            bold: Some(true),
            font_color: Some("#FFFFFF".to_string()),
            bg_color: Some("#4472C4".to_string()),
            border_color: Some("#000000".to_string()),
            align: Some("center".to_string()),
            valign: Some("vcenter".to_string()),
            ..Default::default()
        }),
        body: cfg_base_fmt_spec.with_(SpecCellFormat {
            font_size: Some(10),
            border_color: Some("#D3D3D3".to_string()),
            valign: Some("top".to_string()),
            ..Default::default()
        }),
        band_even: SpecCellFormat {
            bg_color: Some("#FFFFFF".to_string()),
            ..Default::default()
        },
        band_odd: SpecCellFormat {
            bg_color: Some("#F2F2F2".to_string()),
            ..Default::default()
        },
        text: SpecCellFormat {
            align: Some("left".to_string()),
            ..Default::default()
        },
        number: SpecCellFormat {
            align: Some("right".to_string()),
            ..Default::default()
        },
    }
}

/// Build the width policy used for the summary sheet (page, label, value).
pub fn derive_summary_width_policy() -> SpecColumnWidthPolicy {
    SpecColumnWidthPolicy {
        widths_min_by_col: vec![8, 25, 40],
        widths_max_by_col: vec![10, 60, 80],
        ..Default::default()
    }
}
