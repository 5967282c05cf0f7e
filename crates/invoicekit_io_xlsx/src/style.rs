//! Presentation descriptors for grid cells and sheet-level directives.

use crate::spec::{
    EnumCellStyle, EnumCellValue, EnumCellValueKind, SpecCell, SpecCellFormat, SpecCellRange,
    SpecExportFormats, SpecExportOptions, SpecSheetLayout,
};

/// Presentation tag for the cell at sheet row `row_idx`.
///
/// Row 0 is the header; data rows band on row parity.
pub fn derive_cell_style(row_idx: usize) -> EnumCellStyle {
    if row_idx == 0 {
        EnumCellStyle::HeaderCell
    } else if row_idx % 2 == 0 {
        EnumCellStyle::EvenDataCell
    } else {
        EnumCellStyle::OddDataCell
    }
}

/// Build the presentation descriptor for one cell.
///
/// Numeric data cells carry the mask derived from the decimal places recorded
/// at parse time.
pub fn derive_cell_format(
    style: EnumCellStyle,
    value: &EnumCellValue,
    formats: &SpecExportFormats,
) -> SpecCellFormat {
    let fmt_band = match style {
        EnumCellStyle::HeaderCell => return formats.header.clone(),
        EnumCellStyle::EvenDataCell => &formats.band_even,
        EnumCellStyle::OddDataCell => &formats.band_odd,
    };

    let fmt_cell = formats.body.merge(fmt_band);
    match value.kind() {
        EnumCellValueKind::Text => fmt_cell.merge(&formats.text),
        EnumCellValueKind::Number => fmt_cell.merge(&formats.number).with_(SpecCellFormat {
            num_format: value.num_format(),
            ..Default::default()
        }),
    }
}

/// Style one cell positioned at sheet row `row_idx`.
pub fn style_cell(row_idx: usize, value: EnumCellValue, formats: &SpecExportFormats) -> SpecCell {
    let style = derive_cell_style(row_idx);
    let format = derive_cell_format(style, &value, formats);
    SpecCell {
        value,
        style,
        format,
    }
}

/// Attach style tags and descriptors to every cell of `grid`.
pub fn style_grid(grid: Vec<Vec<EnumCellValue>>, formats: &SpecExportFormats) -> Vec<Vec<SpecCell>> {
    grid.into_iter()
        .enumerate()
        .map(|(row_idx, row)| {
            row.into_iter()
                .map(|value| style_cell(row_idx, value, formats))
                .collect()
        })
        .collect()
}

/// Freeze the header row and filter over the populated rectangle.
pub fn derive_sheet_layout(rows: &[Vec<SpecCell>], options: &SpecExportOptions) -> SpecSheetLayout {
    let n_rows = rows.len();
    let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);

    let autofilter = if n_rows > 0 && n_cols > 0 {
        Some(SpecCellRange {
            row_first: 0,
            col_first: 0,
            row_last: n_rows - 1,
            col_last: n_cols - 1,
        })
    } else {
        None
    };

    SpecSheetLayout {
        row_freeze: if n_rows > 0 { Some(1) } else { None },
        autofilter,
        height_row_header: options.height_row_header,
        height_row_body: options.height_row_body,
    }
}

/// Layout without freeze pane or autofilter, for notice sheets.
pub fn derive_plain_layout(options: &SpecExportOptions) -> SpecSheetLayout {
    SpecSheetLayout {
        row_freeze: None,
        autofilter: None,
        height_row_header: options.height_row_header,
        height_row_body: options.height_row_body,
    }
}
