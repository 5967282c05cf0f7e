//! XLSX writer kernel that serializes an assembled workbook.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rust_xlsxwriter::{DocProperties, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::builder::build_workbook;
use crate::conf::{N_LEN_EXCEL_CELL_TEXT_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::model::ExtractionResult;
use crate::spec::{
    EnumCellValue, ExportError, SpecCellFormat, SpecExportOptions, SpecExportReport, SpecSheet,
    SpecWorkbook,
};

/// Stateful workbook writer.
///
/// The workbook is buffered in memory until [`Self::close`] or
/// [`Self::close_to_buffer`] is called.
pub struct XlsxWriter {
    path_file_out: Option<PathBuf>,
    workbook: Workbook,
    dict_formats: HashMap<SpecCellFormat, Format>,
    report: SpecExportReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to an output path.
    pub fn new(path_file_out: impl Into<PathBuf>) -> Self {
        Self::with_path(Some(path_file_out.into()))
    }

    /// Create writer that only produces bytes via [`Self::close_to_buffer`].
    pub fn new_in_memory() -> Self {
        Self::with_path(None)
    }

    fn with_path(path_file_out: Option<PathBuf>) -> Self {
        Self {
            report: SpecExportReport {
                path_file_out: path_file_out.clone(),
                ..Default::default()
            },
            path_file_out,
            workbook: Workbook::new(),
            dict_formats: HashMap::new(),
            if_closed: false,
        }
    }

    /// Return output file path as string; empty for in-memory writers.
    pub fn file_out(&self) -> String {
        self.path_file_out
            .as_ref()
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Return snapshot of the write report.
    pub fn report(&self) -> SpecExportReport {
        self.report.clone()
    }

    /// Write document properties and every sheet of `spec`, in order.
    pub fn write_workbook(&mut self, spec: &SpecWorkbook) -> Result<(), ExportError> {
        if self.if_closed {
            return Err(ExportError::Closed);
        }

        let properties = DocProperties::new()
            .set_title(&spec.doc_title)
            .set_author(&spec.doc_author);
        self.workbook.set_properties(&properties);

        for warning in &spec.warnings {
            self.report.warn(warning);
        }
        for sheet in &spec.sheets {
            self.write_sheet(sheet)?;
        }
        Ok(())
    }

    /// Write one named sheet with its cells, widths and layout directives.
    ///
    /// The sheet is attached to the workbook only after it was fully written,
    /// so a rejected name or cell leaves the workbook unchanged.
    pub fn write_sheet(&mut self, sheet: &SpecSheet) -> Result<(), ExportError> {
        if self.if_closed {
            return Err(ExportError::Closed);
        }

        let mut worksheet = Worksheet::new();
        worksheet.set_name(&sheet.name)?;
        write_sheet_body(&mut worksheet, sheet, &mut self.dict_formats, &mut self.report)?;
        self.workbook.push_worksheet(worksheet);

        self.report.sheets.push(sheet.name.clone());
        Ok(())
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), ExportError> {
        if self.if_closed {
            return Ok(());
        }
        let Some(path_file_out) = &self.path_file_out else {
            return Err(ExportError::MissingOutputPath);
        };
        self.workbook.save(path_file_out)?;
        debug!(
            "saved workbook {} with {} sheet(s)",
            path_file_out.display(),
            self.report.sheets.len()
        );
        self.if_closed = true;
        Ok(())
    }

    /// Serialize workbook into bytes and close the writer.
    pub fn close_to_buffer(&mut self) -> Result<Vec<u8>, ExportError> {
        if self.if_closed {
            return Err(ExportError::Closed);
        }
        let v_bytes = self.workbook.save_to_buffer()?;
        self.if_closed = true;
        Ok(v_bytes)
    }
}

/// Serialize an assembled workbook into `.xlsx` bytes.
pub fn write_workbook_to_buffer(spec: &SpecWorkbook) -> Result<Vec<u8>, ExportError> {
    let mut writer = XlsxWriter::new_in_memory();
    writer.write_workbook(spec)?;
    writer.close_to_buffer()
}

/// Build and write the workbook for `result`.
///
/// Writes to `path_file_out`, or to the default file name in the working
/// directory when `None`. Failures come only from serialization or I/O and are
/// not retried.
pub fn export_to_xlsx(
    result: &ExtractionResult,
    path_file_out: Option<&Path>,
    options: &SpecExportOptions,
) -> Result<SpecExportReport, ExportError> {
    let path_file_out = path_file_out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&options.file_name_default));

    let spec = build_workbook(result, options);
    let mut writer = XlsxWriter::new(path_file_out);
    writer.write_workbook(&spec)?;
    writer.close()?;
    Ok(writer.report())
}

fn write_sheet_body(
    worksheet: &mut Worksheet,
    sheet: &SpecSheet,
    dict_formats: &mut HashMap<SpecCellFormat, Format>,
    report: &mut SpecExportReport,
) -> Result<(), ExportError> {
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let n_row = cast_row_num(row_idx)?;
        for (col_idx, cell) in row.iter().enumerate() {
            let n_col = cast_col_num(col_idx)?;
            let format = dict_formats
                .entry(cell.format.clone())
                .or_insert_with(|| derive_rust_xlsx_format(&cell.format));

            match &cell.value {
                EnumCellValue::Text(val) if val.is_empty() => {
                    worksheet.write_blank(n_row, n_col, format)?;
                }
                EnumCellValue::Text(val) => {
                    let c_text = derive_cell_text_within_limit(val, &sheet.name, row_idx, col_idx, report);
                    worksheet.write_string_with_format(n_row, n_col, c_text, format)?;
                }
                EnumCellValue::Number { value, .. } => {
                    worksheet.write_number_with_format(n_row, n_col, *value, format)?;
                }
            }
        }

        let n_height = if row_idx == 0 {
            sheet.layout.height_row_header
        } else {
            sheet.layout.height_row_body
        };
        worksheet.set_row_height(n_row, n_height)?;
    }

    for (col_idx, n_width) in sheet.widths.iter().enumerate() {
        worksheet.set_column_width(cast_col_num(col_idx)?, *n_width as f64)?;
    }

    if let Some(n_row_freeze) = sheet.layout.row_freeze {
        worksheet.set_freeze_panes(cast_row_num(n_row_freeze)?, 0)?;
    }
    if let Some(range) = sheet.layout.autofilter {
        worksheet.autofilter(
            cast_row_num(range.row_first)?,
            cast_col_num(range.col_first)?,
            cast_row_num(range.row_last)?,
            cast_col_num(range.col_last)?,
        )?;
    }

    Ok(())
}

fn derive_cell_text_within_limit<'a>(
    text: &'a str,
    sheet_name: &str,
    row_idx: usize,
    col_idx: usize,
    report: &mut SpecExportReport,
) -> &'a str {
    match text.char_indices().nth(N_LEN_EXCEL_CELL_TEXT_MAX) {
        None => text,
        Some((n_byte_end, _)) => {
            warn!("sheet {sheet_name:?} cell ({row_idx}, {col_idx}) truncated to {N_LEN_EXCEL_CELL_TEXT_MAX} chars");
            report.warn(format!(
                "Sheet {sheet_name:?} cell ({row_idx}, {col_idx}): text truncated to {N_LEN_EXCEL_CELL_TEXT_MAX} characters."
            ));
            &text[..n_byte_end]
        }
    }
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(align) = spec.align.as_deref().and_then(derive_format_align) {
        format = format.set_align(align);
    }
    if let Some(align) = spec.valign.as_deref().and_then(derive_format_align) {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = &spec.border_color {
        format = format.set_border_color(val.as_str());
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, ExportError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(ExportError::RowOverflow(value));
    }
    u32::try_from(value).map_err(|_| ExportError::RowOverflow(value))
}

fn cast_col_num(value: usize) -> Result<u16, ExportError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(ExportError::ColumnOverflow(value));
    }
    u16::try_from(value).map_err(|_| ExportError::ColumnOverflow(value))
}
