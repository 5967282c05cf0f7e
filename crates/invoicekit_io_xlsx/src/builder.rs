//! Workbook assembly: summary sheet, one sheet per table, placeholder fallback.

use log::debug;
use rayon::prelude::*;

use crate::conf::TUP_SUMMARY_HEADER;
use crate::model::{ExtractionResult, ExtractionTable};
use crate::spec::{EnumCellValue, SpecExportOptions, SpecSheet, SpecWorkbook};
use crate::style::{derive_plain_layout, derive_sheet_layout, style_grid};
use crate::util::{SheetNameRegistry, classify_and_format, estimate_column_widths, sanitize_text};

/// Table grid planned independently of sheet naming.
#[derive(Debug, Clone)]
struct SpecTableGrid {
    sheet_name_desired: String,
    sheet: SpecSheet,
    warnings: Vec<String>,
}

/// Build the complete workbook for one extraction result.
///
/// Sheet order: summary (if any field exists), then tables in page order and
/// in-page order. An empty result yields a single placeholder sheet.
pub fn build_workbook(result: &ExtractionResult, options: &SpecExportOptions) -> SpecWorkbook {
    let mut registry = SheetNameRegistry::new();
    let mut l_sheets = Vec::new();
    let mut l_warnings = Vec::new();

    if let Some(mut sheet) = build_summary_sheet(result, options) {
        sheet.name = registry.resolve(&options.sheet_name_summary);
        debug!(
            "planned summary sheet {:?}: rows={}",
            sheet.name,
            sheet.rows.len()
        );
        l_sheets.push(sheet);
    }

    let l_table_refs: Vec<(u32, usize, &ExtractionTable)> = result
        .pages
        .iter()
        .enumerate()
        .flat_map(|(page_pos, page)| {
            let n_page = page.page_number_or(page_pos);
            page.tables
                .iter()
                .enumerate()
                .map(move |(table_idx, table)| (n_page, table_idx, table))
        })
        .collect();

    // collect() on an indexed parallel iterator keeps input order
    let l_table_grids: Vec<SpecTableGrid> = if options.if_parallel_tables {
        l_table_refs
            .par_iter()
            .map(|(n_page, table_idx, table)| plan_table_grid(*n_page, *table_idx, table, options))
            .collect()
    } else {
        l_table_refs
            .iter()
            .map(|(n_page, table_idx, table)| plan_table_grid(*n_page, *table_idx, table, options))
            .collect()
    };

    for table_grid in l_table_grids {
        let SpecTableGrid {
            sheet_name_desired,
            mut sheet,
            warnings,
        } = table_grid;
        l_warnings.extend(warnings);

        sheet.name = registry.resolve(&sheet_name_desired);
        if sheet.name != sheet_name_desired {
            debug!("sheet name {sheet_name_desired:?} resolved to {:?}", sheet.name);
            l_warnings.push(format!(
                "Sheet name {sheet_name_desired:?} adjusted to {:?}.",
                sheet.name
            ));
        }
        debug!(
            "planned table sheet {:?}: rows={} cols={}",
            sheet.name,
            sheet.rows.len(),
            sheet.widths.len()
        );
        l_sheets.push(sheet);
    }

    if l_sheets.is_empty() {
        let mut sheet = build_placeholder_sheet(options);
        sheet.name = registry.resolve(&options.sheet_name_placeholder);
        debug!("no fields or tables found; emitting {:?}", sheet.name);
        l_sheets.push(sheet);
    }

    SpecWorkbook {
        sheets: l_sheets,
        doc_title: options.doc_title.clone(),
        doc_author: options.doc_author.clone(),
        warnings: l_warnings,
    }
}

/// Flatten all fields into `(page, label, value)` rows; `None` without fields.
///
/// The returned sheet is not yet named.
pub fn build_summary_sheet(
    result: &ExtractionResult,
    options: &SpecExportOptions,
) -> Option<SpecSheet> {
    let mut grid: Vec<Vec<EnumCellValue>> = vec![
        TUP_SUMMARY_HEADER
            .iter()
            .map(|label| EnumCellValue::text(*label))
            .collect(),
    ];

    for (page_pos, page) in result.pages.iter().enumerate() {
        let n_page = page.page_number_or(page_pos);
        for field in &page.fields {
            grid.push(vec![
                EnumCellValue::integer(n_page),
                EnumCellValue::text(sanitize_text(&field.label)),
                classify_and_format(&sanitize_text(&field.value)),
            ]);
        }
    }

    if grid.len() == 1 {
        return None;
    }

    let widths = estimate_column_widths(&grid, &options.policy_width_summary);
    let rows = style_grid(grid, &options.formats);
    let layout = derive_sheet_layout(&rows, options);
    Some(SpecSheet {
        name: String::new(),
        rows,
        widths,
        layout,
    })
}

/// Convert one table into a styled grid: sanitized header row, classified body.
///
/// The returned sheet is not yet named.
pub fn build_table_sheet(table: &ExtractionTable, options: &SpecExportOptions) -> SpecSheet {
    let mut grid: Vec<Vec<EnumCellValue>> = Vec::with_capacity(table.rows.len() + 1);
    grid.push(
        table
            .headers
            .iter()
            .map(|header| EnumCellValue::text(sanitize_text(header)))
            .collect(),
    );
    for row in &table.rows {
        grid.push(
            row.iter()
                .map(|cell| classify_and_format(&sanitize_text(cell)))
                .collect(),
        );
    }

    let widths = estimate_column_widths(&grid, &options.policy_width);
    let rows = style_grid(grid, &options.formats);
    let layout = derive_sheet_layout(&rows, options);
    SpecSheet {
        name: String::new(),
        rows,
        widths,
        layout,
    }
}

/// Single notice sheet used when nothing was extracted. Not yet named.
pub fn build_placeholder_sheet(options: &SpecExportOptions) -> SpecSheet {
    let grid = vec![vec![EnumCellValue::text(options.placeholder_text.clone())]];
    let widths = estimate_column_widths(&grid, &options.policy_width);
    SpecSheet {
        name: String::new(),
        rows: style_grid(grid, &options.formats),
        widths,
        layout: derive_plain_layout(options),
    }
}

/// Desired sheet label `P<page>_<table name or default>`.
pub fn derive_table_sheet_label(
    page_number: u32,
    table_idx: usize,
    table: &ExtractionTable,
    options: &SpecExportOptions,
) -> String {
    let mut c_label = sanitize_text(&table.table_name);
    if c_label.is_empty() {
        c_label = format!("{} {}", options.table_label_default, table_idx + 1);
    }
    format!("P{page_number}_{c_label}")
}

fn plan_table_grid(
    page_number: u32,
    table_idx: usize,
    table: &ExtractionTable,
    options: &SpecExportOptions,
) -> SpecTableGrid {
    let sheet_name_desired = derive_table_sheet_label(page_number, table_idx, table, options);

    let mut l_warnings = Vec::new();
    if table.is_ragged() {
        l_warnings.push(format!(
            "Table {sheet_name_desired:?}: {} row(s) differ from header width {}.",
            table.count_ragged_rows(),
            table.headers.len()
        ));
    }

    SpecTableGrid {
        sheet_name_desired,
        sheet: build_table_sheet(table, options),
        warnings: l_warnings,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{ExtractionField, ExtractionPage};
    use crate::spec::EnumCellStyle;

    fn make_page(page_number: u32, fields: Vec<ExtractionField>, tables: Vec<ExtractionTable>) -> ExtractionPage {
        ExtractionPage {
            page_number,
            fields,
            tables,
        }
    }

    #[test]
    fn test_build_end_to_end_invoice() {
        let result = ExtractionResult {
            pages: vec![make_page(
                1,
                vec![ExtractionField::new("Invoice #", "INV-001")],
                vec![ExtractionTable::new(
                    "Items",
                    &["Qty", "Price"],
                    &[&["2", "10.50"]],
                )],
            )],
        };

        let workbook = build_workbook(&result, &SpecExportOptions::default());
        assert_eq!(workbook.sheet_names(), vec!["Summary", "P1_Items"]);

        let summary = workbook.sheet("Summary").expect("summary sheet");
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(
            summary.row_values(1),
            vec![
                EnumCellValue::integer(1),
                EnumCellValue::text("Invoice #"),
                EnumCellValue::text("INV-001"),
            ]
        );

        let items = workbook.sheet("P1_Items").expect("table sheet");
        assert_eq!(
            items.row_values(0),
            vec![EnumCellValue::text("Qty"), EnumCellValue::text("Price")]
        );
        assert_eq!(
            items.row_values(1),
            vec![
                EnumCellValue::Number {
                    value: 2.0,
                    decimal_places: 0
                },
                EnumCellValue::Number {
                    value: 10.5,
                    decimal_places: 2
                },
            ]
        );
        let price = items.cell(1, 1).expect("price cell");
        assert_eq!(price.format.num_format.as_deref(), Some("#,##0.00"));
        assert_eq!(price.value.to_display_text(), "10.50");
        assert_eq!(price.style, EnumCellStyle::OddDataCell);
        assert!(workbook.warnings.is_empty());
    }

    #[test]
    fn test_build_duplicate_table_names_are_unique() {
        let table = ExtractionTable::new("Items", &["A"], &[&["1"]]);
        let result = ExtractionResult {
            pages: vec![make_page(4, vec![], vec![table.clone(), table])],
        };

        let workbook = build_workbook(&result, &SpecExportOptions::default());
        let l_names = workbook.sheet_names();

        assert_eq!(l_names, vec!["P4_Items", "P4_Items_1"]);
        assert!(l_names.iter().all(|name| name.chars().count() <= 31));
        assert_eq!(workbook.warnings.len(), 1);
    }

    #[test]
    fn test_build_empty_result_yields_placeholder() {
        let options = SpecExportOptions::default();
        for result in [
            ExtractionResult::default(),
            ExtractionResult {
                pages: vec![make_page(1, vec![], vec![]), make_page(2, vec![], vec![])],
            },
        ] {
            let workbook = build_workbook(&result, &options);
            assert_eq!(workbook.sheet_names(), vec!["Info"]);

            let sheet = &workbook.sheets[0];
            assert_eq!(
                sheet.row_values(0),
                vec![EnumCellValue::text("No data found in document")]
            );
            assert_eq!(sheet.layout.autofilter, None);
            assert_eq!(sheet.layout.row_freeze, None);
        }
    }

    #[test]
    fn test_build_ragged_rows_are_tolerated() {
        let table = ExtractionTable::new(
            "Lines",
            &["Item", "Qty", "Price"],
            &[&["Widget"], &["Bolt", "3", "0.25", "extra"]],
        );
        let result = ExtractionResult {
            pages: vec![make_page(2, vec![], vec![table])],
        };

        let workbook = build_workbook(&result, &SpecExportOptions::default());
        let sheet = workbook.sheet("P2_Lines").expect("table sheet");

        assert_eq!(sheet.rows[1].len(), 1);
        assert_eq!(sheet.rows[2].len(), 4);
        assert_eq!(sheet.widths.len(), 4);
        assert!(sheet.cell(1, 2).is_none());
        assert_eq!(
            sheet.cell(2, 3).map(|cell| cell.value.clone()),
            Some(EnumCellValue::text("extra"))
        );
        assert_eq!(workbook.warnings.len(), 1);
        assert!(workbook.warnings[0].contains("2 row(s) differ from header width 3"));
    }

    #[test]
    fn test_build_orders_sheets_by_page_then_table() {
        let result = ExtractionResult {
            pages: vec![
                make_page(
                    1,
                    vec![ExtractionField::new("Date", "12/05/2024")],
                    vec![
                        ExtractionTable::new("B", &["x"], &[]),
                        ExtractionTable::new("A", &["x"], &[]),
                    ],
                ),
                make_page(2, vec![], vec![ExtractionTable::new("", &["x"], &[])]),
                make_page(0, vec![], vec![ExtractionTable::new("Z", &["x"], &[])]),
            ],
        };

        let options = SpecExportOptions::default();
        let workbook_par = build_workbook(&result, &options);
        let workbook_seq = build_workbook(
            &result,
            &SpecExportOptions {
                if_parallel_tables: false,
                ..SpecExportOptions::default()
            },
        );

        assert_eq!(
            workbook_par.sheet_names(),
            vec!["Summary", "P1_B", "P1_A", "P2_Table 1", "P3_Z"]
        );
        assert_eq!(workbook_par, workbook_seq);
    }

    #[test]
    fn test_summary_uses_narrow_page_and_wide_value_columns() {
        let result = ExtractionResult {
            pages: vec![make_page(
                1,
                vec![ExtractionField::new("Total", "$1,250.00")],
                vec![],
            )],
        };

        let sheet = build_summary_sheet(&result, &SpecExportOptions::default()).expect("summary");
        assert_eq!(sheet.widths, vec![10, 25, 40]);
        assert_eq!(
            sheet.row_values(1)[2],
            EnumCellValue::Number {
                value: 1250.0,
                decimal_places: 2
            }
        );
    }

    #[test]
    fn test_table_sheet_label_sanitizes_and_defaults() {
        let options = SpecExportOptions::default();
        let table_named = ExtractionTable::new("  \"Line Items\" ", &[], &[]);
        let table_blank = ExtractionTable::new("***", &[], &[]);

        assert_eq!(
            derive_table_sheet_label(3, 0, &table_named, &options),
            "P3_Line Items"
        );
        assert_eq!(
            derive_table_sheet_label(3, 1, &table_blank, &options),
            "P3_Table 2"
        );
    }
}
