use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use invoicekit_io_xlsx::{
    ExtractionResult, SpecExportOptions, build_workbook, export_to_xlsx, write_workbook_to_buffer,
};
use pretty_assertions::assert_eq;
use zip::ZipArchive;

const C_INVOICE_JSON: &str = r#"{
    "pages": [
        {
            "pageNumber": 1,
            "fields": [
                {"label": "Invoice #", "value": "INV-001"},
                {"label": "Date", "value": "15/01/2024"},
                {"label": "Total", "value": "$1,250.00"}
            ],
            "tables": [{
                "tableName": "Line Items",
                "headers": ["Description", "Qty", "Unit Price"],
                "rows": [["Widget", "2", "10.50"], ["Bolt", "10", "0.25"]]
            }]
        },
        {
            "pageNumber": 2,
            "fields": [],
            "tables": [
                {"tableName": "Line Items", "headers": ["Note"], "rows": [["Thanks!"]]},
                {"tableName": "line items", "headers": ["Note"], "rows": [["Again"]]}
            ]
        }
    ]
}"#;

fn read_sheets(path: &Path) -> (Vec<String>, Xlsx<std::io::BufReader<std::fs::File>>) {
    let workbook: Xlsx<_> = open_workbook(path).expect("open xlsx");
    (workbook.sheet_names(), workbook)
}

fn read_range(workbook: &mut Xlsx<std::io::BufReader<std::fs::File>>, name: &str) -> Range<Data> {
    workbook.worksheet_range(name).expect("read sheet")
}

fn cell(range: &Range<Data>, row: u32, col: u32) -> Data {
    range.get_value((row, col)).cloned().unwrap_or(Data::Empty)
}

fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

#[test]
fn test_export_invoice_writes_summary_and_table_sheets() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("invoice.xlsx");
    let result = ExtractionResult::from_json_str(C_INVOICE_JSON).expect("decode");

    let report = export_to_xlsx(&result, Some(&path), &SpecExportOptions::default()).expect("export");
    assert_eq!(
        report.sheets,
        vec!["Summary", "P1_Line Items", "P2_Line Items", "P2_line items_1"]
    );

    let (l_names, mut workbook) = read_sheets(&path);
    assert_eq!(l_names, report.sheets);

    let summary = read_range(&mut workbook, "Summary");
    assert_eq!(cell(&summary, 0, 0), text("Page"));
    assert_eq!(cell(&summary, 0, 1), text("Field Name"));
    assert_eq!(cell(&summary, 0, 2), text("Value"));
    assert_eq!(cell(&summary, 1, 0), Data::Float(1.0));
    assert_eq!(cell(&summary, 1, 1), text("Invoice #"));
    assert_eq!(cell(&summary, 1, 2), text("INV-001"));
    assert_eq!(cell(&summary, 2, 2), text("15/01/2024"));
    assert_eq!(cell(&summary, 3, 2), Data::Float(1250.0));

    let items = read_range(&mut workbook, "P1_Line Items");
    assert_eq!(cell(&items, 0, 2), text("Unit Price"));
    assert_eq!(cell(&items, 1, 0), text("Widget"));
    assert_eq!(cell(&items, 1, 1), Data::Float(2.0));
    assert_eq!(cell(&items, 1, 2), Data::Float(10.5));
    assert_eq!(cell(&items, 2, 2), Data::Float(0.25));

    let notes = read_range(&mut workbook, "P2_line items_1");
    assert_eq!(cell(&notes, 1, 0), text("Again"));
}

#[test]
fn test_export_empty_result_writes_placeholder_sheet() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("empty.xlsx");
    let result = ExtractionResult::from_json_str(r#"{"pages": [{"pageNumber": 1}]}"#).expect("decode");

    let report = export_to_xlsx(&result, Some(&path), &SpecExportOptions::default()).expect("export");
    assert_eq!(report.sheets, vec!["Info"]);
    assert!(report.warnings.is_empty());

    let (l_names, mut workbook) = read_sheets(&path);
    assert_eq!(l_names, vec!["Info"]);
    let info = read_range(&mut workbook, "Info");
    assert_eq!(cell(&info, 0, 0), text("No data found in document"));
}

#[test]
fn test_buffer_matches_saved_workbook_sheets() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("buffer.xlsx");
    let result = ExtractionResult::from_json_str(C_INVOICE_JSON).expect("decode");

    let spec = build_workbook(&result, &SpecExportOptions::default());
    let v_bytes = write_workbook_to_buffer(&spec).expect("serialize");
    std::fs::write(&path, &v_bytes).expect("write bytes");

    let (l_names, _) = read_sheets(&path);
    assert_eq!(l_names, spec.sheet_names());
}

fn read_zip_entry(v_bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(v_bytes)).expect("open zip");
    let mut c_xml = String::new();
    archive
        .by_name(name)
        .expect("zip entry")
        .read_to_string(&mut c_xml)
        .expect("read zip entry");
    c_xml
}

#[test]
fn test_container_carries_number_mask_freeze_pane_and_autofilter() {
    let result = ExtractionResult::from_json_str(
        r#"{"pages": [{"pageNumber": 1, "tables": [
            {"tableName": "Rates", "headers": ["Rate"], "rows": [["12.340"], ["7"]]}
        ]}]}"#,
    )
    .expect("decode");

    let spec = build_workbook(&result, &SpecExportOptions::default());
    assert_eq!(spec.sheet_names(), vec!["P1_Rates"]);
    let v_bytes = write_workbook_to_buffer(&spec).expect("serialize");

    let c_styles = read_zip_entry(&v_bytes, "xl/styles.xml");
    assert!(c_styles.contains(r##"formatCode="#,##0.000""##));

    let c_sheet = read_zip_entry(&v_bytes, "xl/worksheets/sheet1.xml");
    assert!(c_sheet.contains(r#"ySplit="1""#));
    assert!(c_sheet.contains(r#"state="frozen""#));
    assert!(c_sheet.contains(r#"<autoFilter ref="A1:A3"/>"#));
}
