// Batch report writers (xlsx and csv)

use retitle_recon::report::REPORT_COLUMNS;
use retitle_recon::BatchReport;
use rust_xlsxwriter::{Format, Workbook};

const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 60;

/// One header row plus one row per record, on a single named sheet.
pub fn write_xlsx(report: &BatchReport, sheet_name: &str) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let worksheet = workbook
            .add_worksheet()
            .set_name(sheet_name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

        for (col, title) in REPORT_COLUMNS.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *title, &header)
                .map_err(|e| format!("Failed to write header: {}", e))?;
        }

        for (i, row) in report.rows.iter().enumerate() {
            let row_num = (i + 1) as u32;
            for (col, cell) in row.cells().iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                worksheet
                    .write_string(row_num, col as u16, *cell)
                    .map_err(|e| format!("Failed to write row {}: {}", row_num, e))?;
            }
        }

        for (col, width) in column_widths(report).into_iter().enumerate() {
            worksheet
                .set_column_width(col as u16, width as f64)
                .map_err(|e| format!("Failed to size column {}: {}", col, e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Failed to save report: {}", e))
}

/// Same rows as `write_xlsx`, comma-separated with a header line.
pub fn write_csv(report: &BatchReport) -> Result<Vec<u8>, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(REPORT_COLUMNS)
        .map_err(|e| format!("Failed to write header: {}", e))?;
    for row in &report.rows {
        writer
            .write_record(row.cells())
            .map_err(|e| format!("Failed to write row: {}", e))?;
    }
    writer.into_inner().map_err(|e| format!("Failed to flush report: {}", e))
}

/// Widest cell per column (in chars), clamped to a readable range.
fn column_widths(report: &BatchReport) -> Vec<usize> {
    REPORT_COLUMNS
        .iter()
        .enumerate()
        .map(|(col, title)| {
            let widest = report
                .rows
                .iter()
                .map(|row| row.cells()[col].chars().count())
                .chain(std::iter::once(title.chars().count()))
                .max()
                .unwrap_or(0);
            (widest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}
