//! Serialization of a [`RunSummary`] to CSV and Excel.

use crate::summary::{HEADER, LINK_COLUMN, RunSummary};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the single worksheet in the summary workbook
pub const SHEET_NAME: &str = "summary";

/// UTF-8 byte order mark, prepended so spreadsheet applications detect the encoding
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook construction error.
    #[error("XLSX serialization error: {0}")]
    Xlsx(#[from] XlsxError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Excel workbook.
    Xlsx,

    /// Comma-separated values, UTF-8 with BOM.
    Csv,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to bytes in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// The file is only created once serialization has succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_bytes(format)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl Exporter for RunSummary {
    fn export_to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Csv => csv_bytes(self),
            ExportFormat::Xlsx => xlsx_bytes(self),
        }
    }
}

fn csv_bytes(summary: &RunSummary) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(UTF8_BOM.to_vec());
    wtr.write_record(HEADER)?;
    for row in summary.rows() {
        wtr.serialize(row)?;
    }
    Ok(wtr.into_inner().map_err(|e| e.into_error())?)
}

fn xlsx_bytes(summary: &RunSummary) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, title) in HEADER.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (i, row) in summary.rows().iter().enumerate() {
        let r = i as u32 + 1;
        for (col, value) in row.fields().iter().enumerate() {
            if col == LINK_COLUMN && !value.is_empty() {
                sheet.write_url(r, col as u16, *value)?;
            } else {
                sheet.write_string(r, col as u16, *value)?;
            }
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{RowStatus, SummaryRow};

    fn summary() -> RunSummary {
        let mut summary = RunSummary::new();
        summary.push(SummaryRow {
            corp_name: "삼성전자".to_string(),
            corp_code: "00126380".to_string(),
            report_name: "사업보고서, 2023".to_string(),
            rcept_no: "20240312000736".to_string(),
            rcept_dt: "20240312".to_string(),
            saved_file: "20240312_사업보고서,_2023_20240312000736.zip".to_string(),
            dart_link: "https://dart.fss.or.kr/dsaf001/main.do?rcpNo=20240312000736"
                .to_string(),
            status: RowStatus::Saved,
        });
        summary
    }

    #[test]
    fn test_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Xlsx.extension(), "xlsx");
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let bytes = summary().export_to_bytes(ExportFormat::Csv).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), HEADER.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("삼성전자,00126380,\"사업보고서, 2023\""));
        assert!(row.ends_with(",saved"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_empty_summary_has_header() {
        let bytes = RunSummary::new().export_to_bytes(ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.trim_end(), HEADER.join(","));
    }

    #[test]
    fn test_xlsx_is_zip_container() {
        let bytes = summary().export_to_bytes(ExportFormat::Xlsx).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        summary().export_to_file(&path, ExportFormat::Csv).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(UTF8_BOM));
    }
}
