//! Per-run summary of processed disclosures.

use crate::export::{ExportError, ExportFormat, Exporter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Summary file stem used when none is configured
pub const DEFAULT_LABEL: &str = "disclosure_summary";

/// Column titles, in [`SummaryRow`] field order
pub const HEADER: [&str; 8] = [
    "corp_name",
    "corp_code",
    "report_name",
    "rcept_no",
    "rcept_dt",
    "saved_file",
    "dart_link",
    "status",
];

/// Index of the `dart_link` column
pub(crate) const LINK_COLUMN: usize = 6;

/// What happened to a disclosure's archive during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    /// Downloaded and written in this run
    Saved,
    /// Already present from an earlier run
    Skipped,
    /// Could not be downloaded or written
    Failed,
}

impl RowStatus {
    /// Lowercase label as written to the summary files.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Corporation name
    pub corp_name: String,
    /// 8-digit DART corporation code
    pub corp_code: String,
    /// Report title
    pub report_name: String,
    /// Receipt number
    pub rcept_no: String,
    /// Receipt date, `YYYYMMDD`
    pub rcept_dt: String,
    /// Archive file name, empty when the download failed
    pub saved_file: String,
    /// Viewer link on the public DART site
    pub dart_link: String,
    /// Outcome for this disclosure
    pub status: RowStatus,
}

impl SummaryRow {
    /// Field values in [`HEADER`] order.
    pub fn fields(&self) -> [&str; 8] {
        [
            self.corp_name.as_str(),
            self.corp_code.as_str(),
            self.report_name.as_str(),
            self.rcept_no.as_str(),
            self.rcept_dt.as_str(),
            self.saved_file.as_str(),
            self.dart_link.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Number of rows per [`RowStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Rows downloaded in this run
    pub saved: usize,
    /// Rows already on disk
    pub skipped: usize,
    /// Rows that failed
    pub failed: usize,
}

/// Where each summary file ended up.
///
/// The two formats are written independently, so either may fail alone.
#[derive(Debug)]
pub struct SummaryFiles {
    /// Outcome of the workbook write
    pub xlsx: Result<PathBuf, ExportError>,
    /// Outcome of the CSV write
    pub csv: Result<PathBuf, ExportError>,
}

impl SummaryFiles {
    /// True if both files were written.
    pub const fn all_written(&self) -> bool {
        self.xlsx.is_ok() && self.csv.is_ok()
    }
}

/// Append-only list of [`SummaryRow`]s collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    rows: Vec<SummaryRow>,
}

impl RunSummary {
    /// Create an empty summary.
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append a row.
    pub fn push(&mut self, row: SummaryRow) {
        self.rows.push(row);
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no rows were recorded.
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count rows by status.
    pub fn counts(&self) -> StatusCounts {
        self.rows
            .iter()
            .fold(StatusCounts::default(), |mut counts, row| {
                match row.status {
                    RowStatus::Saved => counts.saved += 1,
                    RowStatus::Skipped => counts.skipped += 1,
                    RowStatus::Failed => counts.failed += 1,
                }
                counts
            })
    }

    /// Path of the summary file for `format`: `<out_dir>/<label>_<year>.<ext>`.
    pub fn file_path(out_dir: &Path, label: &str, year: i32, format: ExportFormat) -> PathBuf {
        out_dir.join(format!("{label}_{year}.{}", format.extension()))
    }

    /// Write the summary as both `.xlsx` and `.csv` into `out_dir`.
    ///
    /// A failed format is logged and reported in the returned
    /// [`SummaryFiles`]; it never prevents the other from being written.
    pub fn write_all(&self, out_dir: &Path, label: &str, year: i32) -> SummaryFiles {
        SummaryFiles {
            xlsx: self.write_one(out_dir, label, year, ExportFormat::Xlsx),
            csv: self.write_one(out_dir, label, year, ExportFormat::Csv),
        }
    }

    fn write_one(
        &self,
        out_dir: &Path,
        label: &str,
        year: i32,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        let path = Self::file_path(out_dir, label, year, format);
        match self.export_to_file(&path, format) {
            Ok(()) => {
                tracing::info!(path = %path.display(), rows = self.len(), "wrote summary");
                Ok(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not write summary");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(rcept_no: &str, status: RowStatus) -> SummaryRow {
        SummaryRow {
            corp_name: "현대자동차".to_string(),
            corp_code: "00164742".to_string(),
            report_name: "분기보고서".to_string(),
            rcept_no: rcept_no.to_string(),
            rcept_dt: "20240515".to_string(),
            saved_file: String::new(),
            dart_link: String::new(),
            status,
        }
    }

    #[test]
    fn test_fields_follow_header() {
        let row = row("1", RowStatus::Skipped);
        let fields = row.fields();
        assert_eq!(fields.len(), HEADER.len());
        assert_eq!(fields[0], "현대자동차");
        assert_eq!(fields[3], "1");
        assert_eq!(HEADER[LINK_COLUMN], "dart_link");
        assert_eq!(fields[7], "skipped");
    }

    #[rstest]
    #[case(RowStatus::Saved, "saved")]
    #[case(RowStatus::Skipped, "skipped")]
    #[case(RowStatus::Failed, "failed")]
    fn test_status_labels(#[case] status: RowStatus, #[case] label: &str) {
        assert_eq!(status.to_string(), label);
    }

    #[test]
    fn test_counts() {
        let mut summary = RunSummary::new();
        for (rcept_no, status) in [
            ("1", RowStatus::Saved),
            ("2", RowStatus::Saved),
            ("3", RowStatus::Skipped),
            ("4", RowStatus::Failed),
        ] {
            summary.push(row(rcept_no, status));
        }
        assert_eq!(
            summary.counts(),
            StatusCounts {
                saved: 2,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(summary.len(), 4);
        assert_eq!(summary.rows()[2].rcept_no, "3");
    }

    #[test]
    fn test_file_path() {
        let path = RunSummary::file_path(
            Path::new("/tmp/out"),
            DEFAULT_LABEL,
            2024,
            ExportFormat::Csv,
        );
        assert_eq!(path, Path::new("/tmp/out/disclosure_summary_2024.csv"));
    }
}
