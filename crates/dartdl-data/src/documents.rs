//! Disclosure document bundles (`document.xml`).
//!
//! OpenDART serves each disclosure's original documents as one zip archive.
//! When it cannot, it still answers (often with a 200 status) with a short
//! XML error body, so a response is only accepted once its content looks
//! like a real archive.

use crate::client::DartClient;
use crate::disclosures::{Disclosure, UNKNOWN_REPORT};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Local file header signature every zip archive starts with
pub const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Archives of this many bytes or fewer are treated as error bodies
pub const MIN_ARCHIVE_BYTES: usize = 1000;

/// Maximum length, in characters, of a sanitized file name
pub const MAX_FILE_NAME_CHARS: usize = 120;

/// Maximum length, in UTF-8 bytes, of a sanitized file name.
///
/// Keeps Hangul names (three bytes per syllable) plus a `.zip` extension
/// under the common 255 byte file name limit.
pub const MAX_FILE_NAME_BYTES: usize = 240;

const UNSAFE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

const DOCUMENT_ENDPOINT: &str = "/api/document.xml";

/// Why a single document could not be saved.
///
/// These are reported per disclosure; none of them ends a run.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The request never completed; the URL carrying the key is stripped
    #[error("request failed: {0}")]
    Request(reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),

    /// The body is not a zip archive (or is too short to be one)
    #[error("response is not a zip archive ({len} bytes)")]
    NotAnArchive {
        /// Body length in bytes
        len: usize,
    },

    /// The archive could not be written to disk
    #[error("could not write {path}: {source}")]
    Write {
        /// Destination that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for DocumentError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.without_url())
    }
}

/// Returns true if `content` starts with the zip signature and is longer
/// than [`MIN_ARCHIVE_BYTES`].
pub fn is_zip(content: &[u8]) -> bool {
    content.len() > MIN_ARCHIVE_BYTES && content.starts_with(ZIP_SIGNATURE)
}

/// Make `name` safe to use as a file name.
///
/// Path and shell-hostile characters (`\ / : * ? " < > |`) become `_`,
/// whitespace runs collapse into a single `_` and the result is cut to
/// [`MAX_FILE_NAME_CHARS`] characters and [`MAX_FILE_NAME_BYTES`] bytes,
/// whichever is shorter. A name with nothing left becomes `unknown_report`.
///
/// # Example
/// ```
/// use dartdl_data::documents::sanitize_filename;
///
/// assert_eq!(sanitize_filename("사업보고서 (2023.12)"), "사업보고서_(2023.12)");
/// assert_eq!(sanitize_filename("a/b:c"), "a_b_c");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let sanitized = truncate(&clean(name), MAX_FILE_NAME_CHARS, MAX_FILE_NAME_BYTES);
    if sanitized.is_empty() {
        UNKNOWN_REPORT.to_string()
    } else {
        sanitized
    }
}

fn clean(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Longest prefix of `s` within both limits, cut on a character boundary.
fn truncate(s: &str, max_chars: usize, max_bytes: usize) -> String {
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take(max_chars)
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    s[..end].to_string()
}

/// File name an archive is saved under: `<date>_<report>_<receipt>.zip`.
///
/// Only the report name is shortened to fit the length limits, so the
/// receipt number always survives and distinct disclosures never share a
/// name.
pub fn archive_file_name(disclosure: &Disclosure) -> String {
    let date = clean(&disclosure.rcept_dt);
    let receipt = clean(&disclosure.rcept_no);
    let fixed_chars = date.chars().count() + receipt.chars().count() + 2;
    let fixed_bytes = date.len() + receipt.len() + 2;

    let report = match clean(&disclosure.report_nm) {
        name if name.is_empty() => UNKNOWN_REPORT.to_string(),
        name => name,
    };
    let report = truncate(
        &report,
        MAX_FILE_NAME_CHARS.saturating_sub(fixed_chars),
        MAX_FILE_NAME_BYTES.saturating_sub(fixed_bytes),
    );

    format!("{date}_{report}_{receipt}.zip")
}

/// Receipt-number-only file name (`<receipt>.zip`), as produced by older runs.
pub fn receipt_file_name(disclosure: &Disclosure) -> String {
    format!("{}.zip", sanitize_filename(&disclosure.rcept_no))
}

/// Find an archive for `disclosure` that a previous run already saved.
///
/// Both the current naming scheme and the receipt-number-only scheme are
/// recognised. Files of [`MIN_ARCHIVE_BYTES`] or fewer do not count.
pub fn find_existing_archive(out_dir: &Path, disclosure: &Disclosure) -> Option<PathBuf> {
    [archive_file_name(disclosure), receipt_file_name(disclosure)]
        .into_iter()
        .map(|name| out_dir.join(name))
        .find(|path| {
            fs::metadata(path)
                .is_ok_and(|meta| meta.is_file() && meta.len() > MIN_ARCHIVE_BYTES as u64)
        })
}

/// Download one disclosure's document archive into `out_dir`.
///
/// The body is written verbatim under [`archive_file_name`] only if the
/// response status is a success and the body passes [`is_zip`]. Every
/// failure comes back as a [`DocumentError`] for the caller to report.
pub async fn download_document(
    client: &DartClient,
    disclosure: &Disclosure,
    out_dir: &Path,
) -> Result<PathBuf, DocumentError> {
    let response = client
        .get(DOCUMENT_ENDPOINT, &[("rcept_no", disclosure.rcept_no.as_str())])
        .await?;

    let status = response.status();
    let content = response.bytes().await?;

    if !status.is_success() {
        tracing::debug!(rcept_no = %disclosure.rcept_no, %status, "document request rejected");
        return Err(DocumentError::Status(status.as_u16()));
    }
    if !is_zip(&content) {
        tracing::debug!(
            rcept_no = %disclosure.rcept_no,
            len = content.len(),
            "document response is not a zip archive"
        );
        return Err(DocumentError::NotAnArchive { len: content.len() });
    }

    let path = out_dir.join(archive_file_name(disclosure));
    fs::write(&path, &content).map_err(|source| DocumentError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), bytes = content.len(), "saved document archive");
    Ok(path)
}
