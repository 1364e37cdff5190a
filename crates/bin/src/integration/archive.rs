//! Per-disclosure archive loop.

use dartdl_data::{
    DartClient, Disclosure, DocumentError, RegistryEntry, download_document,
    find_existing_archive, viewer_url,
};
use dartdl_output::{RowStatus, RunSummary, SummaryRow};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Progress bar for `len` documents.
pub(crate) fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn say(progress: Option<&ProgressBar>, line: String) {
    match progress {
        Some(pb) => pb.suspend(|| println!("{line}")),
        None => println!("{line}"),
    }
}

/// The one line printed for a failed download.
fn failure_line(error: &DocumentError) -> String {
    let detail = error.to_string();
    format!("  -> failed: {}", detail.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Save every disclosure's archive into `out_dir` and record one row each.
///
/// A disclosure whose archive is already on disk (under either the full name
/// or `<rcept_no>.zip`, larger than 1000 bytes) is skipped without a request.
/// A failed download is recorded and the loop moves on. The client's
/// document delay is slept after every request.
pub(crate) async fn archive_all(
    client: &DartClient,
    corp: &RegistryEntry,
    disclosures: &[Disclosure],
    out_dir: &Path,
    progress: Option<&ProgressBar>,
) -> RunSummary {
    let total = disclosures.len();
    let mut summary = RunSummary::new();

    for (i, disclosure) in disclosures.iter().enumerate() {
        say(
            progress,
            format!(
                "[{}/{total}] {} ({})  rcept_no:{}",
                i + 1,
                disclosure.report_nm,
                disclosure.rcept_dt,
                disclosure.rcept_no
            ),
        );
        if let Some(pb) = progress {
            pb.set_message(disclosure.rcept_no.clone());
        }

        let (status, saved_file) = match find_existing_archive(out_dir, disclosure) {
            Some(existing) => {
                say(progress, format!("  -> already saved: {}", file_name(&existing)));
                tracing::info!(rcept_no = %disclosure.rcept_no, "archive exists, skipping");
                (RowStatus::Skipped, file_name(&existing))
            }
            None => {
                let outcome = download_document(client, disclosure, out_dir).await;
                let row = match outcome {
                    Ok(path) => {
                        say(progress, format!("  -> saved: {}", file_name(&path)));
                        (RowStatus::Saved, file_name(&path))
                    }
                    Err(e) => {
                        say(progress, failure_line(&e));
                        tracing::debug!(rcept_no = %disclosure.rcept_no, "document download failed");
                        (RowStatus::Failed, String::new())
                    }
                };
                tokio::time::sleep(client.pacing().document_delay).await;
                row
            }
        };

        summary.push(SummaryRow {
            corp_name: corp.corp_name.clone(),
            corp_code: corp.corp_code.clone(),
            report_name: disclosure.report_nm.clone(),
            rcept_no: disclosure.rcept_no.clone(),
            rcept_dt: disclosure.rcept_dt.clone(),
            saved_file,
            dart_link: viewer_url(&disclosure.rcept_no),
            status,
        });

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use dartdl_data::Pacing;
    use dartdl_data::documents::{ZIP_SIGNATURE, archive_file_name};
    use mockito::{Matcher, Server};
    use std::fs;

    fn corp() -> RegistryEntry {
        RegistryEntry::new("00126380", "삼성전자", "005930")
    }

    fn disclosure(rcept_no: &str, report_nm: &str) -> Disclosure {
        Disclosure {
            rcept_no: rcept_no.to_string(),
            rcept_dt: "20240312".to_string(),
            report_nm: report_nm.to_string(),
        }
    }

    fn client(server: &Server) -> DartClient {
        DartClient::with_base_url("test-key", server.url())
            .unwrap()
            .with_pacing(Pacing::none())
    }

    fn archive_bytes() -> Vec<u8> {
        let mut bytes = ZIP_SIGNATURE.to_vec();
        bytes.resize(2048, 1);
        bytes
    }

    #[tokio::test]
    async fn test_existing_receipt_archive_is_not_requested() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/document.xml")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("12345.zip"), vec![0u8; 2000]).unwrap();

        let summary = archive_all(
            &client(&server),
            &corp(),
            &[disclosure("12345", "사업보고서")],
            dir.path(),
            None,
        )
        .await;

        mock.assert_async().await;
        let row = &summary.rows()[0];
        assert_eq!(row.status, RowStatus::Skipped);
        assert_eq!(row.saved_file, "12345.zip");
    }

    #[tokio::test]
    async fn test_existing_full_name_archive_is_not_requested() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/document.xml")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let d = disclosure("12345", "사업보고서");
        fs::write(dir.path().join(archive_file_name(&d)), archive_bytes()).unwrap();

        let summary = archive_all(&client(&server), &corp(), &[d], dir.path(), None).await;

        mock.assert_async().await;
        assert_eq!(summary.rows()[0].status, RowStatus::Skipped);
    }

    #[tokio::test]
    async fn test_small_existing_file_is_downloaded_again() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/document.xml")
            .match_query(Matcher::UrlEncoded("rcept_no".into(), "12345".into()))
            .with_body(archive_bytes())
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("12345.zip"), vec![0u8; 500]).unwrap();

        let summary = archive_all(
            &client(&server),
            &corp(),
            &[disclosure("12345", "사업보고서")],
            dir.path(),
            None,
        )
        .await;

        mock.assert_async().await;
        assert_eq!(summary.rows()[0].status, RowStatus::Saved);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("GET", "/api/document.xml")
            .match_query(Matcher::UrlEncoded("rcept_no".into(), "1".into()))
            .with_body(archive_bytes())
            .expect(1)
            .create_async()
            .await;
        let not_zip = server
            .mock("GET", "/api/document.xml")
            .match_query(Matcher::UrlEncoded("rcept_no".into(), "2".into()))
            .with_body("<result><status>014</status><message>파일이 존재하지 않습니다.</message></result>")
            .expect(1)
            .create_async()
            .await;
        let server_error = server
            .mock("GET", "/api/document.xml")
            .match_query(Matcher::UrlEncoded("rcept_no".into(), "3".into()))
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let disclosures = [
            disclosure("1", "사업보고서 (2023.12)"),
            disclosure("2", "분기보고서"),
            disclosure("3", "반기보고서"),
        ];
        let summary =
            archive_all(&client(&server), &corp(), &disclosures, dir.path(), None).await;

        ok.assert_async().await;
        not_zip.assert_async().await;
        server_error.assert_async().await;

        let rows = summary.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].status, RowStatus::Saved);
        assert_eq!(rows[0].saved_file, "20240312_사업보고서_(2023.12)_1.zip");
        assert!(dir.path().join(&rows[0].saved_file).is_file());
        assert_eq!(rows[1].status, RowStatus::Failed);
        assert!(rows[1].saved_file.is_empty());
        assert_eq!(rows[2].status, RowStatus::Failed);

        for row in rows {
            assert_eq!(row.corp_name, "삼성전자");
            assert_eq!(row.corp_code, "00126380");
            assert_eq!(
                row.dart_link,
                format!("https://dart.fss.or.kr/dsaf001/main.do?rcpNo={}", row.rcept_no)
            );
        }
        let counts = summary.counts();
        assert_eq!((counts.saved, counts.skipped, counts.failed), (1, 0, 2));
    }

    #[tokio::test]
    async fn test_long_identical_report_names_are_both_downloaded() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/document.xml")
            .match_query(Matcher::Any)
            .with_body(archive_bytes())
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let report = "Prospectus ".repeat(20);
        let disclosures = [
            disclosure("20240312000001", &report),
            disclosure("20240312000002", &report),
        ];
        let summary =
            archive_all(&client(&server), &corp(), &disclosures, dir.path(), None).await;

        mock.assert_async().await;
        let rows = summary.rows();
        assert!(rows.iter().all(|row| row.status == RowStatus::Saved));
        assert_ne!(rows[0].saved_file, rows[1].saved_file);
        assert!(rows[0].saved_file.ends_with("_20240312000001.zip"));
        assert!(rows[1].saved_file.ends_with("_20240312000002.zip"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_failure_line_is_single_line() {
        assert_eq!(failure_line(&DocumentError::Status(500)), "  -> failed: HTTP 500");

        let err = DocumentError::Write {
            path: "out/a\nb.zip".into(),
            source: std::io::Error::other("disk full\nretry later"),
        };
        let line = failure_line(&err);
        assert!(!line.contains('\n'));
        assert!(line.ends_with("disk full retry later"));
    }
}
