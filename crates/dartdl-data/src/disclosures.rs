//! Paginated disclosure listing (`list.json`).

use crate::client::DartClient;
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Records requested per page (the endpoint maximum)
pub const PAGE_SIZE: u32 = 100;

/// Status OpenDART returns with a successful response
pub const STATUS_OK: &str = "000";

/// Report name used when a record carries none
pub const UNKNOWN_REPORT: &str = "unknown_report";

const LIST_ENDPOINT: &str = "/api/list.json";

/// A single filed disclosure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    /// Receipt number, unique per disclosure
    pub rcept_no: String,
    /// Receipt date as `YYYYMMDD`
    pub rcept_dt: String,
    /// Report title
    pub report_nm: String,
}

impl Disclosure {
    fn from_item(item: ListItem) -> Self {
        let report_nm = item
            .report_nm
            .into_iter()
            .chain(item.rpt_nm)
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_REPORT.to_string());

        Self {
            rcept_no: item.rcept_no,
            rcept_dt: item.rcept_dt,
            report_nm,
        }
    }
}

/// One page of `list.json`.
#[derive(Debug, Deserialize)]
struct ListResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default, deserialize_with = "count_from_number_or_string")]
    total_count: u64,
    #[serde(default)]
    list: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(default)]
    rcept_no: String,
    #[serde(default)]
    rcept_dt: String,
    #[serde(default)]
    report_nm: Option<String>,
    #[serde(default)]
    rpt_nm: Option<String>,
}

/// OpenDART documents `total_count` as a number but older responses quote it.
fn count_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Closed `[YYYY0101, YYYY1231]` range for a calendar year, formatted for the API.
pub fn year_range(year: i32) -> Result<(String, String)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, end) {
        (Some(start), Some(end)) => Ok((
            start.format("%Y%m%d").to_string(),
            end.format("%Y%m%d").to_string(),
        )),
        _ => Err(DataError::InvalidDateRange {
            start: format!("{year}-01-01"),
            end: format!("{year}-12-31"),
        }),
    }
}

/// Fetch every disclosure a corporation filed during `year`.
///
/// Pages of [`PAGE_SIZE`] records are requested from page 1 until the
/// collected count reaches the reported `total_count` or a page comes back
/// empty, sleeping the client's page delay between requests.
///
/// A response whose `status` is not [`STATUS_OK`] (OpenDART uses `013` for
/// "no data") ends the listing: it is logged and whatever was collected so
/// far is returned. Transport failures and non-success HTTP statuses are not
/// retried and abort with an error.
pub async fn fetch_disclosures(
    client: &DartClient,
    corp_code: &str,
    year: i32,
) -> Result<Vec<Disclosure>> {
    let (bgn_de, end_de) = year_range(year)?;
    let page_count = PAGE_SIZE.to_string();
    let mut disclosures: Vec<Disclosure> = Vec::new();
    let mut page_no: u32 = 1;

    tracing::info!(corp_code, %bgn_de, %end_de, "fetching disclosure list");

    loop {
        let page = page_no.to_string();
        let response = client
            .get(
                LIST_ENDPOINT,
                &[
                    ("corp_code", corp_code),
                    ("bgn_de", bgn_de.as_str()),
                    ("end_de", end_de.as_str()),
                    ("page_no", page.as_str()),
                    ("page_count", page_count.as_str()),
                ],
            )
            .await?;

        if !response.status().is_success() {
            return Err(DataError::http(LIST_ENDPOINT, response.status()));
        }

        let body = response.text().await?;
        let page: ListResponse = serde_json::from_str(&body)
            .map_err(|e| DataError::Parse(format!("invalid list.json response: {e}")))?;

        if page.status != STATUS_OK {
            tracing::warn!(
                status = %page.status,
                message = %page.message,
                page_no,
                "list.json returned a non-success status; stopping"
            );
            break;
        }

        let received = page.list.len();
        disclosures.extend(page.list.into_iter().map(Disclosure::from_item));
        tracing::debug!(page_no, received, total = page.total_count, "list page");

        if received == 0 || disclosures.len() as u64 >= page.total_count {
            break;
        }

        page_no += 1;
        tokio::time::sleep(client.pacing().page_delay).await;
    }

    tracing::info!(count = disclosures.len(), "disclosure list collected");
    Ok(disclosures)
}
