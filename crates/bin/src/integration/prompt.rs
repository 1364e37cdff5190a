//! Interactive prompts.
//!
//! `dialoguer` reads block the calling thread, so every prompt runs on the
//! blocking pool. The run future stays pollable and Ctrl-C is observed even
//! while a prompt is waiting for input.

use crate::error::AppError;
use chrono::{Datelike, Local};
use dartdl_data::{RegistryEntry, SearchHit, search};
use dialoguer::Input;

/// What the user typed at the selection prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection {
    /// Empty input or `r`: search again
    Research,
    /// A valid index into the result list
    Pick(usize),
    /// Anything else
    Invalid,
}

/// Interpret a selection against a list of `len` results.
pub(crate) fn parse_selection(input: &str, len: usize) -> Selection {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("r") {
        return Selection::Research;
    }
    match input.parse::<usize>() {
        Ok(index) if index < len => Selection::Pick(index),
        _ => Selection::Invalid,
    }
}

/// Accept exactly four ASCII digits as a year.
pub(crate) fn parse_year(input: &str) -> Option<i32> {
    let input = input.trim();
    if input.len() == 4 && input.bytes().all(|b| b.is_ascii_digit()) {
        input.parse().ok()
    } else {
        None
    }
}

/// One line of the result list.
pub(crate) fn format_hit(index: usize, hit: &SearchHit) -> String {
    let entry = &hit.entry;
    if hit.listed {
        format!(
            "  [{index}] {}  (corp_code:{} / stock_code:{})",
            entry.corp_name, entry.corp_code, entry.stock_code
        )
    } else {
        format!("  [{index}] {}  (corp_code:{})", entry.corp_name, entry.corp_code)
    }
}

async fn ask<T, F>(prompt: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(prompt).await??)
}

async fn ask_text(prompt: &'static str, allow_empty: bool) -> Result<String, AppError> {
    ask(move || {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(allow_empty)
            .interact_text()
    })
    .await
}

/// Trimmed API key, or `None` when nothing was typed.
pub(crate) fn clean_api_key(input: &str) -> Option<String> {
    let key = input.trim();
    (!key.is_empty()).then(|| key.to_string())
}

/// Ask for the OpenDART API key until a non-blank one is entered.
///
/// The key is read as plain text. Ctrl-C at this prompt surfaces as an
/// `Interrupted` read error with the terminal mode already restored.
pub(crate) async fn api_key() -> Result<String, AppError> {
    loop {
        if let Some(key) = clean_api_key(&ask_text("OpenDART API key", true).await?) {
            return Ok(key);
        }
    }
}

/// Search loop: keyword, result list, selection.
///
/// Repeats until a valid index is chosen. An empty selection or `r` starts a
/// new search; an out-of-range or non-numeric selection is reported and
/// also starts over.
pub(crate) async fn choose_company(registry: &[RegistryEntry]) -> Result<RegistryEntry, AppError> {
    loop {
        println!();
        let keyword = ask_text("Company name (partial match)", false).await?;
        let hits = search(registry, &keyword);
        tracing::debug!(%keyword, hits = hits.len(), "registry search");

        if hits.is_empty() {
            println!("No matches. Try another name.");
            continue;
        }

        println!("\n{} result(s) (showing at most 200)", hits.len());
        for (index, hit) in hits.iter().enumerate() {
            println!("{}", format_hit(index, hit));
        }

        let input = ask_text("Select a number ('r' to search again)", true).await?;
        match parse_selection(&input, hits.len()) {
            Selection::Pick(index) => return Ok(hits[index].entry.clone()),
            Selection::Research => continue,
            Selection::Invalid => println!("Enter one of the numbers shown."),
        }
    }
}

/// Ask for the target year, falling back to the current year.
pub(crate) async fn choose_year() -> Result<i32, AppError> {
    println!();
    let input = ask_text("Year to download (e.g. 2024)", false).await?;
    Ok(parse_year(&input).unwrap_or_else(|| {
        let year = Local::now().year();
        println!("Not a four-digit year; using {year}.");
        year
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dartdl_data::MatchRank;

    #[test]
    fn test_selection_research() {
        assert_eq!(parse_selection("", 3), Selection::Research);
        assert_eq!(parse_selection("  ", 3), Selection::Research);
        assert_eq!(parse_selection("r", 3), Selection::Research);
        assert_eq!(parse_selection("R", 3), Selection::Research);
    }

    #[test]
    fn test_selection_bounds() {
        assert_eq!(parse_selection("0", 3), Selection::Pick(0));
        assert_eq!(parse_selection(" 2 ", 3), Selection::Pick(2));
        assert_eq!(parse_selection("3", 3), Selection::Invalid);
        assert_eq!(parse_selection("-1", 3), Selection::Invalid);
        assert_eq!(parse_selection("two", 3), Selection::Invalid);
    }

    #[test]
    fn test_year_accepts_four_digits() {
        assert_eq!(parse_year("2024"), Some(2024));
        assert_eq!(parse_year(" 1999 "), Some(1999));
    }

    #[test]
    fn test_year_rejects_malformed() {
        for input in ["24", "20245", "2o24", "", "+202", "２０２４"] {
            assert_eq!(parse_year(input), None, "{input:?}");
        }
    }

    #[test]
    fn test_clean_api_key() {
        assert_eq!(clean_api_key("  abc123 \n"), Some("abc123".to_string()));
        assert_eq!(clean_api_key("   "), None);
        assert_eq!(clean_api_key(""), None);
    }

    #[test]
    fn test_format_hit() {
        let listed = SearchHit {
            entry: RegistryEntry::new("00126380", "삼성전자", "005930"),
            rank: MatchRank::Exact,
            listed: true,
        };
        assert_eq!(
            format_hit(0, &listed),
            "  [0] 삼성전자  (corp_code:00126380 / stock_code:005930)"
        );

        let unlisted = SearchHit {
            entry: RegistryEntry::new("01234567", "삼성물류", ""),
            rank: MatchRank::Partial,
            listed: false,
        };
        assert_eq!(format_hit(7, &unlisted), "  [7] 삼성물류  (corp_code:01234567)");
    }
}
