//! The OpenDART corporation registry ("corp code master").
//!
//! OpenDART publishes every registered filer as one XML document inside a
//! zip archive. Each filer is a `<list>` node:
//!
//! ```xml
//! <result>
//!   <list>
//!     <corp_code>00126380</corp_code>
//!     <corp_name>삼성전자</corp_name>
//!     <stock_code>005930</stock_code>
//!     <modify_date>20240101</modify_date>
//!   </list>
//! </result>
//! ```

pub mod cache;
pub mod parse;

pub use cache::{CORP_CODE_XML, CORP_CODE_ZIP, DEFAULT_MAX_AGE, RegistryCache};
pub use parse::{parse_api_status, parse_registry};

/// A single registered filer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistryEntry {
    /// Eight-digit OpenDART corporation code
    pub corp_code: String,
    /// Registered corporation name
    pub corp_name: String,
    /// Exchange ticker, empty if the corporation is unlisted
    pub stock_code: String,
}

impl RegistryEntry {
    /// Create a registry entry.
    pub fn new(
        corp_code: impl Into<String>,
        corp_name: impl Into<String>,
        stock_code: impl Into<String>,
    ) -> Self {
        Self {
            corp_code: corp_code.into(),
            corp_name: corp_name.into(),
            stock_code: stock_code.into(),
        }
    }

    /// Returns true if the corporation has an exchange listing.
    pub fn is_listed(&self) -> bool {
        !self.stock_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_listed() {
        assert!(RegistryEntry::new("00126380", "삼성전자", "005930").is_listed());
        assert!(!RegistryEntry::new("00000001", "비상장", "").is_listed());
    }
}
