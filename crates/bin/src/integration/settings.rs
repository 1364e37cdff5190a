//! Run settings and default locations.

use dartdl_data::{RegistryEntry, sanitize_filename};
use std::path::{Path, PathBuf};

/// Get the default registry cache directory.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/dartdl/`
/// - macOS: `~/Library/Caches/dartdl/`
/// - Windows: `%LOCALAPPDATA%\dartdl\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dartdl")
}

/// Get the default root for per-company output folders (`~/Documents/DART`).
pub(crate) fn default_output_root() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("DART")
}

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) output_root: PathBuf,
    pub(crate) cache_dir: PathBuf,
    pub(crate) refresh_registry: bool,
    pub(crate) summary_label: String,
}

impl Settings {
    /// Fill unset locations with platform defaults.
    pub(crate) fn new(
        output_root: Option<PathBuf>,
        cache_dir: Option<PathBuf>,
        refresh_registry: bool,
        summary_label: &str,
    ) -> Self {
        Self {
            output_root: output_root.unwrap_or_else(default_output_root),
            cache_dir: cache_dir.unwrap_or_else(default_cache_dir),
            refresh_registry,
            summary_label: sanitize_filename(summary_label),
        }
    }

    /// Output folder for `corp` and `year`.
    pub(crate) fn output_dir(&self, corp: &RegistryEntry, year: i32) -> PathBuf {
        output_dir(&self.output_root, corp, year)
    }
}

/// `<root>/DART_<year>_<sanitized name>_<corp_code>_ZIP`
pub(crate) fn output_dir(root: &Path, corp: &RegistryEntry, year: i32) -> PathBuf {
    root.join(format!(
        "DART_{year}_{}_{}_ZIP",
        sanitize_filename(&corp.corp_name),
        corp.corp_code
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_name() {
        let corp = RegistryEntry::new("00126380", "삼성 전자/우", "005930");
        assert_eq!(
            output_dir(Path::new("/data"), &corp, 2024),
            Path::new("/data/DART_2024_삼성_전자_우_00126380_ZIP")
        );
    }

    #[test]
    fn test_explicit_locations_win() {
        let settings = Settings::new(
            Some(PathBuf::from("/out")),
            Some(PathBuf::from("/cache")),
            true,
            "my summary",
        );
        assert_eq!(settings.output_root, Path::new("/out"));
        assert_eq!(settings.cache_dir, Path::new("/cache"));
        assert!(settings.refresh_registry);
        assert_eq!(settings.summary_label, "my_summary");
    }

    #[test]
    fn test_defaults_end_in_app_folders() {
        let settings = Settings::new(None, None, false, "disclosure_summary");
        assert!(settings.cache_dir.ends_with("dartdl"));
        assert!(settings.output_root.ends_with("DART"));
    }
}
