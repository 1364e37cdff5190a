//! On-disk cache of the registry snapshot with a time-to-live.

use super::{RegistryEntry, parse_api_status, parse_registry};
use crate::client::DartClient;
use crate::documents::ZIP_SIGNATURE;
use crate::error::{DataError, Result};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use zip::ZipArchive;

/// File name of the raw snapshot archive inside the cache directory
pub const CORP_CODE_ZIP: &str = "corpCode.zip";

/// File name of the extracted snapshot markup (also its name inside the archive)
pub const CORP_CODE_XML: &str = "CORPCODE.xml";

/// Snapshots younger than this are reused without a request (30 days)
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const SNAPSHOT_ENDPOINT: &str = "/api/corpCode.xml";

/// Registry snapshot cache rooted at a directory.
///
/// # Example
/// ```no_run
/// use dartdl_data::{DartClient, RegistryCache};
///
/// # async fn example() -> dartdl_data::Result<()> {
/// let client = DartClient::new("my-api-key")?;
/// let registry = RegistryCache::new("_dart_cache").load(&client).await?;
/// println!("{} registered corporations", registry.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RegistryCache {
    dir: PathBuf,
    max_age: Duration,
    force_refresh: bool,
}

impl RegistryCache {
    /// Create a cache in `dir` with the default 30 day lifetime.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_age: DEFAULT_MAX_AGE,
            force_refresh: false,
        }
    }

    /// Override the snapshot lifetime.
    pub const fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Always download a new snapshot on [`load`](Self::load).
    pub const fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the raw snapshot archive.
    pub fn zip_path(&self) -> PathBuf {
        self.dir.join(CORP_CODE_ZIP)
    }

    /// Path of the extracted snapshot markup.
    pub fn xml_path(&self) -> PathBuf {
        self.dir.join(CORP_CODE_XML)
    }

    /// Age of the extracted snapshot, if one exists.
    pub fn age(&self) -> Option<Duration> {
        fs::metadata(self.xml_path())
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
    }

    /// Returns true if the extracted snapshot exists and is younger than the lifetime.
    pub fn is_fresh(&self) -> bool {
        self.age().is_some_and(|age| age < self.max_age)
    }

    /// Load the registry, downloading a new snapshot when the cached one is stale.
    ///
    /// # Errors
    /// - [`DataError::Http`] / [`DataError::Network`] if the snapshot request fails
    /// - [`DataError::Api`] if OpenDART refuses the request (e.g. bad key)
    /// - [`DataError::Parse`] / [`DataError::XmlParse`] if the snapshot is corrupt
    pub async fn load(&self, client: &DartClient) -> Result<Vec<RegistryEntry>> {
        if !self.force_refresh && self.is_fresh() {
            tracing::info!(path = %self.xml_path().display(), "using cached registry snapshot");
        } else {
            self.refresh(client).await?;
        }
        self.load_cached()
    }

    /// Parse the extracted snapshot without touching the network.
    pub fn load_cached(&self) -> Result<Vec<RegistryEntry>> {
        let path = self.xml_path();
        let xml = fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                DataError::Parse(format!("registry snapshot missing at {}", path.display()))
            }
            _ => DataError::Io(e),
        })?;
        let entries = parse_registry(&xml)?;
        tracing::debug!(count = entries.len(), "parsed registry snapshot");
        Ok(entries)
    }

    /// Download a new snapshot, store the raw archive and extract its markup.
    pub async fn refresh(&self, client: &DartClient) -> Result<()> {
        tracing::info!("downloading registry snapshot");
        let response = client.get(SNAPSHOT_ENDPOINT, &[]).await?;
        if !response.status().is_success() {
            return Err(DataError::http(SNAPSHOT_ENDPOINT, response.status()));
        }
        let bytes = response.bytes().await?;

        if !bytes.starts_with(ZIP_SIGNATURE) {
            return Err(
                match parse_api_status(&String::from_utf8_lossy(&bytes)) {
                    Some((status, message)) => DataError::Api { status, message },
                    None => DataError::Parse("registry snapshot is not a zip archive".to_string()),
                },
            );
        }

        fs::create_dir_all(&self.dir)?;
        fs::write(self.zip_path(), &bytes)?;

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_ref()))?;
        let mut entry = archive.by_name(CORP_CODE_XML).map_err(|_| {
            DataError::Parse(format!("{CORP_CODE_XML} not found in registry snapshot"))
        })?;
        let mut xml = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
        entry.read_to_end(&mut xml)?;
        fs::write(self.xml_path(), xml)?;

        tracing::info!(dir = %self.dir.display(), "registry snapshot refreshed");
        Ok(())
    }
}
