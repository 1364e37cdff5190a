#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dartdl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod client;
pub mod disclosures;
pub mod documents;
pub mod error;
pub mod registry;
pub mod search;

pub use client::{DartClient, Pacing, viewer_url};
pub use disclosures::{Disclosure, fetch_disclosures};
pub use documents::{DocumentError, download_document, find_existing_archive, sanitize_filename};
pub use error::{DataError, Result};
pub use registry::{RegistryCache, RegistryEntry};
pub use search::{MatchRank, SearchHit, search};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
