//! # Dataset content providers
//!
//! The readers of [`crate::formats`] never perform I/O: they receive the lines of a dataset.
//! This module supplies those lines from a dataset identifier such as `pec93#c_pju#c0`.
//!
//! ## Providers
//!
//! - [`LocalDirectory`]: read-only lookup of `<dir>/<dataset>.dat`, for offline use and tests.
//! - [`open_adas::OpenAdas`] (feature `adas-download`): searches the OpenADAS download tree,
//!   keeps every downloaded file verbatim in a [`LocalCache`] and serves later calls from it.
//!
//! ## OpenADAS naming
//!
//! ```text
//! dataset   pec93#c_pju#c0
//! url       {base}/adf15/pec93][c/pec93][c_pju][c0.dat
//!                  │     │        └ dataset with '#' → ']['
//!                  │     └ dataset up to the first '_', same substitution
//!                  └ ADF directory, searched over adf00..adf19 unless pinned
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use adas_parser::{formats::OutputMode, provider::{load, open_adas::OpenAdas, ProviderSettings}};
//!
//! let provider = OpenAdas::new(ProviderSettings::default())?;
//! let pec = load(&provider, "pec93#c_pju#c0", OutputMode::Labeled)?.into_array()?;
//! ```
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::{
    adas_errors::AdasError,
    formats::{read_str, AdasData, AdasFormat, OutputMode},
};

pub mod cache;
#[cfg(feature = "adas-download")]
pub mod open_adas;

pub use cache::{LocalCache, LocalDirectory};

pub const DEFAULT_BASE_URL: &str = "https://open.adas.ac.uk/download";

/// Sentence of the page OpenADAS serves in place of a missing file.
pub const ERROR_PAGE_SENTENCE: &str =
    "An error has occured. Please try again or contact us if the problem";

/// ADF directories searched when no version is pinned.
pub const ADF_SEARCH_RANGE: std::ops::Range<u8> = 0..20;

/// Source of dataset text.
pub trait ContentProvider {
    /// The verbatim text of `dataset`.
    ///
    /// Return
    /// ----------
    /// * The file content, or [`AdasError::DatasetNotFound`] when the provider has no such
    ///   dataset, or the I/O or HTTP error met on the way.
    fn fetch_or_cache(&self, dataset: &str) -> Result<String, AdasError>;
}

/// Settings of the OpenADAS provider and of its cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Cache directory; `~/.adas_data/openadas` when unset
    pub cache_dir: Option<Utf8PathBuf>,
    /// Only search this ADF directory
    pub adf_version: Option<u8>,
    /// Download even when the dataset is cached
    pub force_download: bool,
    /// Global timeout of one HTTP request
    pub timeout_secs: u64,
    pub base_url: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        ProviderSettings {
            cache_dir: None,
            adf_version: None,
            force_download: false,
            timeout_secs: 10,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ProviderSettings {
    /// The configured cache directory, or the default one under the home directory.
    pub fn resolve_cache_dir(&self) -> Result<Utf8PathBuf, AdasError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => LocalCache::default_dir(),
        }
    }

    /// ADF directories to try, in order.
    pub fn adf_versions(&self) -> Vec<u8> {
        match self.adf_version {
            Some(version) => vec![version],
            None => ADF_SEARCH_RANGE.collect(),
        }
    }
}

/// The two path segments of a dataset on OpenADAS.
///
/// Return
/// ----------
/// * `(directory, file stem)`, e.g. `("pec93][c", "pec93][c_pju][c0")`; a name without `_` is
///   its own directory
pub fn dataset_path_segments(dataset: &str) -> (String, String) {
    let directory = dataset.split('_').next().unwrap_or(dataset);
    (directory.replace('#', "]["), dataset.replace('#', "]["))
}

/// Download URL of `dataset` in ADF directory `adf_version`.
pub fn dataset_url(base_url: &str, adf_version: u8, dataset: &str) -> String {
    let (directory, stem) = dataset_path_segments(dataset);
    format!(
        "{}/adf{adf_version:02}/{directory}/{stem}.dat",
        base_url.trim_end_matches('/')
    )
}

/// Whether a response body is the OpenADAS error page.
pub fn is_error_page(body: &str) -> bool {
    body.contains(ERROR_PAGE_SENTENCE)
}

/// Fetch a dataset through `provider` and parse it.
///
/// The format is resolved from the dataset name before any fetch, so an unsupported
/// dataset never reaches the provider.
///
/// Arguments
/// -----------------
/// * `provider`: where the text comes from
/// * `dataset`: the dataset identifier, e.g. `"qcx#h0_en2_kvi#c6"`
/// * `mode`: labeled or raw output
///
/// Return
/// ----------
/// * The parsed dataset, or the provider / reader error
pub fn load<P: ContentProvider + ?Sized>(
    provider: &P,
    dataset: &str,
    mode: OutputMode,
) -> Result<AdasData, AdasError> {
    let format = AdasFormat::from_dataset_name(dataset);
    if let AdasFormat::Unsupported(name) = &format {
        return Err(AdasError::UnsupportedFormat(name.clone()));
    }
    let content = provider.fetch_or_cache(dataset)?;
    read_str(&format, &content, mode)
}
