//! Download of datasets from OpenADAS, with a local cache in front.
use std::time::Duration;

use log::{debug, info};
use ureq::Agent;

use crate::adas_errors::AdasError;

use super::{dataset_url, is_error_page, ContentProvider, LocalCache, ProviderSettings};

/// OpenADAS provider.
///
/// Cached datasets are served without network access unless
/// [`ProviderSettings::force_download`] is set; downloaded datasets are written to the cache
/// verbatim.
#[derive(Debug, Clone)]
pub struct OpenAdas {
    agent: Agent,
    cache: LocalCache,
    settings: ProviderSettings,
}

impl OpenAdas {
    pub fn new(settings: ProviderSettings) -> Result<Self, AdasError> {
        let cache = LocalCache::new(settings.resolve_cache_dir()?);
        // OpenADAS answers a missing file with an error page, which is recognised by
        // content, so HTTP status codes are not turned into errors here
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();
        Ok(OpenAdas {
            agent,
            cache,
            settings,
        })
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn get_from_url(&self, url: &str) -> Result<String, AdasError> {
        let mut response = self.agent.get(url).call()?;
        Ok(response.body_mut().read_to_string()?)
    }

    /// Search the ADF directories for `dataset`.
    ///
    /// Return
    /// ----------
    /// * The URL the dataset was found at and its content
    /// * [`AdasError::DatasetNotFound`] once every directory answered with the error page
    pub fn search_download(&self, dataset: &str) -> Result<(String, String), AdasError> {
        for version in self.settings.adf_versions() {
            let url = dataset_url(&self.settings.base_url, version, dataset);
            debug!("trying {url}");
            let body = self.get_from_url(&url)?;
            if !is_error_page(&body) {
                info!("downloaded {dataset} from {url}");
                return Ok((url, body));
            }
        }
        Err(AdasError::DatasetNotFound(dataset.to_string()))
    }
}

impl ContentProvider for OpenAdas {
    fn fetch_or_cache(&self, dataset: &str) -> Result<String, AdasError> {
        if !self.settings.force_download {
            if let Some(content) = self.cache.read(dataset)? {
                debug!("{dataset} served from {}", self.cache.dir());
                return Ok(content);
            }
        }
        let (_, content) = self.search_download(dataset)?;
        self.cache.store(dataset, &content)?;
        Ok(content)
    }
}

#[cfg(test)]
mod open_adas_test {
    use camino::Utf8PathBuf;

    use super::*;

    fn offline_settings(tmp: &tempfile::TempDir) -> ProviderSettings {
        ProviderSettings {
            cache_dir: Some(Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap()),
            // nothing listens there: any request fails fast
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_cached_dataset_is_served_offline() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = OpenAdas::new(offline_settings(&tmp)).unwrap();
        provider.cache().store("szd93#ne", "cached content").unwrap();
        assert_eq!(provider.fetch_or_cache("szd93#ne").unwrap(), "cached content");
    }

    #[test]
    fn test_force_download_bypasses_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = ProviderSettings {
            force_download: true,
            adf_version: Some(7),
            ..offline_settings(&tmp)
        };
        let provider = OpenAdas::new(settings).unwrap();
        provider.cache().store("szd93#ne", "cached content").unwrap();
        assert!(matches!(
            provider.fetch_or_cache("szd93#ne"),
            Err(AdasError::HttpError(_))
        ));
    }

    #[test]
    #[ignore = "requires network access to open.adas.ac.uk"]
    fn test_download_pec() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = ProviderSettings {
            cache_dir: Some(Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap()),
            ..Default::default()
        };
        let provider = OpenAdas::new(settings).unwrap();
        let (url, content) = provider.search_download("pec93#c_pju#c0").unwrap();
        assert!(url.ends_with("adf15/pec93][c/pec93][c_pju][c0.dat"));
        assert!(!is_error_page(&content));

        provider.fetch_or_cache("pec93#c_pju#c0").unwrap();
        assert!(provider.cache().contains("pec93#c_pju#c0"));
    }

    #[test]
    #[ignore = "requires network access to open.adas.ac.uk"]
    fn test_missing_dataset() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = ProviderSettings {
            cache_dir: Some(Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap()),
            adf_version: Some(15),
            ..Default::default()
        };
        let provider = OpenAdas::new(settings).unwrap();
        assert_eq!(
            provider.fetch_or_cache("pec00#zz_nothing"),
            Err(AdasError::DatasetNotFound("pec00#zz_nothing".into()))
        );
    }
}
