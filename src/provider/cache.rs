//! On-disk storage of downloaded dataset files, one verbatim `<dataset>.dat` per dataset.
use std::{fs, io};

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use log::{debug, info};

use crate::adas_errors::AdasError;

use super::ContentProvider;

/// Cache directory of downloaded datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCache {
    dir: Utf8PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        LocalCache { dir: dir.into() }
    }

    /// `~/.adas_data/openadas`
    pub fn default_dir() -> Result<Utf8PathBuf, AdasError> {
        let base_dirs = BaseDirs::new().ok_or(AdasError::CacheDirUnavailable)?;
        let home = Utf8Path::from_path(base_dirs.home_dir()).ok_or_else(|| {
            AdasError::Utf8PathError(base_dirs.home_dir().display().to_string())
        })?;
        Ok(home.join(".adas_data").join("openadas"))
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Path of the cached file of `dataset`, whether it exists or not.
    pub fn path_of(&self, dataset: &str) -> Utf8PathBuf {
        self.dir.join(format!("{dataset}.dat"))
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.path_of(dataset).is_file()
    }

    /// Cached content of `dataset`, `None` if it was never stored.
    pub fn read(&self, dataset: &str) -> Result<Option<String>, AdasError> {
        match fs::read_to_string(self.path_of(dataset)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Store `content` verbatim, creating the cache directory if needed.
    pub fn store(&self, dataset: &str, content: &str) -> Result<Utf8PathBuf, AdasError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_of(dataset);
        fs::write(&path, content)?;
        info!("cached {dataset} in {path}");
        Ok(path)
    }

    /// Remove the cached file of `dataset`; `false` if there was none.
    pub fn remove(&self, dataset: &str) -> Result<bool, AdasError> {
        match fs::remove_file(self.path_of(dataset)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Read-only provider over a directory of `<dataset>.dat` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDirectory {
    files: LocalCache,
}

impl LocalDirectory {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        LocalDirectory {
            files: LocalCache::new(dir),
        }
    }

    pub fn dir(&self) -> &Utf8Path {
        self.files.dir()
    }
}

impl ContentProvider for LocalDirectory {
    fn fetch_or_cache(&self, dataset: &str) -> Result<String, AdasError> {
        debug!("looking up {dataset} in {}", self.files.dir());
        self.files
            .read(dataset)?
            .ok_or_else(|| AdasError::DatasetNotFound(dataset.to_string()))
    }
}
