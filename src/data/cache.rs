use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Context;

use super::error::DataError;
use super::loader::load_file;
use super::model::FundDataset;

/// Identity of the file contents a dataset was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl SourceStamp {
    fn read(path: &Path) -> Result<Self, DataError> {
        let meta = std::fs::metadata(path)
            .context("reading file metadata")
            .map_err(|e| DataError::unavailable(path, e))?;
        Ok(SourceStamp {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug)]
struct CachedDataset {
    stamp: SourceStamp,
    generation: u64,
    dataset: Arc<FundDataset>,
}

/// Lazily loaded dataset for one source file.
///
/// The file is read on the first [`DatasetCache::get`] and re-read only when
/// its modification time or size changes. Every successful load bumps the
/// generation, which downstream caches use as part of their key.
#[derive(Debug)]
pub struct DatasetCache {
    source: PathBuf,
    entry: Option<CachedDataset>,
    loads: u64,
}

impl DatasetCache {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            entry: None,
            loads: 0,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Point the cache at another file. The next `get` loads it.
    pub fn set_source(&mut self, source: impl Into<PathBuf>) {
        let source = source.into();
        if source != self.source {
            self.source = source;
            self.entry = None;
        }
    }

    /// Generation of the currently held dataset, if any.
    pub fn generation(&self) -> Option<u64> {
        self.entry.as_ref().map(|e| e.generation)
    }

    /// Return the dataset, loading it if absent or if the file changed.
    pub fn get(&mut self) -> Result<Arc<FundDataset>, DataError> {
        let stamp = SourceStamp::read(&self.source)?;

        if let Some(entry) = &self.entry {
            if entry.stamp == stamp {
                log::debug!("dataset cache hit for {}", self.source.display());
                return Ok(Arc::clone(&entry.dataset));
            }
            log::info!("{} changed on disk, reloading", self.source.display());
        }

        let dataset = Arc::new(load_file(&self.source)?);
        self.loads += 1;
        log::info!(
            "Loaded {} funds from {}",
            dataset.len(),
            self.source.display()
        );
        self.entry = Some(CachedDataset {
            stamp,
            generation: self.loads,
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    /// Drop the held dataset so the next `get` reads the file again.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
