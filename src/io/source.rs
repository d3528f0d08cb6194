use std::{path::PathBuf, sync::Arc};

use ahash::AHashMap;
use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Read-only access to input files by reference, e.g. "zips_near_illinois.geojson",
/// "Help_Desk_Tickets.csv" or "https://example.org/data.csv".
pub trait DataSource: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<Arc<[u8]>>;

    /// Fetch `reference` and decode it as UTF-8 text.
    fn fetch_text(&self, reference: &str) -> Result<String> {
        let bytes = self.fetch(reference)?;
        String::from_utf8(bytes.to_vec())
            .with_context(|| format!("[io::source] {reference} is not valid UTF-8"))
    }
}

/// Local files, resolved relative to `root` unless absolute.
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    fn full(&self, reference: &str) -> PathBuf { self.root.join(reference) }
}

impl DataSource for DiskSource {
    fn fetch(&self, reference: &str) -> Result<Arc<[u8]>> {
        let path = self.full(reference);
        debug!("[io::source] reading {}", path.display());
        let bytes = std::fs::read(&path)
            .with_context(|| format!("[io::source] Failed to read {}", path.display()))?;
        Ok(Arc::from(bytes))
    }
}

/// In-memory files, keyed by reference.
#[derive(Default, Clone)]
pub struct MemSource {
    files: AHashMap<String, Arc<[u8]>>,
}

impl MemSource {
    pub fn new() -> Self { Self::default() }

    pub fn with_file(mut self, reference: impl Into<String>, bytes: impl AsRef<[u8]>) -> Self {
        self.insert(reference, bytes);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, bytes: impl AsRef<[u8]>) {
        self.files.insert(reference.into(), Arc::from(bytes.as_ref()));
    }
}

impl DataSource for MemSource {
    fn fetch(&self, reference: &str) -> Result<Arc<[u8]>> {
        self.files.get(reference).cloned()
            .ok_or_else(|| anyhow!("[io::source] missing file: {reference}"))
    }
}

/// Blocking HTTP(S) downloads.
#[cfg(feature = "download")]
#[derive(Default)]
pub struct HttpSource;

#[cfg(feature = "download")]
impl DataSource for HttpSource {
    fn fetch(&self, reference: &str) -> Result<Arc<[u8]>> {
        debug!("[io::source] GET {reference}");
        let bytes = reqwest::blocking::get(reference)
            .with_context(|| format!("GET {reference}"))?
            .error_for_status()
            .with_context(|| format!("GET {reference} returned error status"))?
            .bytes()
            .with_context(|| format!("GET {reference} body"))?;
        Ok(Arc::from(bytes.as_ref()))
    }
}

/// Routes `http://` and `https://` references to HTTP and everything else to disk.
pub struct DefaultSource {
    disk: DiskSource,
}

impl DefaultSource {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { disk: DiskSource::new(root) } }
}

pub(crate) fn is_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

impl DataSource for DefaultSource {
    fn fetch(&self, reference: &str) -> Result<Arc<[u8]>> {
        if !is_url(reference) {
            return self.disk.fetch(reference);
        }
        #[cfg(feature = "download")]
        { HttpSource.fetch(reference) }
        #[cfg(not(feature = "download"))]
        { Err(anyhow!("[io::source] {reference}: URL sources require the `download` feature")) }
    }
}
