//! Source Resolution
//!
//! Turns a layer's source reference into encoded image bytes. Resolution is
//! the compositor's suspension point; decoding happens later on the blocking
//! pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use tracing::debug;

use crate::error::{Result, StudioError};

/// Fetches the raw bytes behind a source reference.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Whether this resolver handles `source`.
    fn accepts(&self, source: &str) -> bool;

    async fn resolve(&self, source: &str) -> Result<Vec<u8>>;
}

fn resolution_error(source: &str, reason: impl Into<String>) -> StudioError {
    StudioError::ResourceResolution {
        source_ref: abbreviate(source),
        reason: reason.into(),
    }
}

/// Data URIs can be megabytes long; keep error messages readable.
fn abbreviate(source: &str) -> String {
    const MAX: usize = 64;
    match source.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &source[..cut]),
        None => source.to_string(),
    }
}

/// Decode a base64 `data:` URI into its payload.
pub fn decode_data_uri(source: &str) -> Result<Vec<u8>> {
    let rest = source
        .strip_prefix("data:")
        .ok_or_else(|| resolution_error(source, "not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| resolution_error(source, "data URI has no payload"))?;
    if !meta.split(';').any(|part| part == "base64") {
        return Err(resolution_error(source, "only base64 data URIs are supported"));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| resolution_error(source, format!("invalid base64: {}", e)))
}

/// Build a `data:` URI for encoded bytes.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Embedded `data:` URIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataUriResolver;

#[async_trait]
impl SourceResolver for DataUriResolver {
    fn accepts(&self, source: &str) -> bool {
        source.starts_with("data:")
    }

    async fn resolve(&self, source: &str) -> Result<Vec<u8>> {
        decode_data_uri(source)
    }
}

/// Local files: `file://` URLs and scheme-less paths, relative ones joined
/// onto `root`.
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, source: &str) -> PathBuf {
        let raw = source.strip_prefix("file://").unwrap_or(source);
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl SourceResolver for FileResolver {
    fn accepts(&self, source: &str) -> bool {
        source.starts_with("file://") || !(source.contains("://") || source.starts_with("data:"))
    }

    async fn resolve(&self, source: &str) -> Result<Vec<u8>> {
        let path = self.path_for(source);
        debug!(path = %path.display(), "reading image source");
        tokio::fs::read(&path)
            .await
            .map_err(|e| resolution_error(source, e.to_string()))
    }
}

/// In-memory sources keyed by reference.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(source, bytes);
        self
    }

    pub fn insert(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(source.into(), Arc::new(bytes));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SourceResolver for StaticResolver {
    fn accepts(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    async fn resolve(&self, source: &str) -> Result<Vec<u8>> {
        self.entries
            .get(source)
            .map(|bytes| bytes.as_ref().clone())
            .ok_or_else(|| resolution_error(source, "not registered"))
    }
}

/// Tries resolvers in order; the first that accepts a source handles it.
#[derive(Default, Clone)]
pub struct ChainResolver {
    resolvers: Vec<Arc<dyn SourceResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: Arc<dyn SourceResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Data URIs, then files under `root`, then HTTP(S) when built with the
    /// `http` feature.
    pub fn standard(root: impl Into<PathBuf>) -> Self {
        let chain = Self::new()
            .with(Arc::new(DataUriResolver))
            .with(Arc::new(FileResolver::new(root)));
        #[cfg(feature = "http")]
        let chain = chain.with(Arc::new(HttpResolver::new()));
        chain
    }
}

#[async_trait]
impl SourceResolver for ChainResolver {
    fn accepts(&self, source: &str) -> bool {
        self.resolvers.iter().any(|r| r.accepts(source))
    }

    async fn resolve(&self, source: &str) -> Result<Vec<u8>> {
        match self.resolvers.iter().find(|r| r.accepts(source)) {
            Some(resolver) => resolver.resolve(source).await,
            None => Err(resolution_error(source, "no resolver accepts this source")),
        }
    }
}

impl std::fmt::Debug for ChainResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainResolver")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

/// Remote images over HTTP(S).
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpResolver {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl SourceResolver for HttpResolver {
    fn accepts(&self, source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    async fn resolve(&self, source: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|e| resolution_error(source, e.to_string()))?;

        if !response.status().is_success() {
            return Err(resolution_error(
                source,
                format!("server returned {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| resolution_error(source, e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
