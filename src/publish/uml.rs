use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};
use ureq::Agent;

/// Diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// The diagram service could not be reached or rejected the diagram.
    #[error("HTTP error: {0}")]
    Http(String),
    /// The response could not be read.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Turns UML source into inline SVG markup.
pub trait DiagramRenderer {
    /// Render a `PlantUML` diagram.
    ///
    /// # Errors
    ///
    /// Returns an error if the diagram cannot be rendered. Callers leave the
    /// source block in place when this happens.
    fn render_svg(&self, source: &str) -> Result<String, DiagramError>;
}

/// Renders diagrams through a Kroki server, caching results on disk.
#[derive(Debug)]
pub struct KrokiRenderer {
    agent: Agent,
    server: String,
    cache_dir: Option<PathBuf>,
}

impl KrokiRenderer {
    /// Create a renderer for the given server.
    #[must_use]
    pub fn new(server: impl Into<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            server: server.into().trim_end_matches('/').to_string(),
            cache_dir: None,
        }
    }

    /// Cache rendered diagrams under `cache_dir`, keyed by source hash.
    #[must_use]
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    fn cache_path(&self, source: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_deref()
            .map(|dir| dir.join(format!("{}.svg", cache_key(source))))
    }

    fn request(&self, source: &str) -> Result<String, DiagramError> {
        let url = format!("{}/plantuml/svg", self.server);
        debug!("rendering diagram with {url}");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())
            .map_err(|e| DiagramError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(DiagramError::Http(format!("HTTP {status}: {error_body}")));
        }

        body.read_to_string()
            .map_err(|e| DiagramError::Io(e.to_string()))
    }
}

impl DiagramRenderer for KrokiRenderer {
    fn render_svg(&self, source: &str) -> Result<String, DiagramError> {
        let cache_path = self.cache_path(source);
        if let Some(svg) = cache_path.as_deref().and_then(read_cached) {
            trace!("diagram cache hit");
            return Ok(svg);
        }

        let svg = self.request(source)?;

        if let Some(path) = cache_path {
            if let Err(e) = write_cached(&path, &svg) {
                warn!("failed to cache diagram at {}: {e}", path.display());
            }
        }
        Ok(svg)
    }
}

fn read_cached(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn write_cached(path: &Path, svg: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, svg)
}

/// SHA-256 of the diagram source, hex encoded.
fn cache_key(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}
