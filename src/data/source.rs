use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Where snapshot text comes from. Implementations are shared across the
/// load threads, hence `Send + Sync`.
pub trait DataSource: Send + Sync {
    /// Retrieve the raw text stored at `path` (relative to the source).
    fn fetch(&self, path: &str) -> Result<String, FetchError>;

    /// Human-readable location for logs and the status bar.
    fn describe(&self) -> String;
}

/// Snapshot files in a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataSource for DirSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path.trim_start_matches('/'));
        // Snapshots are produced by scrapers that do not always write UTF-8.
        let bytes = std::fs::read(&full).map_err(|source| FetchError::Io { path: full, source })?;
        Ok(String::from_utf8(bytes.clone())
            .unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect()))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Snapshot files served below an HTTP base URL.
pub struct HttpSource {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl DataSource for HttpSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|source| FetchError::Http { url: url.clone(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status: status.as_u16() });
        }

        resp.text().map_err(|source| FetchError::Http { url, source })
    }

    fn describe(&self) -> String {
        self.base.clone()
    }
}

/// Pick a source for a configured location: HTTP(S) URLs are fetched over the
/// network, anything else is treated as a snapshot directory.
pub fn source_for(location: &str) -> Box<dyn DataSource> {
    let lower = location.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(DirSource::new(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_reads_relative_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("daily"), "2024-01-01 10\n").unwrap();

        let source = DirSource::new(dir.path());
        assert_eq!(source.fetch("daily").unwrap(), "2024-01-01 10\n");
        assert_eq!(source.fetch("/daily").unwrap(), "2024-01-01 10\n");
    }

    #[test]
    fn dir_source_reports_missing_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = DirSource::new(dir.path());
        assert!(matches!(source.fetch("hosts"), Err(FetchError::Io { .. })));
    }

    #[test]
    fn dir_source_falls_back_to_latin1() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("hosts"), [b'C', 0xE9, b'\n']).unwrap();
        let source = DirSource::new(dir.path());
        assert_eq!(source.fetch("hosts").unwrap(), "C\u{e9}\n");
    }

    #[test]
    fn http_urls_are_joined_with_one_slash() {
        let source = HttpSource::new("https://stats.example.org/db/");
        assert_eq!(source.url_for("/daily"), "https://stats.example.org/db/daily");
        assert_eq!(source.url_for("hosts"), "https://stats.example.org/db/hosts");
    }

    #[test]
    fn location_picks_source_kind() {
        assert_eq!(source_for("HTTPS://x.org/db").describe(), "HTTPS://x.org/db");
        assert_eq!(source_for("db").describe(), "db");
    }
}
