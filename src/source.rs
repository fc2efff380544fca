//! Dataset loading from a local file with a remote fallback.

use std::{fmt, path::PathBuf};

use tracing::{info, warn};

use crate::{
    config::SourceConfig,
    dataset::{ArrowDataset, CsvOptions},
    error::{Error, Result},
};

/// Where a loaded dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Read from a local file.
    Local(PathBuf),
    /// Fetched over HTTP.
    Remote(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// A CSV dataset available locally, remotely, or both.
///
/// [`load`](Self::load) reads the local file when it exists and otherwise
/// fetches the URL.
///
/// # Example
///
/// ```no_run
/// use bonifica::DataSource;
///
/// let source = DataSource::new()
///     .with_path("data/data_titanic.csv")
///     .with_url("https://example.com/titanic.csv");
/// let (dataset, origin) = source.load()?;
/// println!("{} rows from {origin}", dataset.shape().0);
/// # Ok::<(), bonifica::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    path: Option<PathBuf>,
    url: Option<String>,
    timeout_secs: Option<u64>,
    options: CsvOptions,
}

impl DataSource {
    /// Creates a source with neither a path nor a URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the fallback URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the CSV parsing options.
    #[must_use]
    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    /// Loads the dataset and reports which origin served it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when neither a path nor a URL is set, `Io`
    /// when the local file is absent and there is no URL, and `Storage`
    /// when the fetch fails.
    pub fn load(&self) -> Result<(ArrowDataset, Origin)> {
        if let Some(path) = &self.path {
            if path.exists() {
                let dataset = ArrowDataset::from_csv_with_options(path, self.options.clone())?;
                info!(path = %path.display(), rows = dataset.shape().0, "loaded local dataset");
                return Ok((dataset, Origin::Local(path.clone())));
            }
            if self.url.is_none() {
                return Err(Error::io(
                    std::io::Error::new(std::io::ErrorKind::NotFound, "dataset file not found"),
                    path,
                ));
            }
            warn!(path = %path.display(), "local dataset not found, falling back to URL");
        }

        match &self.url {
            Some(url) => {
                let bytes = self.fetch(url)?;
                let dataset = ArrowDataset::from_csv_bytes(&bytes, self.options.clone())?;
                info!(%url, rows = dataset.shape().0, "loaded remote dataset");
                Ok((dataset, Origin::Remote(url.clone())))
            }
            None => Err(Error::invalid_config(
                "data source needs a path or a URL",
            )),
        }
    }

    #[cfg(feature = "http")]
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("bonifica/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::storage(format!("Failed to create HTTP client: {e}")))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| Error::storage(format!("HTTP GET error for '{url}': {e}")))?;

        if !response.status().is_success() {
            return Err(Error::storage(format!(
                "HTTP GET failed for '{url}': status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::storage(format!("Failed to read HTTP response body: {e}")))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http"))]
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(Error::storage(format!(
            "cannot fetch '{url}': built without the http feature"
        )))
    }
}

impl From<&SourceConfig> for DataSource {
    fn from(config: &SourceConfig) -> Self {
        Self {
            path: config.path.clone(),
            url: config.url.clone(),
            ..Self::default()
        }
    }
}
