// Data source loading.
//
// Three documents feed the analyzer: the roster export (JSON array in the
// DraftKings lineup format), the ADP table (CSV with an
// `ID,Name,Position,ADP,Team` header) and the draftables list (JSON object
// with a `draftables` array). Each has a private reader-based parser shared by
// the file and HTTP sources.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{AdpEntry, DraftablePlayer, Roster};
use crate::NO_ADP_SENTINEL;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {location}: {source}")]
    Csv { location: String, source: csv::Error },

    #[error("JSON error in {location}: {source}")]
    Json {
        location: String,
        source: serde_json::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid data in {location}: {message}")]
    Validation { location: String, message: String },
}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Where rosters and side tables come from. Each call performs a fresh
/// fetch; caching is the repository's job.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_rosters(&self) -> Result<Vec<Roster>, SourceError>;

    async fn fetch_adp(&self) -> Result<Vec<AdpEntry>, SourceError>;

    async fn fetch_draftables(&self) -> Result<Vec<DraftablePlayer>, SourceError>;
}

/// Locations of the three input documents, relative to a base directory
/// unless absolute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub rosters: String,
    pub adp: String,
    pub draftables: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            rosters: "data/rosters.json".into(),
            adp: "data/adp.csv".into(),
            draftables: "data/draftables.json".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// File source
// ---------------------------------------------------------------------------

/// Reads the three documents from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    base_dir: PathBuf,
    paths: DataPaths,
    contest: Option<i64>,
}

impl FileSource {
    /// `contest` restricts rosters to one contest draft group.
    pub fn new(base_dir: impl Into<PathBuf>, paths: DataPaths, contest: Option<i64>) -> Self {
        FileSource {
            base_dir: base_dir.into(),
            paths,
            contest,
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    async fn read(&self, path: &str) -> Result<(String, Vec<u8>), SourceError> {
        let path = self.resolve(path);
        let location = path.display().to_string();
        let bytes = tokio::fs::read(&path).await.map_err(|source| SourceError::Io {
            path: location.clone(),
            source,
        })?;
        debug!(path = %location, bytes = bytes.len(), "read data file");
        Ok((location, bytes))
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch_rosters(&self) -> Result<Vec<Roster>, SourceError> {
        let (location, bytes) = self.read(&self.paths.rosters).await?;
        let rosters = rosters_from_reader(bytes.as_slice(), &location)?;
        Ok(filter_contest(rosters, self.contest))
    }

    async fn fetch_adp(&self) -> Result<Vec<AdpEntry>, SourceError> {
        let (location, bytes) = self.read(&self.paths.adp).await?;
        adp_from_reader(bytes.as_slice(), &location)
    }

    async fn fetch_draftables(&self) -> Result<Vec<DraftablePlayer>, SourceError> {
        let (location, bytes) = self.read(&self.paths.draftables).await?;
        draftables_from_reader(bytes.as_slice(), &location)
    }
}

// ---------------------------------------------------------------------------
// HTTP source
// ---------------------------------------------------------------------------

/// Fetches `rosters.json`, `adp.csv` and `draftables.json` from a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    contest: Option<i64>,
}

impl HttpSource {
    pub fn new(base_url: &str, contest: Option<i64>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, contest)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, contest: Option<i64>) -> Self {
        HttpSource {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            contest,
        }
    }

    async fn get(&self, document: &str) -> Result<(String, Vec<u8>), SourceError> {
        let url = format!("{}/{document}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| SourceError::Http {
            url: url.clone(),
            source,
        })?;
        debug!(url = %url, bytes = body.len(), "fetched data document");
        Ok((url, body.to_vec()))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_rosters(&self) -> Result<Vec<Roster>, SourceError> {
        let (url, body) = self.get("rosters.json").await?;
        let rosters = rosters_from_reader(body.as_slice(), &url)?;
        Ok(filter_contest(rosters, self.contest))
    }

    async fn fetch_adp(&self) -> Result<Vec<AdpEntry>, SourceError> {
        let (url, body) = self.get("adp.csv").await?;
        adp_from_reader(body.as_slice(), &url)
    }

    async fn fetch_draftables(&self) -> Result<Vec<DraftablePlayer>, SourceError> {
        let (url, body) = self.get("draftables.json").await?;
        draftables_from_reader(body.as_slice(), &url)
    }
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Keep only rosters from `contest`, or every roster when `None`.
pub fn filter_contest(rosters: Vec<Roster>, contest: Option<i64>) -> Vec<Roster> {
    match contest {
        Some(group) => rosters
            .into_iter()
            .filter(|r| r.contest_draft_group_id == group)
            .collect(),
        None => rosters,
    }
}

fn rosters_from_reader<R: Read>(reader: R, location: &str) -> Result<Vec<Roster>, SourceError> {
    serde_json::from_reader(reader).map_err(|source| SourceError::Json {
        location: location.to_string(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct DraftablesDocument {
    #[serde(default)]
    draftables: Vec<DraftablePlayer>,
}

fn draftables_from_reader<R: Read>(reader: R, location: &str) -> Result<Vec<DraftablePlayer>, SourceError> {
    let document: DraftablesDocument = serde_json::from_reader(reader).map_err(|source| SourceError::Json {
        location: location.to_string(),
        source,
    })?;
    Ok(document.draftables)
}

/// ADP CSV row. The ADP cell is read as text so an empty cell can fall back
/// to the sentinel instead of failing the row.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawAdpRow {
    #[serde(default)]
    ID: String,
    Name: String,
    #[serde(default)]
    Position: String,
    #[serde(default)]
    ADP: String,
    #[serde(default)]
    Team: String,
}

fn adp_from_reader<R: Read>(reader: R, location: &str) -> Result<Vec<AdpEntry>, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|source| SourceError::Csv {
        location: location.to_string(),
        source,
    })?;
    for required in ["Name", "ADP"] {
        if !headers.iter().any(|h| h == required) {
            return Err(SourceError::Validation {
                location: location.to_string(),
                message: format!("missing `{required}` column"),
            });
        }
    }

    let mut entries = Vec::new();
    for (line, result) in rdr.deserialize::<RawAdpRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("skipping malformed ADP row {} in {location}: {e}", line + 2);
                continue;
            }
        };
        let adp = if row.ADP.is_empty() {
            NO_ADP_SENTINEL
        } else {
            match row.ADP.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!("skipping ADP row for {}: bad ADP value {:?}", row.Name, row.ADP);
                    continue;
                }
            }
        };
        entries.push(AdpEntry {
            id: row.ID,
            name: row.Name,
            position: row.Position,
            adp,
            team: row.Team,
        });
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
