use csv::{ReaderBuilder, StringRecord, Trim};
use reqwest::Client;

use crate::{
    Error, ProviderError, Res,
    config::CatalogEntry,
    recommend::features::{FeatureParam, FeatureVector},
    spotify, utils,
};

const ID_COLUMNS: &[&str] = &["track id", "id"];
const NAME_COLUMNS: &[&str] = &["track name", "name"];
const ARTIST_COLUMNS: &[&str] = &["artist(s)", "artists", "artist"];
const URI_COLUMNS: &[&str] = &["uri", "track uri"];

/// One song of a catalog, typed at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub uri: Option<String>,
    features: [Option<f64>; FeatureParam::COUNT],
}

impl CatalogRow {
    pub fn new(id: impl Into<String>, name: impl Into<String>, artists: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            uri: None,
            features: [None; FeatureParam::COUNT],
        }
    }

    pub fn with_feature(mut self, param: FeatureParam, value: f64) -> Self {
        self.features[param.index()] = Some(value);
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn feature(&self, param: FeatureParam) -> Option<f64> {
        self.features[param.index()]
    }

    pub fn vector(&self) -> FeatureVector {
        FeatureVector::extract(&FeatureParam::ALL, |p| self.feature(p))
    }

    /// Track id without a `spotify:track:` prefix.
    pub fn bare_id(&self) -> &str {
        bare_track_id(&self.id)
    }

    /// The `uri` column, or a URI derived from the track id.
    pub fn playable_uri(&self) -> String {
        self.uri
            .clone()
            .unwrap_or_else(|| utils::track_uri_from_id(&self.id))
    }
}

pub fn bare_track_id(id: &str) -> &str {
    id.strip_prefix("spotify:track:").unwrap_or(id)
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self { rows }
    }

    /// Parses a comma separated catalog.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    /// Headers are trimmed and matched case-insensitively. The id, name and
    /// artist columns are required, as is at least one feature column; a
    /// feature cell that is neither empty/`nan` nor a number fails the whole
    /// catalog.
    pub fn parse(bytes: &[u8]) -> Res<Self> {
        let text = String::from_utf8_lossy(bytes);
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| Error::InvalidCatalog(e.to_string()))?
            .clone();
        let columns = Columns::resolve(&headers)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::InvalidCatalog(e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            rows.push(columns.row(&record, line)?);
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, track_id: &str) -> Option<&CatalogRow> {
        let wanted = bare_track_id(track_id);
        self.rows.iter().find(|r| r.bare_id() == wanted)
    }
}

struct Columns {
    id: usize,
    name: usize,
    artists: usize,
    uri: Option<usize>,
    features: Vec<(FeatureParam, usize)>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Res<Self> {
        let normalized: Vec<String> = headers.iter().map(utils::normalize_header).collect();
        let position = |aliases: &[&str]| {
            normalized
                .iter()
                .position(|h| aliases.contains(&h.as_str()))
        };
        let require = |aliases: &[&str]| {
            position(aliases).ok_or_else(|| {
                Error::InvalidCatalog(format!("missing required column '{}'", aliases[0]))
            })
        };

        let features: Vec<(FeatureParam, usize)> = normalized
            .iter()
            .enumerate()
            .filter_map(|(i, h)| FeatureParam::from_catalog_column(h).map(|p| (p, i)))
            .collect();
        if features.is_empty() {
            return Err(Error::InvalidCatalog("no feature columns".into()));
        }

        Ok(Self {
            id: require(ID_COLUMNS)?,
            name: require(NAME_COLUMNS)?,
            artists: require(ARTIST_COLUMNS)?,
            uri: position(URI_COLUMNS),
            features,
        })
    }

    fn row(&self, record: &StringRecord, line: u64) -> Res<CatalogRow> {
        let cell = |i: usize| record.get(i).unwrap_or("").trim();

        let id = cell(self.id);
        if id.is_empty() {
            return Err(Error::InvalidCatalog(format!("line {}: empty track id", line)));
        }

        let mut row = CatalogRow {
            id: id.to_string(),
            name: cell(self.name).to_string(),
            artists: utils::split_artists(cell(self.artists)),
            uri: self
                .uri
                .map(cell)
                .filter(|u| !utils::is_missing_cell(u))
                .map(str::to_string),
            features: [None; FeatureParam::COUNT],
        };

        for &(param, index) in &self.features {
            let raw = cell(index);
            if utils::is_missing_cell(raw) {
                continue;
            }
            let value: f64 = raw.parse().map_err(|_| {
                Error::InvalidCatalog(format!(
                    "line {}: column '{}' is not a number: '{}'",
                    line, param, raw
                ))
            })?;
            row.features[param.index()] = Some(value);
        }

        Ok(row)
    }
}

/// Downloads and parses a catalog over HTTP.
pub async fn fetch(http: &Client, url: &str) -> Res<Catalog> {
    let fetch_failed = |e: ProviderError| Error::classify(e, Error::CatalogFetchFailed);

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_failed(e.into()))?;
    let response = spotify::check(response).await.map_err(fetch_failed)?;
    let bytes = response.bytes().await.map_err(|e| fetch_failed(e.into()))?;

    Catalog::parse(&bytes)
}

/// Loads a catalog from an `http(s)://` URL or a local file path.
pub async fn load(http: &Client, location: &str) -> Res<Catalog> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return fetch(http, location).await;
    }

    let bytes = async_fs::read(location)
        .await
        .map_err(|e| Error::CatalogFetchFailed(format!("{}: {}", location, e)))?;
    Catalog::parse(&bytes)
}

/// The catalog choices clients may ask for.
#[derive(Debug, Clone)]
pub struct CatalogSources {
    entries: Vec<CatalogEntry>,
}

impl CatalogSources {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// URL of the named catalog; the first configured one when no name is given.
    pub fn resolve(&self, choice: Option<&str>) -> Res<&str> {
        let Some(choice) = choice.map(str::trim).filter(|c| !c.is_empty()) else {
            return self
                .entries
                .first()
                .map(|e| e.url.as_str())
                .ok_or_else(|| Error::UnknownCatalog(String::new()));
        };

        let choice = choice.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name == choice)
            .map(|e| e.url.as_str())
            .ok_or(Error::UnknownCatalog(choice))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}
