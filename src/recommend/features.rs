use std::fmt;

use crate::types::AudioFeatures;

/// The acoustic parameters a track is compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureParam {
    Danceability,
    Energy,
    Key,
    Loudness,
    Mode,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
}

impl FeatureParam {
    pub const COUNT: usize = 11;

    pub const ALL: [FeatureParam; Self::COUNT] = [
        FeatureParam::Danceability,
        FeatureParam::Energy,
        FeatureParam::Key,
        FeatureParam::Loudness,
        FeatureParam::Mode,
        FeatureParam::Speechiness,
        FeatureParam::Acousticness,
        FeatureParam::Instrumentalness,
        FeatureParam::Liveness,
        FeatureParam::Valence,
        FeatureParam::Tempo,
    ];

    /// Field name in Spotify's audio-features payload.
    pub fn provider_key(self) -> &'static str {
        match self {
            FeatureParam::Danceability => "danceability",
            FeatureParam::Energy => "energy",
            FeatureParam::Key => "key",
            FeatureParam::Loudness => "loudness",
            FeatureParam::Mode => "mode",
            FeatureParam::Speechiness => "speechiness",
            FeatureParam::Acousticness => "acousticness",
            FeatureParam::Instrumentalness => "instrumentalness",
            FeatureParam::Liveness => "liveness",
            FeatureParam::Valence => "valence",
            FeatureParam::Tempo => "tempo",
        }
    }

    /// Normalised column header in a catalog.
    pub fn catalog_column(self) -> &'static str {
        // catalogs are exported with Spotify's own field names
        self.provider_key()
    }

    pub fn from_catalog_column(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.catalog_column() == header)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FeatureParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.provider_key())
    }
}

/// Feature values keyed by parameter, in [`FeatureParam::ALL`] order.
///
/// Absent parameters are simply not present. Two vectors are only compared
/// when they hold exactly the same parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(FeatureParam, f64)>,
}

impl FeatureVector {
    /// Collects the value of each parameter in `params` that `lookup` yields,
    /// dropping missing and NaN values.
    pub fn extract<F>(params: &[FeatureParam], lookup: F) -> Self
    where
        F: Fn(FeatureParam) -> Option<f64>,
    {
        let mut entries: Vec<(FeatureParam, f64)> = params
            .iter()
            .filter_map(|&p| lookup(p).filter(|v| !v.is_nan()).map(|v| (p, v)))
            .collect();
        entries.sort_by_key(|(p, _)| *p);
        entries.dedup_by_key(|(p, _)| *p);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, param: FeatureParam) -> Option<f64> {
        self.entries
            .iter()
            .find(|(p, _)| *p == param)
            .map(|(_, v)| *v)
    }

    pub fn params(&self) -> impl Iterator<Item = FeatureParam> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn is_compatible(&self, other: &FeatureVector) -> bool {
        self.params().eq(other.params())
    }

    /// Euclidean distance, or `None` if the parameter sets differ.
    pub fn distance(&self, other: &FeatureVector) -> Option<f64> {
        if !self.is_compatible(other) {
            return None;
        }
        Some(euclidean(&self.values(), &other.values()))
    }
}

impl FromIterator<(FeatureParam, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (FeatureParam, f64)>>(iter: I) -> Self {
        let pairs: Vec<(FeatureParam, f64)> = iter.into_iter().collect();
        Self::extract(&FeatureParam::ALL, |p| {
            pairs.iter().find(|(q, _)| *q == p).map(|(_, v)| *v)
        })
    }
}

impl From<&AudioFeatures> for FeatureVector {
    fn from(features: &AudioFeatures) -> Self {
        Self::extract(&FeatureParam::ALL, |p| features.get(p))
    }
}

impl AudioFeatures {
    pub fn get(&self, param: FeatureParam) -> Option<f64> {
        match param {
            FeatureParam::Danceability => self.danceability,
            FeatureParam::Energy => self.energy,
            FeatureParam::Key => self.key,
            FeatureParam::Loudness => self.loudness,
            FeatureParam::Mode => self.mode,
            FeatureParam::Speechiness => self.speechiness,
            FeatureParam::Acousticness => self.acousticness,
            FeatureParam::Instrumentalness => self.instrumentalness,
            FeatureParam::Liveness => self.liveness,
            FeatureParam::Valence => self.valence,
            FeatureParam::Tempo => self.tempo,
        }
    }
}

/// L2 norm of `a - b`. Both slices must have the same length.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
