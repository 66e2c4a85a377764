use serde::{Deserialize, Serialize};

/// Strongly typed identifier for a configured resource site.
///
/// Site ids come from operator configuration rather than being generated, so
/// the backing representation is the configured string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub String);

impl SiteId {
    pub fn new(id: impl Into<String>) -> Self {
        SiteId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SiteId {
    fn from(id: &str) -> Self {
        SiteId(id.to_string())
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique key for a film record: the owning site plus the site's
/// external identifier for the film.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilmKey {
    pub site_id: SiteId,
    pub external_id: String,
}

impl FilmKey {
    pub fn new(site_id: SiteId, external_id: impl Into<String>) -> Self {
        Self {
            site_id,
            external_id: external_id.into(),
        }
    }
}

impl std::fmt::Display for FilmKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.site_id, self.external_id)
    }
}
