use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::ClassificationId;
use crate::ids::{FilmKey, SiteId};

/// Lightweight listing entry returned by a site's paged list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmSummary {
    pub external_id: String,
    pub title: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Descriptive fields for a film. Every field is optional so an incremental
/// fetch can carry only what the source returned; absent fields never
/// overwrite stored values on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmMetadata {
    pub year: Option<i32>,
    pub area: Option<String>,
    pub language: Option<String>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub remarks: Option<String>,
}

impl FilmMetadata {
    /// Apply the fetched fields of `other` over `self`, leaving fields the
    /// fetch did not return untouched.
    pub fn merge(&mut self, other: &FilmMetadata) {
        macro_rules! take_if_some {
            ($field:ident) => {
                if other.$field.is_some() {
                    self.$field = other.$field.clone();
                }
            };
        }
        take_if_some!(year);
        take_if_some!(area);
        take_if_some!(language);
        take_if_some!(overview);
        take_if_some!(poster_url);
        take_if_some!(director);
        take_if_some!(actors);
        take_if_some!(remarks);
    }
}

/// A catalog record for one film as known from one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub external_id: String,
    pub site_id: SiteId,
    pub title: String,
    pub metadata: FilmMetadata,
    pub classification_refs: Vec<ClassificationId>,
    pub last_synced_at: DateTime<Utc>,
}

impl Film {
    pub fn key(&self) -> FilmKey {
        FilmKey::new(self.site_id.clone(), self.external_id.clone())
    }

    /// Merge a freshly fetched record into this one: fetched fields update,
    /// everything else stays. The sync timestamp always advances.
    pub fn merge_from(&mut self, update: &Film) {
        if !update.title.is_empty() {
            self.title = update.title.clone();
        }
        self.metadata.merge(&update.metadata);
        if !update.classification_refs.is_empty() {
            self.classification_refs = update.classification_refs.clone();
        }
        self.last_synced_at = update.last_synced_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_film() -> Film {
        Film {
            external_id: "f-1".into(),
            site_id: SiteId::from("alpha"),
            title: "The Long Voyage".into(),
            metadata: FilmMetadata {
                year: Some(1999),
                area: Some("US".into()),
                overview: Some("A ship goes far.".into()),
                ..FilmMetadata::default()
            },
            classification_refs: vec![ClassificationId(3)],
            last_synced_at: Utc::now(),
        }
    }

    #[test]
    fn merge_keeps_fields_absent_from_the_fetch() {
        let mut stored = stored_film();
        let update = Film {
            external_id: "f-1".into(),
            site_id: SiteId::from("alpha"),
            title: String::new(),
            metadata: FilmMetadata {
                remarks: Some("HD remaster".into()),
                ..FilmMetadata::default()
            },
            classification_refs: vec![],
            last_synced_at: Utc::now(),
        };

        stored.merge_from(&update);

        assert_eq!(stored.title, "The Long Voyage");
        assert_eq!(stored.metadata.year, Some(1999));
        assert_eq!(stored.metadata.remarks.as_deref(), Some("HD remaster"));
        assert_eq!(stored.classification_refs, vec![ClassificationId(3)]);
    }

    #[test]
    fn merge_is_idempotent_for_identical_payloads() {
        let mut stored = stored_film();
        let update = stored.clone();

        stored.merge_from(&update);
        let once = stored.clone();
        stored.merge_from(&update);

        assert_eq!(stored, once);
    }
}
