use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use url::Url;

use filmdex_model::{
    ClassificationId, ClassificationNode, Film, FilmMetadata, FilmSummary, Site, SiteId,
};

use async_trait::async_trait;

use super::{FilmPage, PageCursor, SiteAdapter};
use crate::error::AdapterError;

/// Adapter for sites speaking the common collect-API JSON shape: a paged
/// `videolist` endpoint, a `detail` endpoint keyed by upstream ids, and a
/// `class` endpoint for the taxonomy.
pub struct JsonApiAdapter {
    site_id: SiteId,
    http: reqwest::Client,
    base_url: Url,
    list_path: String,
    detail_path: String,
    class_path: String,
    page_size: u32,
}

impl JsonApiAdapter {
    pub fn new(site: &Site) -> Result<Self, AdapterError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                site.base_config.request_timeout_secs,
            ))
            .build()?;

        Ok(Self {
            site_id: site.id.clone(),
            http,
            base_url: site.base_config.base_url.clone(),
            list_path: site.base_config.list_path.clone(),
            detail_path: site.base_config.detail_path.clone(),
            class_path: site.base_config.class_path.clone(),
            page_size: site.base_config.page_size,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AdapterError> {
        self.base_url
            .join(path)
            .map_err(|e| AdapterError::Parse(format!("invalid endpoint {path}: {e}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<T, AdapterError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterError::RateLimited);
        }
        if !status.is_success() {
            return Err(AdapterError::Http {
                status: status.as_u16(),
            });
        }
        // Decode from the raw body so malformed JSON is a permanent parse
        // failure rather than a retryable network error.
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AdapterError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SiteAdapter for JsonApiAdapter {
    async fn fetch_list(&self, cursor: PageCursor) -> Result<FilmPage, AdapterError> {
        let mut url = self.endpoint(&self.list_path)?;
        url.query_pairs_mut()
            .append_pair("ac", "videolist")
            .append_pair("pg", &cursor.page.to_string())
            .append_pair("pagesize", &self.page_size.to_string());

        let response: ListResponse = self.get_json(url).await?;
        Ok(page_from_response(response, cursor))
    }

    async fn fetch_detail(&self, external_id: &str) -> Result<Film, AdapterError> {
        let mut url = self.endpoint(&self.detail_path)?;
        url.query_pairs_mut()
            .append_pair("ac", "detail")
            .append_pair("ids", external_id);

        let response: ListResponse = self.get_json(url).await?;
        let item = response
            .list
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::NotFound(external_id.to_string()))?;
        Ok(film_from_item(&self.site_id, item))
    }

    async fn fetch_classification(&self) -> Result<Vec<ClassificationNode>, AdapterError> {
        let url = self.endpoint(&self.class_path)?;
        let response: ClassResponse = self.get_json(url).await?;
        Ok(nodes_from_response(response))
    }
}

// Upstream payloads are loose about numeric types (quoted and bare numbers
// both occur in the wild), so the envelope fields go through a tolerant
// deserializer.
fn u32_or_string<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Text(String),
    }
    match Raw::deserialize(de)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(deserialize_with = "u32_or_string", default)]
    page: u32,
    #[serde(deserialize_with = "u32_or_string", default)]
    pagecount: u32,
    #[serde(default)]
    list: Vec<VodItem>,
}

#[derive(Debug, Deserialize)]
struct VodItem {
    vod_id: i64,
    vod_name: String,
    #[serde(default)]
    type_id: Option<i64>,
    #[serde(default)]
    vod_time: Option<String>,
    #[serde(default)]
    vod_year: Option<String>,
    #[serde(default)]
    vod_area: Option<String>,
    #[serde(default)]
    vod_lang: Option<String>,
    #[serde(default)]
    vod_content: Option<String>,
    #[serde(default)]
    vod_pic: Option<String>,
    #[serde(default)]
    vod_director: Option<String>,
    #[serde(default)]
    vod_actor: Option<String>,
    #[serde(default)]
    vod_remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClassResponse {
    #[serde(default)]
    class: Vec<ClassItem>,
}

#[derive(Debug, Deserialize)]
struct ClassItem {
    type_id: i64,
    #[serde(default)]
    type_pid: i64,
    type_name: String,
}

fn parse_vod_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn page_from_response(response: ListResponse, cursor: PageCursor) -> FilmPage {
    let summaries = response
        .list
        .iter()
        .map(|item| FilmSummary {
            external_id: item.vod_id.to_string(),
            title: item.vod_name.clone(),
            updated_at: item.vod_time.as_deref().and_then(parse_vod_time),
        })
        .collect();

    let current = if response.page > 0 {
        response.page
    } else {
        cursor.page
    };
    let next = (current < response.pagecount).then(|| PageCursor { page: current + 1 });

    FilmPage { summaries, next }
}

fn film_from_item(site_id: &SiteId, item: VodItem) -> Film {
    Film {
        external_id: item.vod_id.to_string(),
        site_id: site_id.clone(),
        title: item.vod_name,
        metadata: FilmMetadata {
            year: item.vod_year.and_then(|y| y.trim().parse().ok()),
            area: item.vod_area,
            language: item.vod_lang,
            overview: item.vod_content,
            poster_url: item.vod_pic,
            director: item.vod_director,
            actors: item.vod_actor,
            remarks: item.vod_remarks,
        },
        classification_refs: item
            .type_id
            .map(|id| vec![ClassificationId(id)])
            .unwrap_or_default(),
        last_synced_at: Utc::now(),
    }
}

fn nodes_from_response(response: ClassResponse) -> Vec<ClassificationNode> {
    response
        .class
        .into_iter()
        .map(|item| ClassificationNode {
            id: ClassificationId(item.type_id),
            name: item.type_name,
            // pid 0 marks a top-level category upstream.
            parent: (item.type_pid != 0).then_some(ClassificationId(item.type_pid)),
        })
        .collect()
}
