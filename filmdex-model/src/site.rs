use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::SiteId;

/// Which adapter implementation a site's fetch operations go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// The common collect-API shape: JSON list/detail/class endpoints.
    JsonApi,
}

/// Per-site request configuration carried by the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub base_url: Url,
    #[serde(default = "default_list_path")]
    pub list_path: String,
    #[serde(default = "default_detail_path")]
    pub detail_path: String,
    #[serde(default = "default_class_path")]
    pub class_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_list_path() -> String {
    "/api.php/provide/vod/".to_string()
}

fn default_detail_path() -> String {
    "/api.php/provide/vod/at/json/".to_string()
}

fn default_class_path() -> String {
    "/api.php/provide/vod/?ac=class".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    20
}

/// A configured external source of film metadata. Immutable once loaded for
/// a run; owned by the site registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub display_name: String,
    pub adapter_kind: AdapterKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub base_config: SiteConfig,
}

fn default_enabled() -> bool {
    true
}
