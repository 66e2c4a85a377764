use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use filmdex_model::{Site, SiteId};

use crate::error::{CollectError, Result};

/// Immutable lookup of configured resource sites for one run.
#[derive(Debug, Default)]
pub struct SiteRegistry {
    sites: HashMap<SiteId, Arc<Site>>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    site: Vec<Site>,
}

impl SiteRegistry {
    pub fn from_sites(sites: Vec<Site>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(sites.len());
        for site in sites {
            let id = site.id.clone();
            if by_id.insert(id.clone(), Arc::new(site)).is_some() {
                return Err(CollectError::Config(format!(
                    "duplicate site id in configuration: {id}"
                )));
            }
        }
        Ok(Self { sites: by_id })
    }

    /// Load site definitions from a TOML document with `[[site]]` tables.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: RegistryFile =
            toml::from_str(raw).map_err(|e| CollectError::Config(e.to_string()))?;
        Self::from_sites(file.site)
    }

    pub fn get(&self, id: &SiteId) -> Option<Arc<Site>> {
        self.sites.get(id).cloned()
    }

    pub fn enabled_sites(&self) -> Vec<Arc<Site>> {
        let mut sites: Vec<_> = self
            .sites
            .values()
            .filter(|s| s.enabled)
            .cloned()
            .collect();
        sites.sort_by(|a, b| a.id.cmp(&b.id));
        sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
