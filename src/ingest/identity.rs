//! Identity resolution from provider hero ids to canonical champion ids
//!
//! The provider numbers its heroes with deployment-scoped ids; the only
//! join point is the localized (Chinese) champion name. The resolver is
//! rebuilt from a fresh provider roster on every run and never persisted.

use super::provider::ProviderRoster;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the canonical champion roster (`champions.json`),
/// produced by the excluded scraping layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalChampion {
    pub id: String,
    #[serde(default)]
    pub name_ja: Option<String>,
    #[serde(default)]
    pub name_cn: Option<String>,
}

/// Outcome of resolving a provider hero id.
///
/// A degraded identity keeps the raw numeric id as its canonical id;
/// downstream code decides explicitly how to treat it instead of mixing
/// it silently with resolved ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedId {
    Resolved(String),
    Unresolved(String),
}

impl ResolvedId {
    pub fn canonical(&self) -> &str {
        match self {
            ResolvedId::Resolved(id) => id,
            ResolvedId::Unresolved(raw) => raw,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedId::Resolved(_))
    }
}

/// Pure mapping `provider numeric id -> canonical id`, plus the display
/// names needed when a record is created for a newly seen champion.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    by_numeric: HashMap<String, String>,
    display_names: HashMap<String, String>,
}

impl IdentityResolver {
    /// Build the resolver by exact equality on the localized name field.
    ///
    /// Champions whose localized name is absent from the provider roster
    /// are excluded from the map; that is expected for unreleased or
    /// renamed champions, not an error.
    pub fn from_rosters(canonical: &[CanonicalChampion], provider: &ProviderRoster) -> Self {
        let name_to_hero_id: HashMap<&str, &str> = provider
            .hero_list
            .iter()
            .map(|(hero_id, hero)| (hero.name.as_str(), hero_id.as_str()))
            .collect();

        let mut by_numeric = HashMap::new();
        let mut display_names = HashMap::new();

        for champ in canonical {
            if let Some(name_ja) = &champ.name_ja {
                display_names.insert(champ.id.clone(), name_ja.clone());
            }
            let Some(name_cn) = &champ.name_cn else {
                continue;
            };
            if let Some(hero_id) = name_to_hero_id.get(name_cn.as_str()) {
                by_numeric.insert(hero_id.to_string(), champ.id.clone());
            }
        }

        Self {
            by_numeric,
            display_names,
        }
    }

    pub fn resolve(&self, numeric_id: &str) -> ResolvedId {
        match self.by_numeric.get(numeric_id) {
            Some(canonical_id) => ResolvedId::Resolved(canonical_id.clone()),
            None => ResolvedId::Unresolved(numeric_id.to_string()),
        }
    }

    pub fn display_name(&self, canonical_id: &str) -> Option<&str> {
        self.display_names.get(canonical_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_numeric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_numeric.is_empty()
    }
}
