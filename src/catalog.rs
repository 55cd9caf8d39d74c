//! Game catalog and entitlement gate
//!
//! The built-in catalog is embedded JSON, validated on load. Premium entries
//! are gated by `Entitlement`; billing itself lives outside the crate and
//! only reports whether the player is premium.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::games::TitleId;

const BUILTIN: &str = include_str!("catalog.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Casual,
    Arcade,
    Adventure,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Casual, Category::Arcade, Category::Adventure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Casual => "casual",
            Category::Arcade => "arcade",
            Category::Adventure => "adventure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub complexity: Complexity,
    pub icon: String,
    /// Colour theme as the listing UI names it
    pub color: String,
    pub is_playable: bool,
    pub tags: Vec<String>,
    pub estimated_play_time: String,
    /// 1..=5
    pub difficulty: u8,
    #[serde(default)]
    pub premium: bool,
}

impl CatalogEntry {
    /// Controller behind this entry, if one exists
    pub fn title_id(&self) -> Option<TitleId> {
        self.id.parse().ok()
    }
}

/// Listing filter: everything or one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s == "all" {
            return Some(CategoryFilter::All);
        }
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .map(CategoryFilter::Only)
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => entry.category == *c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub playable: usize,
    pub average_difficulty: f32,
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games, {} playable, avg difficulty {:.1}",
            self.total, self.playable, self.average_difficulty
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self, GameError> {
        Self::from_json(BUILTIN)
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Ids are unique and difficulty is within 1..=5
    pub fn validate(&self) -> Result<(), GameError> {
        let mut seen = BTreeSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(GameError::InvalidCatalog {
                    id: entry.id.clone(),
                    reason: "duplicate id".to_string(),
                });
            }
            if !(1..=5).contains(&entry.difficulty) {
                return Err(GameError::InvalidCatalog {
                    id: entry.id.clone(),
                    reason: format!("difficulty {} outside 1..=5", entry.difficulty),
                });
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Standard (non-premium) entries matching `filter`
    pub fn listing(&self, filter: CategoryFilter) -> impl Iterator<Item = &CatalogEntry> {
        self.entries
            .iter()
            .filter(move |e| !e.premium && filter.matches(e))
    }

    pub fn premium(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.premium)
    }

    pub fn premium_ids(&self) -> BTreeSet<String> {
        self.premium().map(|e| e.id.clone()).collect()
    }

    /// Counts per category button; `All` counts the whole listing
    pub fn count(&self, filter: CategoryFilter) -> usize {
        self.listing(filter).count()
    }

    /// Stats over the standard listing
    pub fn stats(&self) -> CatalogStats {
        let listed: Vec<&CatalogEntry> = self.listing(CategoryFilter::All).collect();
        let total = listed.len();
        let playable = listed.iter().filter(|e| e.is_playable).count();
        let difficulty: u32 = listed.iter().map(|e| u32::from(e.difficulty)).sum();
        let average_difficulty = if total == 0 {
            0.0
        } else {
            difficulty as f32 / total as f32
        };
        CatalogStats {
            total,
            playable,
            average_difficulty,
        }
    }
}

/// Premium access as reported by the billing collaborator
pub struct Entitlement {
    is_premium: bool,
    premium_ids: BTreeSet<String>,
    on_unlock_requested: Option<Box<dyn FnMut(&str)>>,
}

impl Entitlement {
    pub fn new(premium_ids: BTreeSet<String>) -> Self {
        Self {
            is_premium: false,
            premium_ids,
            on_unlock_requested: None,
        }
    }

    /// Gate for every premium entry in `catalog`
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self::new(catalog.premium_ids())
    }

    pub fn on_unlock_requested(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_unlock_requested = Some(Box::new(f));
        self
    }

    pub fn set_premium(&mut self, is_premium: bool) {
        if self.is_premium != is_premium {
            log::info!("premium access {}", if is_premium { "granted" } else { "revoked" });
        }
        self.is_premium = is_premium;
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.premium_ids.contains(id) && !self.is_premium
    }

    /// Hand the purchase flow to the billing collaborator; fire-and-forget
    pub fn request_unlock(&mut self, id: &str) {
        match self.on_unlock_requested.as_mut() {
            Some(f) => f(id),
            None => log::warn!("unlock requested for {} but no purchase flow is wired", id),
        }
    }
}

impl fmt::Debug for Entitlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entitlement")
            .field("is_premium", &self.is_premium)
            .field("premium_ids", &self.premium_ids)
            .field("on_unlock_requested", &self.on_unlock_requested.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.count(CategoryFilter::All), 15);
        assert_eq!(catalog.premium().count(), 5);
        for title in TitleId::ALL {
            let entry = catalog.get(title.as_str()).unwrap();
            assert!(entry.is_playable);
            assert_eq!(entry.title_id(), Some(title));
        }
    }

    #[test]
    fn test_category_filter() {
        let catalog = Catalog::builtin().unwrap();
        let casual = CategoryFilter::parse("casual").unwrap();
        assert_eq!(catalog.count(casual), 5);
        assert!(catalog.listing(casual).all(|e| e.category == Category::Casual));
        let per_category: usize = Category::ALL
            .into_iter()
            .map(|c| catalog.count(CategoryFilter::Only(c)))
            .sum();
        assert_eq!(per_category, catalog.count(CategoryFilter::All));
        assert_eq!(CategoryFilter::parse("puzzle"), None);
    }

    #[test]
    fn test_stats() {
        let stats = Catalog::builtin().unwrap().stats();
        assert_eq!(stats.total, 15);
        assert_eq!(stats.playable, 4);
        assert!((stats.average_difficulty - 48.0 / 15.0).abs() < 1e-4);
        assert_eq!(stats.to_string(), "15 games, 4 playable, avg difficulty 3.2");
    }

    fn entry(id: &str, difficulty: u8) -> String {
        format!(
            r#"{{"id":"{id}","title":"T","description":"D","category":"arcade",
            "complexity":"low","icon":"*","color":"c","is_playable":false,
            "tags":[],"estimated_play_time":"1 min","difficulty":{difficulty}}}"#
        )
    }

    #[test]
    fn test_validation_rejects_bad_entries() {
        let dup = format!("[{},{}]", entry("a", 2), entry("a", 3));
        assert!(matches!(
            Catalog::from_json(&dup),
            Err(GameError::InvalidCatalog { id, .. }) if id == "a"
        ));
        let hard = format!("[{}]", entry("b", 6));
        assert!(matches!(
            Catalog::from_json(&hard),
            Err(GameError::InvalidCatalog { .. })
        ));
        let zero = format!("[{}]", entry("c", 0));
        assert!(Catalog::from_json(&zero).is_err());
        assert!(Catalog::from_json("{").is_err());
    }

    #[test]
    fn test_entitlement_gate() {
        let catalog = Catalog::builtin().unwrap();
        let requested = Rc::new(RefCell::new(Vec::new()));
        let sink = requested.clone();
        let mut gate = Entitlement::for_catalog(&catalog)
            .on_unlock_requested(move |id| sink.borrow_mut().push(id.to_string()));

        assert!(gate.is_locked("cosmic-karaoke"));
        assert!(!gate.is_locked("chicken-nugget-chaos"));
        gate.request_unlock("cosmic-karaoke");
        assert_eq!(*requested.borrow(), ["cosmic-karaoke"]);

        gate.set_premium(true);
        assert!(!gate.is_locked("cosmic-karaoke"));
    }
}
