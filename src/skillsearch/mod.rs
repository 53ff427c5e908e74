//! Catalog skill search: a complete reference skill built on the engine.
//!
//! The user names a topic, the skill looks it up in a catalog and walks the
//! results one at a time, describing the one the user picks.

mod states;

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::attributes::{Domain, SessionAttributes};
use crate::builder::MachineBuilder;
use crate::config::SkillConfig;
use crate::error::DefinitionError;
use crate::lookup::LookupOperation;
use crate::machine::CompiledMachine;
use crate::profile::Profile;
use crate::triggers::Trigger;

pub use states::{
    DescribingState, ExitingState, HasResultState, InitialState, IsThatAllState,
    NoResultState, SearchPromptState,
};

/// One entry of the skill catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id:          String,
    pub name:        String,
    #[serde(default)]
    pub creator:     Option<String>,
    pub category:    String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avg_rating:  f64,
    #[serde(default)]
    pub num_ratings: u32,
    #[serde(default)]
    pub image_url:   Option<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id:          id.into(),
            name:        name.into(),
            creator:     None,
            category:    category.into(),
            description: String::new(),
            avg_rating:  0.0,
            num_ratings: 0,
            image_url:   None,
        }
    }

    pub fn by(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into()); self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into(); self
    }

    pub fn rated(mut self, avg_rating: f64, num_ratings: u32) -> Self {
        self.avg_rating = avg_rating;
        self.num_ratings = num_ratings;
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into()); self
    }

    /// How the item is named aloud, e.g. "Pizza Finder by Slices Inc in the
    /// category Food".
    pub fn verbal(&self) -> String {
        match &self.creator {
            Some(creator) => format!("{} by {} in the category {}", self.name, creator, self.category),
            None          => format!("{} in the category {}", self.name, self.category),
        }
    }

    /// Empty when there are no reviews and `say_no_reviews` is false.
    pub fn verbal_ratings(&self, say_no_reviews: bool) -> String {
        if self.num_ratings > 0 {
            format!("has an average rating of {:.1} from {} reviews", self.avg_rating, self.num_ratings)
        } else if say_no_reviews {
            "has no reviews at this time".to_string()
        } else {
            String::new()
        }
    }
}

/// What one catalog query returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The query these results were produced for.
    pub query: String,
    /// Total hits in the catalog; `items` may hold fewer.
    pub total: usize,
    pub items: Vec<CatalogItem>,
}

impl SearchResults {
    pub fn new(query: impl Into<String>, items: Vec<CatalogItem>) -> Self {
        Self { query: query.into(), total: items.len(), items }
    }

    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = total.max(self.items.len()); self
    }
}

/// Context fields of the search skill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFields {
    /// Index into the cached results of the item under discussion.
    pub skill_cursor:    usize,
    pub skill_id:        Option<String>,
    pub first_time_user: bool,
    /// Cached lookup; never sent to the caller.
    #[serde(skip)]
    pub result:          Option<SearchResults>,
}

impl Domain for SearchFields {
    const SLOTS: &'static [&'static str] = &["query"];

    fn apply_profile(&mut self, profile: Option<&Profile>) {
        self.first_time_user = profile.is_none();
    }

    /// A new search always asks the backend again; other turns keep the
    /// results they are paging through.
    fn begin_turn(&mut self, trigger: &Trigger) {
        if *trigger == Trigger::search() {
            self.result = None;
        }
    }
}

impl SearchFields {
    /// The item at the cursor, if results are cached.
    pub fn current(&self) -> Option<&CatalogItem> {
        self.result.as_ref().and_then(|r| r.items.get(self.skill_cursor))
    }

    pub fn has_next(&self) -> bool {
        self.result.as_ref().is_some_and(|r| self.skill_cursor + 1 < r.items.len())
    }

    fn select(&mut self, cursor: usize) -> Result<(), String> {
        let id = self.result.as_ref()
            .and_then(|r| r.items.get(cursor))
            .map(|item| item.id.clone())
            .ok_or_else(|| format!("no search result at position {}", cursor))?;
        self.skill_cursor = cursor;
        self.skill_id = Some(id);
        Ok(())
    }
}

/// Prepare operation: runs the query in the `query` slot unless the cached
/// results were already produced for it. The cache lives until the next
/// `Search` turn, so candidates of one resolution share a single lookup.
fn search(
    lookup: &dyn LookupOperation<Output = SearchResults>,
    attrs:  &mut SessionAttributes<SearchFields>,
) -> Result<(), String> {
    let query = attrs.slot("query")
        .ok_or_else(|| "no query captured".to_string())?
        .to_string();

    if attrs.fields.result.as_ref().is_some_and(|r| r.query == query) {
        return Ok(());
    }

    tracing::info!(query = %query, "searching catalog");
    let mut results = lookup.lookup(&query)?;
    tracing::info!(query = %query, total = results.total, "search returned");
    results.query = query;
    attrs.fields.result = Some(results);
    Ok(())
}

/// Compiles the search skill against a catalog backend.
pub fn build_search_machine(
    config: &SkillConfig,
    lookup: Arc<dyn LookupOperation<Output = SearchResults>>,
) -> Result<CompiledMachine<SearchFields>, DefinitionError> {
    MachineBuilder::<SearchFields>::new()
        .config(config.clone())
        .state(InitialState::new(config))
        .state(NoResultState::new(config))
        .state(HasResultState::new(config))
        .state(DescribingState::new(config))
        .state(SearchPromptState::new(config))
        .state(IsThatAllState)
        .state(ExitingState::new(config))
        .effect("search", move |attrs| search(lookup.as_ref(), attrs))
        .guard("no_results", |attrs| {
            attrs.fields.result.as_ref().is_some_and(|r| r.items.is_empty())
        })
        .guard("has_results", |attrs| {
            attrs.fields.result.as_ref().is_some_and(|r| !r.items.is_empty())
        })
        .guard("has_next", |attrs| attrs.fields.has_next())
        .effect("reset_cursor", |attrs| attrs.fields.select(0))
        .effect("advance_cursor", |attrs| {
            let next = attrs.fields.skill_cursor + 1;
            attrs.fields.select(next)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbal_mentions_creator_when_known() {
        let item = CatalogItem::new("a1", "AI thing", "Smart Home");
        assert_eq!(item.verbal(), "AI thing in the category Smart Home");
        assert_eq!(item.by("AI2").verbal(), "AI thing by AI2 in the category Smart Home");
    }

    #[test]
    fn ratings_are_optional_aloud() {
        let item = CatalogItem::new("a1", "AI thing", "Smart Home");
        assert_eq!(item.verbal_ratings(true), "has no reviews at this time");
        assert_eq!(item.verbal_ratings(false), "");
        assert_eq!(
            item.rated(4.3, 12).verbal_ratings(false),
            "has an average rating of 4.3 from 12 reviews"
        );
    }

    #[test]
    fn has_next_stops_at_last_item() {
        let items = (0..3).map(|i| CatalogItem::new(format!("id{i}"), "x", "y")).collect();
        let mut fields = SearchFields {
            result: Some(SearchResults::new("q", items)),
            ..SearchFields::default()
        };
        assert!(fields.has_next());
        fields.select(2).unwrap();
        assert!(!fields.has_next());
        assert_eq!(fields.skill_id.as_deref(), Some("id2"));
        assert!(fields.select(3).is_err());
    }

    #[test]
    fn cached_result_is_not_persisted() {
        let mut attrs = SessionAttributes::<SearchFields>::new();
        attrs.fields.result = Some(SearchResults::empty("pizza"));
        let js = attrs.to_persisted().unwrap();
        assert!(js.get("result").is_none());
        assert_eq!(js["skill_cursor"], 0);
    }
}
