//! User-controlled browsing state and the outbound query derived from it.

use serde::{Deserialize, Serialize};
use shared::domain::{SortKey, SortOrder, ALL_CATEGORIES};
use url::Url;

use crate::{
    error::CatalogError,
    pagination::{offset_for_page, PAGE_SIZE},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub search_term: String,
    pub category: String,
    pub sort: SortKey,
    pub page: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            category: ALL_CATEGORIES.to_string(),
            sort: SortKey::Default,
            page: 1,
        }
    }
}

impl QueryState {
    /// Activates text search. Whitespace-only terms deactivate it.
    pub fn set_search(&mut self, term: &str) {
        self.search_term = term.trim().to_string();
        self.category = ALL_CATEGORIES.to_string();
        self.page = 1;
    }

    /// Activates a category filter; an empty slug means "all".
    pub fn set_category(&mut self, category: &str) {
        let category = category.trim();
        self.category = if category.is_empty() {
            ALL_CATEGORIES.to_string()
        } else {
            category.to_string()
        };
        self.search_term.clear();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32, total_pages: u32) -> Result<(), CatalogError> {
        if page == 0 || page > total_pages {
            return Err(CatalogError::PageOutOfRange {
                requested: page,
                total_pages,
            });
        }
        self.page = page;
        Ok(())
    }

    /// Returns whether the page moved.
    pub fn next_page(&mut self, total_pages: u32) -> bool {
        let next = self.page.saturating_add(1).min(total_pages.max(1));
        let moved = next != self.page;
        self.page = next;
        moved
    }

    /// Returns whether the page moved.
    pub fn prev_page(&mut self) -> bool {
        let prev = self.page.saturating_sub(1).max(1);
        let moved = prev != self.page;
        self.page = prev;
        moved
    }

    pub fn clear_filters(&mut self) {
        *self = Self::default();
    }

    pub fn is_searching(&self) -> bool {
        !self.search_term.is_empty()
    }

    pub fn active_category(&self) -> Option<&str> {
        (self.category != ALL_CATEGORIES).then_some(self.category.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    Search(String),
    Category(String),
    All,
}

/// Exactly one remote request, fully derived from a [`QueryState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub scope: QueryScope,
    pub limit: u32,
    pub offset: u64,
    pub sort: Option<(&'static str, SortOrder)>,
}

impl CatalogQuery {
    /// Search beats category, category beats the unscoped listing.
    pub fn from_state(state: &QueryState) -> Self {
        let scope = if state.is_searching() {
            QueryScope::Search(state.search_term.clone())
        } else if let Some(category) = state.active_category() {
            QueryScope::Category(category.to_string())
        } else {
            QueryScope::All
        };

        Self {
            scope,
            limit: PAGE_SIZE,
            offset: offset_for_page(state.page),
            sort: state.sort.sort_params(),
        }
    }

    pub fn to_url(&self, base: &Url) -> Result<Url, CatalogError> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| CatalogError::InvalidBaseUrl {
                    url: base.to_string(),
                    reason: "url cannot carry a path".into(),
                })?;
            segments.pop_if_empty().push("products");
            match &self.scope {
                QueryScope::Search(_) => {
                    segments.push("search");
                }
                QueryScope::Category(slug) => {
                    segments.extend(["category", slug.as_str()]);
                }
                QueryScope::All => {}
            }
        }

        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            if let QueryScope::Search(term) = &self.scope {
                pairs.append_pair("q", term);
            }
            pairs
                .append_pair("limit", &self.limit.to_string())
                .append_pair("skip", &self.offset.to_string());
            if let Some((field, order)) = self.sort {
                pairs
                    .append_pair("sortBy", field)
                    .append_pair("order", order.as_str());
            }
        }
        Ok(url)
    }
}

pub fn categories_url(base: &Url) -> Result<Url, CatalogError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| CatalogError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "url cannot carry a path".into(),
        })?
        .pop_if_empty()
        .extend(["products", "categories"]);
    url.set_query(None);
    Ok(url)
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
