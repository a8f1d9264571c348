use serde::{Deserialize, Serialize};

use crate::domain::{format_label, Category, Product};

const UNKNOWN_CATEGORY_LABEL: &str = "Unknown";

/// One page of products as returned by the listing, search and category endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// An entry of the category endpoint. Older deployments return bare slugs, newer
/// ones return records; anything else is carried as `Other` and dropped on
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryDescriptor {
    Slug(String),
    Record(CategoryRecord),
    Other(serde_json::Value),
}

impl CategoryDescriptor {
    pub fn normalize(&self) -> Option<Category> {
        let (id, base) = match self {
            CategoryDescriptor::Slug(slug) => (slug.as_str(), slug.as_str()),
            CategoryDescriptor::Record(record) => (
                first_non_empty(&[&record.slug, &record.value]),
                first_non_empty(&[&record.name, &record.slug]),
            ),
            CategoryDescriptor::Other(_) => return None,
        };

        let id = id.trim();
        if id.is_empty() {
            return None;
        }

        let label = if base.trim().is_empty() {
            UNKNOWN_CATEGORY_LABEL.to_string()
        } else {
            format_label(base.trim())
        };

        Some(Category {
            id: id.to_string(),
            label,
        })
    }
}

fn first_non_empty<'a>(candidates: &[&'a Option<String>]) -> &'a str {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

/// Normalizes a whole category payload, keeping server order and dropping
/// entries without a usable identifier.
pub fn normalize_categories(descriptors: &[CategoryDescriptor]) -> Vec<Category> {
    descriptors
        .iter()
        .filter_map(CategoryDescriptor::normalize)
        .collect()
}
