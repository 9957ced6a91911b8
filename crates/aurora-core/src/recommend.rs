//! The derived "common recommendations" category
//!
//! Rebuilt from scratch after every change to the category list: the
//! most-clicked links across all other categories, one per normalized URL.

use aurora_common::{Category, LinkItem, normalize_url, recommendations};
use std::collections::HashSet;

/// Build the derived category from the current category list
pub fn build_recommendations(categories: &[Category]) -> Category {
    let mut seen = HashSet::new();
    let mut candidates: Vec<&LinkItem> = Vec::new();

    for category in categories.iter().filter(|c| !c.is_recommendations()) {
        for link in &category.links {
            if seen.insert(normalize_url(&link.url)) {
                candidates.push(link);
            }
        }
    }

    // sort_by is stable, so ties keep first-seen order
    candidates.sort_by(|a, b| b.clicks().cmp(&a.clicks()));

    let links = candidates
        .into_iter()
        .take(recommendations::MAX_LINKS)
        .map(|link| LinkItem {
            id: format!("{}{}", recommendations::LINK_ID_PREFIX, link.id),
            ..link.clone()
        })
        .collect();

    Category {
        id: recommendations::CATEGORY_ID.to_string(),
        title: recommendations::CATEGORY_TITLE.to_string(),
        icon: recommendations::CATEGORY_ICON.to_string(),
        links,
    }
}

/// Replace the derived category in place, or prepend it if missing
pub fn refresh_recommendations(mut categories: Vec<Category>) -> Vec<Category> {
    let derived = build_recommendations(&categories);
    match categories.iter().position(Category::is_recommendations) {
        Some(index) => categories[index] = derived,
        None => categories.insert(0, derived),
    }
    categories
}
