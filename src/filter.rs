//! Filter state and grouping for the list view.

use crate::node::{DEFAULT_CATEGORY, Node};
use crate::tags::has_all_tags;
use crate::tree::{FlatRecord, compare_nodes, compare_titles, flatten};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// `"All"` (any case) and empty input mean no category filter.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub category: CategoryFilter,
    pub tags: Vec<String>,
    pub favorites_only: bool,
}

/// Category a record is listed under.
pub fn category_of(node: &Node) -> &str {
    if node.category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        &node.category
    }
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        *self == FilterState::default()
    }

    /// Group containers are headings, never items, so they never match.
    pub fn matches(&self, record: &FlatRecord<'_>) -> bool {
        let node = record.node;
        if node.is_group() {
            return false;
        }
        if let CategoryFilter::Named(name) = &self.category {
            if category_of(node) != name {
                return false;
            }
        }
        if !has_all_tags(record.tags, &self.tags) {
            return false;
        }
        if self.favorites_only && !node.favorite {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {} {}",
            node.title,
            node.summary,
            node.prompt,
            record.tags.join(" ")
        )
        .to_lowercase();
        haystack.contains(&needle)
    }
}

#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub name: String,
    pub items: Vec<FlatRecord<'a>>,
}

/// Matching records grouped by category. Groups are sorted by name and
/// members by the sibling tie-break.
pub fn group_records<'a>(forest: &'a [Node], filter: &FilterState) -> Vec<Group<'a>> {
    let mut groups: BTreeMap<String, Vec<FlatRecord<'a>>> = BTreeMap::new();
    for record in flatten(forest).filter(|r| filter.matches(r)) {
        groups
            .entry(category_of(record.node).to_string())
            .or_default()
            .push(record);
    }
    let mut out: Vec<Group<'a>> = groups
        .into_iter()
        .map(|(name, mut items)| {
            items.sort_by(|a, b| compare_nodes(a.node, b.node));
            Group { name, items }
        })
        .collect();
    out.sort_by(|a, b| compare_titles(&a.name, &b.name));
    out
}

/// Item count per category, sorted by category name.
pub fn category_counts(forest: &[Node]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in flatten(forest).filter(|r| !r.node.is_group()) {
        *counts.entry(category_of(record.node).to_string()).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| compare_titles(&a.0, &b.0));
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub nodes: usize,
    pub items: usize,
    pub categories: usize,
    pub favorites: usize,
}

pub fn stats(forest: &[Node]) -> Stats {
    let mut stats = Stats::default();
    for record in flatten(forest) {
        stats.nodes += 1;
        if !record.node.is_group() {
            stats.items += 1;
        }
        if record.node.favorite {
            stats.favorites += 1;
        }
    }
    stats.categories = category_counts(forest).len();
    stats
}
