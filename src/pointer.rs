//! Parent-pointer representation, used only at the import/export edge.

use crate::error::ImportError;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A node that names its parent instead of owning its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerNode {
    pub id: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PointerDocument {
    pub nodes: Vec<PointerNode>,
}

/// Flatten a forest into parent-pointer records, pre-order.
pub fn to_pointer(forest: &[Node]) -> Vec<PointerNode> {
    fn walk(nodes: &[Node], parent: Option<&str>, out: &mut Vec<PointerNode>) {
        for node in nodes {
            out.push(PointerNode {
                id: node.id.clone(),
                parent_id: parent.map(str::to_string),
                title: node.title.clone(),
                summary: node.summary.clone(),
                prompt: node.prompt.clone(),
                kind: node.kind.clone(),
                category: node.category.clone(),
                tags: node.tags.clone(),
                color: node.color.clone(),
                favorite: node.favorite,
                order: node.order,
                href: node.href.clone(),
            });
            walk(&node.children, Some(&node.id), out);
        }
    }
    let mut out = Vec::new();
    walk(forest, None, &mut out);
    out
}

/// Rebuild a forest from pointer records through the normalizer.
pub fn from_pointer(records: &[PointerNode]) -> Result<Vec<Node>, ImportError> {
    let doc = serde_json::json!({ "nodes": records });
    crate::normalize::normalize(&doc)
}

/// `id` and every record that descends from it. Expands the set until a
/// full scan adds nothing.
pub fn descendant_closure(records: &[PointerNode], id: &str) -> HashSet<String> {
    let mut closure = HashSet::new();
    if !records.iter().any(|r| r.id == id) {
        return closure;
    }
    closure.insert(id.to_string());
    loop {
        let before = closure.len();
        for record in records {
            if let Some(parent) = &record.parent_id {
                if closure.contains(parent) {
                    closure.insert(record.id.clone());
                }
            }
        }
        if closure.len() == before {
            return closure;
        }
    }
}

/// Remove `id` and its descendants; returns how many records were dropped.
pub fn delete_subtree(records: &mut Vec<PointerNode>, id: &str) -> usize {
    let doomed = descendant_closure(records, id);
    let before = records.len();
    records.retain(|r| !doomed.contains(&r.id));
    before - records.len()
}

/// Whether following parent links from `id` reaches a root within
/// `records.len()` steps. Dangling parents count as roots.
pub fn reaches_root(records: &[PointerNode], id: &str) -> bool {
    let parents: HashMap<&str, Option<&str>> = records
        .iter()
        .map(|r| (r.id.as_str(), r.parent_id.as_deref()))
        .collect();
    let mut cursor = Some(id);
    for _ in 0..=records.len() {
        match cursor.and_then(|c| parents.get(c).copied().flatten()) {
            None => return true,
            Some(parent) => cursor = Some(parent),
        }
    }
    false
}
