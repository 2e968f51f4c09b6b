//! Turns any accepted input shape into the canonical forest.
//!
//! Three shapes are recognized, in this order:
//! 1. an array whose first element carries a `children` key (nested forest),
//! 2. any other array (flat records grouped by `category`),
//! 3. an object with a `nodes` array (records linked by `parentId`).
//!
//! Normalization is all-or-nothing: any invalid record fails the whole input.

use crate::error::ImportError;
use crate::node::{DEFAULT_CATEGORY, KIND_GROUP, KIND_PROMPT, Node, generate_id};
use crate::tree::{compare_titles, inherited_category, renumber};
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Which detector matched the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Forest,
    Flat,
    Pointer,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdField {
    Text(String),
    Number(i64),
}

impl IdField {
    fn into_string(self) -> String {
        match self {
            IdField::Text(s) => s.trim().to_string(),
            IdField::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagsField {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNode {
    id: Option<IdField>,
    title: Option<String>,
    summary: Option<String>,
    prompt: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    category: Option<String>,
    tags: Option<TagsField>,
    color: Option<String>,
    favorite: Option<bool>,
    order: Option<i64>,
    href: Option<String>,
    #[serde(rename = "parentId", alias = "parent_id", alias = "parent")]
    parent_id: Option<IdField>,
    children: Option<Vec<Value>>,
}

/// A node before ids, categories and orders are settled.
struct Draft {
    node: Node,
    order: Option<i64>,
    explicit_category: bool,
    children: Vec<Draft>,
}

pub fn parse_document(text: &str) -> Result<Vec<Node>, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    normalize(&value)
}

pub fn detect(raw: &Value) -> Result<Shape, ImportError> {
    match raw {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) if first.contains_key("children") => Ok(Shape::Forest),
            _ => Ok(Shape::Flat),
        },
        Value::Object(map) if map.get("nodes").is_some_and(Value::is_array) => Ok(Shape::Pointer),
        _ => Err(ImportError::UnrecognizedShape),
    }
}

pub fn normalize(raw: &Value) -> Result<Vec<Node>, ImportError> {
    let shape = detect(raw)?;
    let drafts = match (shape, raw) {
        (Shape::Forest, Value::Array(items)) => forest_drafts(items, "")?,
        (Shape::Flat, Value::Array(items)) => flat_drafts(items)?,
        (Shape::Pointer, Value::Object(map)) => {
            let items = map
                .get("nodes")
                .and_then(Value::as_array)
                .ok_or(ImportError::UnrecognizedShape)?;
            pointer_drafts(items)?
        }
        _ => return Err(ImportError::UnrecognizedShape),
    };

    let mut taken = HashSet::new();
    collect_given_ids(&drafts, &mut taken)?;
    let forest = finish(drafts, None, &mut taken);
    tracing::debug!(?shape, roots = forest.len(), "normalized input");
    Ok(forest)
}

fn parse_record(value: &Value, at: &str) -> Result<RawNode, ImportError> {
    if !value.is_object() {
        return Err(ImportError::NotAnObject { at: at.to_string() });
    }
    RawNode::deserialize(value).map_err(|source| ImportError::Malformed {
        at: at.to_string(),
        source,
    })
}

fn draft_from(raw: RawNode, at: &str) -> Result<Draft, ImportError> {
    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ImportError::MissingField {
            at: at.to_string(),
            field: "title",
        })?;
    let tags = match raw.tags {
        Some(TagsField::List(list)) => crate::tags::normalize_tags(list),
        Some(TagsField::Text(text)) => crate::tags::parse_tag_list(&text),
        None => Vec::new(),
    };
    let category = raw.category.map(|c| c.trim().to_string()).unwrap_or_default();

    let mut node = Node::new(raw.id.map(IdField::into_string).unwrap_or_default(), title);
    node.summary = raw.summary.map(|s| s.trim().to_string()).unwrap_or_default();
    node.prompt = raw.prompt.unwrap_or_default();
    node.kind = raw
        .kind
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| KIND_PROMPT.to_string());
    node.tags = tags;
    node.color = raw.color.map(|c| c.trim().to_string()).unwrap_or_default();
    node.favorite = raw.favorite.unwrap_or(false);
    node.href = raw.href.map(|h| h.trim().to_string()).filter(|h| !h.is_empty());

    Ok(Draft {
        explicit_category: !category.is_empty(),
        node: Node { category, ..node },
        order: raw.order,
        children: Vec::new(),
    })
}

fn forest_drafts(items: &[Value], prefix: &str) -> Result<Vec<Draft>, ImportError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let at = format!("{prefix}[{i}]");
        let mut raw = parse_record(item, &at)?;
        let children = raw.children.take().unwrap_or_default();
        let mut draft = draft_from(raw, &at)?;
        draft.children = forest_drafts(&children, &format!("{at}.children"))?;
        out.push(draft);
    }
    Ok(out)
}

fn flat_drafts(items: &[Value]) -> Result<Vec<Draft>, ImportError> {
    let mut groups: Vec<Draft> = Vec::new();
    let mut by_category: HashMap<String, usize> = HashMap::new();

    for (i, item) in items.iter().enumerate() {
        let at = format!("[{i}]");
        let raw = parse_record(item, &at)?;
        if raw.prompt.is_none() && raw.category.is_none() {
            return Err(ImportError::MissingField { at, field: "prompt" });
        }
        let mut draft = draft_from(raw, &at)?;
        if draft.node.category.is_empty() {
            draft.node.category = DEFAULT_CATEGORY.to_string();
            draft.explicit_category = true;
        }
        let category = draft.node.category.clone();
        let mut tags = vec![category.clone()];
        tags.append(&mut draft.node.tags);
        draft.node.tags = crate::tags::normalize_tags(tags);

        let slot = *by_category.entry(category.clone()).or_insert_with(|| {
            let mut group = Node::new("", category.clone()).with_category(category.clone());
            group.kind = KIND_GROUP.to_string();
            group.tags = vec![category.clone()];
            groups.push(Draft {
                node: group,
                order: None,
                explicit_category: true,
                children: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].children.push(draft);
    }
    Ok(groups)
}

fn pointer_drafts(items: &[Value]) -> Result<Vec<Draft>, ImportError> {
    let mut drafts = Vec::with_capacity(items.len());
    let mut parents = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let at = format!("nodes[{i}]");
        let mut raw = parse_record(item, &at)?;
        let parent = raw
            .parent_id
            .take()
            .map(IdField::into_string)
            .filter(|p| !p.is_empty());
        raw.children = None;
        drafts.push(draft_from(raw, &at)?);
        parents.push(parent);
    }

    let index: HashMap<&str, usize> = drafts
        .iter()
        .enumerate()
        .filter(|(_, d)| !d.node.id.is_empty())
        .map(|(i, d)| (d.node.id.as_str(), i))
        .collect();
    let parent_idx: Vec<Option<usize>> = parents
        .iter()
        .map(|p| p.as_deref().and_then(|p| index.get(p).copied()))
        .collect();

    // Every chain must reach a root within `len` steps.
    for start in 0..drafts.len() {
        let mut cursor = parent_idx[start];
        let mut steps = 0;
        while let Some(p) = cursor {
            steps += 1;
            if steps > drafts.len() {
                return Err(ImportError::Cycle(drafts[start].node.id.clone()));
            }
            cursor = parent_idx[p];
        }
    }

    let mut kids: Vec<Vec<usize>> = vec![Vec::new(); drafts.len()];
    let mut roots = Vec::new();
    for (i, p) in parent_idx.iter().enumerate() {
        match p {
            Some(p) => kids[*p].push(i),
            None => roots.push(i),
        }
    }

    let mut slots: Vec<Option<Draft>> = drafts.into_iter().map(Some).collect();
    fn assemble(i: usize, slots: &mut [Option<Draft>], kids: &[Vec<usize>]) -> Option<Draft> {
        let mut draft = slots[i].take()?;
        draft.children = kids[i]
            .iter()
            .filter_map(|&k| assemble(k, slots, kids))
            .collect();
        Some(draft)
    }
    Ok(roots
        .into_iter()
        .filter_map(|r| assemble(r, &mut slots, &kids))
        .collect())
}

fn collect_given_ids(drafts: &[Draft], taken: &mut HashSet<String>) -> Result<(), ImportError> {
    for draft in drafts {
        let id = &draft.node.id;
        if !id.is_empty() && !taken.insert(id.clone()) {
            return Err(ImportError::DuplicateId(id.clone()));
        }
        collect_given_ids(&draft.children, taken)?;
    }
    Ok(())
}

fn compare_drafts(a: &Draft, b: &Draft) -> Ordering {
    let by_order = match (a.order, b.order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_order.then_with(|| compare_titles(&a.node.title, &b.node.title))
}

/// Settle ids, categories and dense orders, producing final nodes.
fn finish(mut drafts: Vec<Draft>, parent: Option<&Node>, taken: &mut HashSet<String>) -> Vec<Node> {
    drafts.sort_by(compare_drafts);
    let mut out = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let mut node = draft.node;
        if node.id.is_empty() {
            node.id = generate_id(taken);
            taken.insert(node.id.clone());
        }
        if !draft.explicit_category {
            node.category = inherited_category(parent, &node);
        }
        node.children = finish(draft.children, Some(&node), taken);
        out.push(node);
    }
    renumber(&mut out);
    out
}
