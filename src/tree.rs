//! Pure operations over the canonical forest.
//!
//! Every structural change leaves each touched sibling group densely ordered
//! (`order` is `0..n-1` and matches the vector position). Callers are expected
//! to run these against a clone of the live collection; see `Store::mutate`.

use crate::error::TreeError;
use crate::node::{DEFAULT_CATEGORY, Node, generate_id};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Parent id understood as "no parent" by `insert`.
pub const ROOT_ID: &str = "root";

/// Where a moved node should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    Root,
    Parent(String),
    /// Root-level group for this category; created when missing.
    Category(String),
}

/// Position inside the target sibling group. A reference that is not in the
/// target group degrades to `End`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    End,
    Before(String),
    After(String),
}

#[derive(Debug, Clone, Copy)]
pub struct Found<'a> {
    pub node: &'a Node,
    pub parent: Option<&'a Node>,
    pub index: usize,
}

/// Field-wise edit applied by `update_node`; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct NodeEdit {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub prompt: Option<String>,
    pub kind: Option<String>,
    pub tags: Option<Vec<String>>,
    pub color: Option<String>,
    pub href: Option<String>,
    pub favorite: Option<bool>,
}

/// Sibling tie-break: explicit order, then case-insensitive title.
pub fn compare_nodes(a: &Node, b: &Node) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| compare_titles(&a.title, &b.title))
}

pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Rewrite orders of a sibling group to match vector positions.
pub fn renumber(siblings: &mut [Node]) {
    for (i, node) in siblings.iter_mut().enumerate() {
        node.order = i as u32;
    }
}

pub fn find<'a>(forest: &'a [Node], id: &str) -> Option<Found<'a>> {
    fn walk<'a>(
        nodes: &'a [Node],
        parent: Option<&'a Node>,
        id: &str,
    ) -> Option<Found<'a>> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id == id {
                return Some(Found { node, parent, index });
            }
            if let Some(found) = walk(&node.children, Some(node), id) {
                return Some(found);
            }
        }
        None
    }
    walk(forest, None, id)
}

pub fn find_mut<'a>(forest: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    for node in forest.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn contains(forest: &[Node], id: &str) -> bool {
    find(forest, id).is_some()
}

/// The id of the node owning `id`; `None` for roots and unknown ids.
pub fn parent_of<'a>(forest: &'a [Node], id: &str) -> Option<&'a str> {
    find(forest, id)
        .and_then(|f| f.parent)
        .map(|p| p.id.as_str())
}

pub fn all_ids(forest: &[Node]) -> HashSet<String> {
    flatten(forest).map(|r| r.node.id.clone()).collect()
}

pub fn count(forest: &[Node]) -> usize {
    flatten(forest).count()
}

/// Ids of `node` and all of its descendants, pre-order.
pub fn subtree_ids(node: &Node) -> Vec<String> {
    let mut out = vec![node.id.clone()];
    for child in &node.children {
        out.extend(subtree_ids(child));
    }
    out
}

/// Category a node gets when it is placed under `parent` without one.
pub fn inherited_category(parent: Option<&Node>, node: &Node) -> String {
    match parent {
        Some(p) if !p.category.is_empty() => p.category.clone(),
        Some(p) => p.title.clone(),
        None if node.is_group() => node.title.clone(),
        None => DEFAULT_CATEGORY.to_string(),
    }
}

fn siblings_mut<'a>(
    forest: &'a mut Vec<Node>,
    parent: Option<&str>,
) -> Option<&'a mut Vec<Node>> {
    match parent {
        None => Some(forest),
        Some(pid) => find_mut(forest, pid).map(|p| &mut p.children),
    }
}

fn fill_categories(nodes: &mut [Node], category: &str) {
    for node in nodes {
        if node.category.is_empty() {
            node.category = category.to_string();
        }
        let own = node.category.clone();
        fill_categories(&mut node.children, &own);
    }
}

/// Append `node` under `parent`. Empty, `"root"` and unknown parents put the
/// node at the root. An empty id is replaced by a generated one. Returns the id.
pub fn insert(
    forest: &mut Vec<Node>,
    mut node: Node,
    parent: Option<&str>,
) -> Result<String, TreeError> {
    node.title = node.title.trim().to_string();
    if node.title.is_empty() {
        return Err(TreeError::EmptyTitle);
    }

    let mut taken = all_ids(forest);
    if node.id.trim().is_empty() {
        node.id = generate_id(&taken);
    }
    for id in subtree_ids(&node) {
        if !taken.insert(id.clone()) {
            return Err(TreeError::DuplicateId(id));
        }
    }

    let parent = parent
        .map(str::trim)
        .filter(|p| !p.is_empty() && *p != ROOT_ID)
        .filter(|p| contains(forest, p));
    if node.category.is_empty() {
        let parent_node = parent.and_then(|p| find(forest, p)).map(|f| f.node);
        node.category = inherited_category(parent_node, &node);
    }
    let category = node.category.clone();
    fill_categories(&mut node.children, &category);
    renumber(&mut node.children);

    let id = node.id.clone();
    let siblings = siblings_mut(forest, parent)
        .ok_or_else(|| TreeError::NotFound(parent.unwrap_or(ROOT_ID).to_string()))?;
    node.order = siblings.len() as u32;
    siblings.push(node);
    Ok(id)
}

/// Remove a node from whichever sibling group holds it, re-densing that group.
fn detach(nodes: &mut Vec<Node>, id: &str) -> Option<Node> {
    if let Some(pos) = nodes.iter().position(|n| n.id == id) {
        let node = nodes.remove(pos);
        renumber(nodes);
        return Some(node);
    }
    for node in nodes.iter_mut() {
        if let Some(found) = detach(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Delete a node together with its whole subtree. Returns the removed node.
pub fn delete_subtree(forest: &mut Vec<Node>, id: &str) -> Result<Node, TreeError> {
    detach(forest, id).ok_or_else(|| TreeError::NotFound(id.to_string()))
}

fn category_group(forest: &[Node], name: &str) -> Option<String> {
    forest
        .iter()
        .find(|n| n.is_group() && (n.category == name || n.title == name))
        .map(|n| n.id.clone())
}

fn recategorize(node: &mut Node, category: &str) {
    node.category = category.to_string();
    for child in &mut node.children {
        recategorize(child, category);
    }
}

/// Move a node (with its subtree) to a new parent, category or the root.
/// Moving under a parent or into a category rewrites the category of the
/// whole subtree; moving to the root keeps it.
pub fn move_node(
    forest: &mut Vec<Node>,
    id: &str,
    target: &MoveTarget,
    placement: &Placement,
) -> Result<(), TreeError> {
    let found = find(forest, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    let subtree: HashSet<String> = subtree_ids(found.node).into_iter().collect();

    let check_cycle = |target_id: &str| {
        if subtree.contains(target_id) {
            Err(TreeError::Cycle {
                node: id.to_string(),
                target: target_id.to_string(),
            })
        } else {
            Ok(())
        }
    };

    let (parent_id, new_category) = match target {
        MoveTarget::Root => (None, None),
        MoveTarget::Parent(pid) => {
            check_cycle(pid)?;
            let parent = find(forest, pid)
                .ok_or_else(|| TreeError::NotFound(pid.clone()))?
                .node;
            (Some(pid.clone()), Some(inherited_category(Some(parent), found.node)))
        }
        MoveTarget::Category(name) => match category_group(forest, name) {
            Some(gid) => {
                check_cycle(&gid)?;
                (Some(gid), Some(name.clone()))
            }
            None => {
                let gid = generate_id(&all_ids(forest));
                let mut group = Node::group(gid.clone(), name.clone())
                    .with_category(name.clone())
                    .with_tags([name.clone()]);
                group.order = forest.len() as u32;
                forest.push(group);
                (Some(gid), Some(name.clone()))
            }
        },
    };

    let mut node = detach(forest, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    if let Some(category) = &new_category {
        recategorize(&mut node, category);
    }

    let siblings = siblings_mut(forest, parent_id.as_deref())
        .ok_or_else(|| TreeError::NotFound(parent_id.clone().unwrap_or_default()))?;
    let position = |reference: &str| siblings.iter().position(|n| n.id == reference);
    let at = match placement {
        Placement::End => siblings.len(),
        Placement::Before(r) => position(r).unwrap_or(siblings.len()),
        Placement::After(r) => position(r).map(|p| p + 1).unwrap_or(siblings.len()),
    };
    siblings.insert(at, node);
    renumber(siblings);
    Ok(())
}

impl NodeEdit {
    /// Write the set fields into `node`. A blank title is rejected before
    /// anything changes.
    pub fn apply(self, node: &mut Node) -> Result<(), TreeError> {
        let title = match self.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(TreeError::EmptyTitle);
                }
                Some(title)
            }
            None => None,
        };
        if let Some(title) = title {
            node.title = title;
        }
        if let Some(summary) = self.summary {
            node.summary = summary.trim().to_string();
        }
        if let Some(prompt) = self.prompt {
            node.prompt = prompt;
        }
        if let Some(kind) = self.kind {
            node.kind = kind;
        }
        if let Some(tags) = self.tags {
            node.tags = crate::tags::normalize_tags(tags);
        }
        if let Some(color) = self.color {
            node.color = color.trim().to_string();
        }
        if let Some(href) = self.href {
            node.href = Some(href.trim().to_string()).filter(|h| !h.is_empty());
        }
        if let Some(favorite) = self.favorite {
            node.favorite = favorite;
        }
        Ok(())
    }
}

pub fn update_node(forest: &mut [Node], id: &str, edit: NodeEdit) -> Result<(), TreeError> {
    let node = find_mut(forest, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    edit.apply(node)
}

/// Flip the favorite flag; returns the new value.
pub fn toggle_favorite(forest: &mut [Node], id: &str) -> Result<bool, TreeError> {
    let node = find_mut(forest, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    node.favorite = !node.favorite;
    Ok(node.favorite)
}

/// One node as seen by the list view: its depth, parent and effective tags
/// (own tags, or the nearest tagged ancestor's).
#[derive(Debug, Clone, Copy)]
pub struct FlatRecord<'a> {
    pub node: &'a Node,
    pub depth: usize,
    pub parent_id: Option<&'a str>,
    pub tags: &'a [String],
}

struct Frame<'a> {
    nodes: std::slice::Iter<'a, Node>,
    parent: Option<&'a Node>,
    inherited: &'a [String],
    depth: usize,
}

/// Lazy pre-order walk over a forest. Create a new one to start over.
pub struct Flatten<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = FlatRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(node) = frame.nodes.next() else {
                self.stack.pop();
                continue;
            };
            let tags: &'a [String] =
                if node.tags.is_empty() { frame.inherited } else { &node.tags };
            let record = FlatRecord {
                node,
                depth: frame.depth,
                parent_id: frame.parent.map(|p| p.id.as_str()),
                tags,
            };
            if !node.children.is_empty() {
                let depth = frame.depth + 1;
                self.stack.push(Frame {
                    nodes: node.children.iter(),
                    parent: Some(node),
                    inherited: tags,
                    depth,
                });
            }
            return Some(record);
        }
    }
}

pub fn flatten(forest: &[Node]) -> Flatten<'_> {
    flatten_with(forest, &[])
}

/// Flatten with tags inherited from outside the given forest.
pub fn flatten_with<'a>(forest: &'a [Node], inherited: &'a [String]) -> Flatten<'a> {
    Flatten {
        stack: vec![Frame {
            nodes: forest.iter(),
            parent: None,
            inherited,
            depth: 0,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        let mut forest = Vec::new();
        insert(&mut forest, Node::group("a", "A").with_tags(["A"]), None).unwrap();
        insert(&mut forest, Node::group("b", "B").with_tags(["B"]), None).unwrap();
        insert(&mut forest, Node::new("t1", "T1").with_prompt("P1"), Some("a")).unwrap();
        insert(&mut forest, Node::new("t2", "T2").with_prompt("P2"), Some("a")).unwrap();
        forest
    }

    fn orders(nodes: &[Node]) -> Vec<u32> {
        nodes.iter().map(|n| n.order).collect()
    }

    #[test]
    fn insert_assigns_order_and_inherits_category() {
        let forest = sample();
        assert_eq!(orders(&forest), vec![0, 1]);
        assert_eq!(orders(&forest[0].children), vec![0, 1]);
        assert_eq!(forest[0].category, "A");
        assert_eq!(forest[0].children[1].category, "A");
    }

    #[test]
    fn insert_with_unknown_parent_goes_to_root() {
        let mut forest = sample();
        insert(&mut forest, Node::new("x", "Loose"), Some("nope")).unwrap();
        insert(&mut forest, Node::new("y", "Rooted"), Some(ROOT_ID)).unwrap();
        assert_eq!(forest.len(), 4);
        assert_eq!(forest[2].category, DEFAULT_CATEGORY);
        assert_eq!(orders(&forest), vec![0, 1, 2, 3]);
    }

    #[test]
    fn insert_rejects_duplicates_and_blank_titles() {
        let mut forest = sample();
        assert_eq!(
            insert(&mut forest, Node::new("t1", "Again"), None),
            Err(TreeError::DuplicateId("t1".into()))
        );
        assert_eq!(
            insert(&mut forest, Node::new("z", "   "), None),
            Err(TreeError::EmptyTitle)
        );
    }

    #[test]
    fn insert_generates_missing_id() {
        let mut forest = sample();
        let id = insert(&mut forest, Node::new("", "Fresh"), Some("b")).unwrap();
        assert!(!id.is_empty());
        assert_eq!(find(&forest, &id).unwrap().parent.unwrap().id, "b");
    }

    #[test]
    fn find_reports_parent_and_index() {
        let forest = sample();
        let found = find(&forest, "t2").unwrap();
        assert_eq!(found.parent.unwrap().id, "a");
        assert_eq!(found.index, 1);
        assert!(find(&forest, "a").unwrap().parent.is_none());
        assert!(find(&forest, "missing").is_none());
        assert_eq!(parent_of(&forest, "t1"), Some("a"));
        assert_eq!(parent_of(&forest, "b"), None);
    }

    #[test]
    fn move_between_categories_redenses_both_groups() {
        let mut forest = sample();
        move_node(&mut forest, "t1", &MoveTarget::Category("B".into()), &Placement::End)
            .unwrap();
        let t1 = find(&forest, "t1").unwrap();
        assert_eq!(t1.node.category, "B");
        assert_eq!(t1.parent.unwrap().id, "b");
        assert_eq!(forest[0].children[0].id, "t2");
        assert_eq!(forest[0].children[0].order, 0);
    }

    #[test]
    fn category_move_rewrites_whole_subtree() {
        let mut forest = sample();
        insert(&mut forest, Node::new("deep", "Deep").with_category("Elsewhere"), Some("t1"))
            .unwrap();
        move_node(&mut forest, "t1", &MoveTarget::Category("B".into()), &Placement::End)
            .unwrap();
        assert_eq!(find(&forest, "deep").unwrap().node.category, "B");

        move_node(&mut forest, "t1", &MoveTarget::Root, &Placement::End).unwrap();
        assert_eq!(find(&forest, "t1").unwrap().node.category, "B");
    }

    #[test]
    fn move_to_missing_category_creates_group() {
        let mut forest = sample();
        move_node(&mut forest, "t2", &MoveTarget::Category("C".into()), &Placement::End)
            .unwrap();
        assert_eq!(forest.len(), 3);
        let group = &forest[2];
        assert!(group.is_group());
        assert_eq!(group.title, "C");
        assert_eq!(group.order, 2);
        assert_eq!(group.children[0].id, "t2");
        assert_eq!(group.children[0].category, "C");
    }

    #[test]
    fn move_before_and_after_reference() {
        let mut forest = sample();
        insert(&mut forest, Node::new("t3", "T3"), Some("a")).unwrap();
        move_node(
            &mut forest,
            "t3",
            &MoveTarget::Parent("a".into()),
            &Placement::Before("t1".into()),
        )
        .unwrap();
        let ids: Vec<&str> = forest[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t1", "t2"]);
        assert_eq!(orders(&forest[0].children), vec![0, 1, 2]);

        move_node(
            &mut forest,
            "t3",
            &MoveTarget::Parent("a".into()),
            &Placement::After("t2".into()),
        )
        .unwrap();
        let ids: Vec<&str> = forest[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let mut forest = sample();
        let before = forest.clone();
        let err = move_node(&mut forest, "a", &MoveTarget::Parent("t1".into()), &Placement::End)
            .unwrap_err();
        assert!(matches!(err, TreeError::Cycle { .. }));
        assert_eq!(forest, before);
        assert!(move_node(&mut forest, "a", &MoveTarget::Parent("a".into()), &Placement::End)
            .is_err());
    }

    #[test]
    fn delete_removes_subtree_only() {
        let mut forest = sample();
        let removed = delete_subtree(&mut forest, "a").unwrap();
        assert_eq!(removed.children.len(), 2);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "b");
        assert_eq!(forest[0].order, 0);
        assert!(delete_subtree(&mut forest, "t1").is_err());
    }

    #[test]
    fn flatten_is_preorder_with_inherited_tags() {
        let forest = sample();
        let records: Vec<_> = flatten(&forest).collect();
        let ids: Vec<&str> = records.iter().map(|r| r.node.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "t1", "t2", "b"]);
        assert_eq!(records[1].tags, ["A".to_string()]);
        assert_eq!(records[1].depth, 1);
        assert_eq!(records[1].parent_id, Some("a"));
    }

    #[test]
    fn update_and_favorite() {
        let mut forest = sample();
        update_node(
            &mut forest,
            "t1",
            NodeEdit {
                title: Some(" Renamed ".into()),
                tags: Some(vec!["#x".into(), "x".into()]),
                ..Default::default()
            },
        )
        .unwrap();
        let t1 = find(&forest, "t1").unwrap().node;
        assert_eq!(t1.title, "Renamed");
        assert_eq!(t1.tags, vec!["x"]);
        assert!(toggle_favorite(&mut forest, "t1").unwrap());
        assert!(!toggle_favorite(&mut forest, "t1").unwrap());
        assert_eq!(
            update_node(&mut forest, "t1", NodeEdit { title: Some(" ".into()), ..Default::default() }),
            Err(TreeError::EmptyTitle)
        );
    }

    #[test]
    fn root_group_built_from_edit_takes_own_title_as_category() {
        let mut forest = Vec::new();
        let mut group = Node::new("", "Ops");
        NodeEdit { kind: Some("group".into()), ..Default::default() }
            .apply(&mut group)
            .unwrap();
        let gid = insert(&mut forest, group, None).unwrap();
        let child = insert(&mut forest, Node::new("", "Disk"), Some(&gid)).unwrap();
        assert_eq!(find(&forest, &gid).unwrap().node.category, "Ops");
        assert_eq!(find(&forest, &child).unwrap().node.category, "Ops");

        let loose = insert(&mut forest, Node::new("", "Loose"), None).unwrap();
        move_node(&mut forest, &loose, &MoveTarget::Category(DEFAULT_CATEGORY.into()), &Placement::End)
            .unwrap();
        let moved = find(&forest, &loose).unwrap();
        assert_ne!(moved.parent.unwrap().id, gid);
        assert_eq!(moved.parent.unwrap().title, DEFAULT_CATEGORY);
    }

    #[test]
    fn title_tie_break_is_case_insensitive() {
        assert_eq!(compare_titles("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_titles("B", "a"), Ordering::Greater);
    }
}
