use prompt_grove::export;
use prompt_grove::node::Node;
use prompt_grove::normalize::parse_document;
use prompt_grove::pointer::{from_pointer, to_pointer};
use prompt_grove::tree::{self, MoveTarget, Placement};
use proptest::prelude::*;
use std::collections::HashSet;

const CATEGORIES: [&str; 3] = ["Group 0", "Drafts", "Ops"];

#[derive(Debug, Clone)]
enum Dest {
    Root,
    Parent(usize),
    Category(usize),
}

#[derive(Debug, Clone)]
enum Op {
    Insert { parent: usize, group: bool },
    Move { node: usize, dest: Dest, before: Option<usize> },
    Delete { node: usize },
    Favorite { node: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<usize>(), any::<bool>()).prop_map(|(parent, group)| Op::Insert { parent, group }),
        3 => (any::<usize>(), dest_strategy(), proptest::option::of(any::<usize>()))
            .prop_map(|(node, dest, before)| Op::Move { node, dest, before }),
        1 => any::<usize>().prop_map(|node| Op::Delete { node }),
        1 => any::<usize>().prop_map(|node| Op::Favorite { node }),
    ]
}

fn dest_strategy() -> impl Strategy<Value = Dest> {
    prop_oneof![
        1 => Just(Dest::Root),
        2 => any::<usize>().prop_map(Dest::Parent),
        2 => (0..CATEGORIES.len()).prop_map(Dest::Category),
    ]
}

fn ids(forest: &[Node]) -> Vec<String> {
    tree::flatten(forest).map(|r| r.node.id.clone()).collect()
}

fn pick(known: &[String], i: usize) -> String {
    known[i % known.len()].clone()
}

/// Replay `ops` against an empty forest. Rejected moves must be cycles and
/// must leave the forest exactly as it was.
fn build(ops: &[Op]) -> Vec<Node> {
    let mut forest = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        let known = ids(&forest);
        match *op {
            Op::Insert { parent, group } => {
                let parent = (!known.is_empty()).then(|| pick(&known, parent));
                let node = if group {
                    Node::group(format!("n{i}"), format!("Group {i}"))
                } else {
                    Node::new(format!("n{i}"), format!("Prompt {i}")).with_prompt(format!("text {i}"))
                };
                tree::insert(&mut forest, node, parent.as_deref()).unwrap();
            }
            Op::Move { node, ref dest, before } if !known.is_empty() => {
                let id = pick(&known, node);
                let target = match *dest {
                    Dest::Root => MoveTarget::Root,
                    Dest::Parent(t) => MoveTarget::Parent(pick(&known, t)),
                    Dest::Category(c) => MoveTarget::Category(CATEGORIES[c].to_string()),
                };
                let placement = match before {
                    Some(b) => Placement::Before(pick(&known, b)),
                    None => Placement::End,
                };
                let snapshot = forest.clone();
                match tree::move_node(&mut forest, &id, &target, &placement) {
                    Ok(()) => {
                        if let MoveTarget::Category(name) = &target {
                            assert_moved_into_category(&forest, &id, name);
                        }
                    }
                    Err(e) => {
                        let subtree = tree::subtree_ids(tree::find(&snapshot, &id).unwrap().node);
                        let blocked = match &target {
                            MoveTarget::Root => panic!("moving to the root cannot fail: {e}"),
                            MoveTarget::Parent(pid) => pid.clone(),
                            MoveTarget::Category(name) => snapshot
                                .iter()
                                .find(|n| n.is_group() && (n.category == *name || n.title == *name))
                                .map(|n| n.id.clone())
                                .unwrap_or_else(|| panic!("new category group cannot fail: {e}")),
                        };
                        assert!(subtree.contains(&blocked), "unexpected move error: {e}");
                        assert_eq!(forest, snapshot);
                    }
                }
            }
            Op::Delete { node } if !known.is_empty() => {
                tree::delete_subtree(&mut forest, &pick(&known, node)).unwrap();
            }
            Op::Favorite { node } if !known.is_empty() => {
                tree::toggle_favorite(&mut forest, &pick(&known, node)).unwrap();
            }
            _ => {}
        }
    }
    forest
}

/// The moved node hangs off a root group for `name`, and its whole subtree
/// carries that category.
fn assert_moved_into_category(forest: &[Node], id: &str, name: &str) {
    let found = tree::find(forest, id).unwrap();
    let parent = found.parent.expect("category move leaves the node under a group");
    assert!(parent.is_group());
    assert!(forest.iter().any(|root| root.id == parent.id));
    for sub in tree::flatten(std::slice::from_ref(found.node)) {
        assert_eq!(sub.node.category, name, "{} kept a stale category", sub.node.id);
    }
}

fn assert_dense(nodes: &[Node]) {
    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(node.order as usize, i, "order gap at {}", node.id);
        assert_dense(&node.children);
    }
}

proptest! {
    #[test]
    fn sibling_orders_stay_dense(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let forest = build(&ops);
        assert_dense(&forest);
    }

    #[test]
    fn ids_stay_unique(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let forest = build(&ops);
        let all = ids(&forest);
        let unique: HashSet<&String> = all.iter().collect();
        prop_assert_eq!(all.len(), unique.len());
        prop_assert_eq!(all.len(), tree::count(&forest));
    }

    #[test]
    fn json_export_round_trips(ops in proptest::collection::vec(op_strategy(), 1..30)) {
        let forest = build(&ops);
        prop_assume!(!forest.is_empty());
        let json = export::to_json(&forest).unwrap();
        let back = parse_document(&json).unwrap();
        prop_assert_eq!(back, forest);
    }

    #[test]
    fn pointer_records_round_trip(ops in proptest::collection::vec(op_strategy(), 1..30)) {
        let forest = build(&ops);
        let back = from_pointer(&to_pointer(&forest)).unwrap();
        prop_assert_eq!(back, forest);
    }

    #[test]
    fn moving_into_own_subtree_is_rejected(ops in proptest::collection::vec(op_strategy(), 1..30), pick_at in any::<usize>()) {
        let mut forest = build(&ops);
        let known = ids(&forest);
        prop_assume!(!known.is_empty());
        let id = pick(&known, pick_at);
        let subtree = tree::subtree_ids(tree::find(&forest, &id).unwrap().node);
        let target = subtree.last().unwrap().clone();
        let before = forest.clone();
        let result = tree::move_node(&mut forest, &id, &MoveTarget::Parent(target), &Placement::End);
        prop_assert!(result.is_err());
        prop_assert_eq!(forest, before);
    }
}
