//! Map view geometry: tree layout, collapse state, viewport and tap actions.
//!
//! Layout is a pure function of the forest and the collapsed set. Each root
//! is laid out on its own band, children run to the right of their parent and
//! a parent is centered on the vertical extent of its visible subtree.

use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const NODE_W: f64 = 240.0;
pub const NODE_H: f64 = 56.0;
pub const X_GAP: f64 = 72.0;
pub const Y_GAP: f64 = 12.0;
pub const ROOT_GAP: f64 = 80.0;
pub const ORIGIN_X: f64 = 40.0;
pub const ORIGIN_Y: f64 = 80.0;
pub const RADIUS: f64 = 10.0;

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 4.0;
pub const WHEEL_BASE: f64 = 1.0015;
pub const ZOOM_STEP: f64 = 1.15;

/// Ids of nodes whose children are hidden in the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapsedSet(BTreeSet<String>);

impl CollapsedSet {
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Flip one node; returns true when it is now collapsed.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.to_string());
            true
        }
    }

    pub fn expand_all(&mut self) {
        self.0.clear();
    }

    pub fn collapse_all(&mut self, forest: &[Node]) {
        self.0 = crate::tree::flatten(forest)
            .map(|r| r.node.id.clone())
            .collect();
    }

    /// Drop ids that no longer exist in the forest.
    pub fn retain_existing(&mut self, forest: &[Node]) {
        let ids = crate::tree::all_ids(forest);
        self.0.retain(|id| ids.contains(id));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One placed node. `children` holds only visible children.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOut<'a> {
    pub node: &'a Node,
    pub x: f64,
    pub y: f64,
    pub depth: usize,
    pub collapsed: bool,
    pub children: Vec<LaidOut<'a>>,
}

impl LaidOut<'_> {
    pub fn center_y(&self) -> f64 {
        self.y + NODE_H / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + NODE_W
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLayout<'a> {
    pub roots: Vec<LaidOut<'a>>,
    pub width: f64,
    pub height: f64,
}

impl<'a> MapLayout<'a> {
    /// Every placed node, pre-order.
    pub fn boxes(&self) -> Vec<&LaidOut<'a>> {
        fn walk<'r, 'n>(items: &'r [LaidOut<'n>], out: &mut Vec<&'r LaidOut<'n>>) {
            for item in items {
                out.push(item);
                walk(&item.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }
}

fn lay_out_group<'a>(
    nodes: &'a [Node],
    x: f64,
    y0: f64,
    depth: usize,
    collapsed: &CollapsedSet,
    max_right: &mut f64,
) -> (f64, Vec<LaidOut<'a>>) {
    let mut y = y0;
    let mut boxes = Vec::with_capacity(nodes.len());
    for node in nodes {
        let is_collapsed = collapsed.contains(&node.id);
        let (child_height, children) = if node.has_children() && !is_collapsed {
            lay_out_group(&node.children, x + NODE_W + X_GAP, y, depth + 1, collapsed, max_right)
        } else {
            (NODE_H, Vec::new())
        };
        let h = NODE_H.max(child_height);
        *max_right = max_right.max(x + NODE_W);
        boxes.push(LaidOut {
            node,
            x,
            y: y + h / 2.0 - NODE_H / 2.0,
            depth,
            collapsed: is_collapsed && node.has_children(),
            children,
        });
        y += h + Y_GAP;
    }
    ((y - y0) - Y_GAP, boxes)
}

/// Place every visible node. Roots stack top to bottom with `ROOT_GAP`
/// between their bands.
pub fn layout<'a>(forest: &'a [Node], collapsed: &CollapsedSet) -> MapLayout<'a> {
    let mut cursor = ORIGIN_Y;
    let mut roots = Vec::with_capacity(forest.len());
    let mut max_right = ORIGIN_X;
    for root in forest {
        let (height, mut boxes) = lay_out_group(
            std::slice::from_ref(root),
            ORIGIN_X,
            cursor,
            0,
            collapsed,
            &mut max_right,
        );
        roots.append(&mut boxes);
        cursor += height + ROOT_GAP;
    }
    let height = if forest.is_empty() { 0.0 } else { cursor - ROOT_GAP + ORIGIN_Y };
    MapLayout {
        roots,
        width: max_right + ORIGIN_X,
        height,
    }
}

/// Pan/zoom transform applied to the whole drawing: translate, then scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub tx: f64,
    pub ty: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { tx: 0.0, ty: 0.0, scale: 1.0 }
    }
}

impl Viewport {
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.tx += dx;
        self.ty += dy;
    }

    /// Mouse-wheel zoom; positive `delta_y` zooms out.
    pub fn wheel(&mut self, delta_y: f64) {
        self.set_scale(self.scale * WHEEL_BASE.powf(-delta_y));
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / ZOOM_STEP);
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = if scale.is_finite() {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            1.0
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn transform(&self) -> String {
        format!("translate({},{}) scale({})", self.tx, self.ty, self.scale)
    }
}

/// The one-shot intro: start zoomed in slightly and settle to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowAnimation {
    pub from_scale: f64,
    pub duration_ms: f64,
    pub offset_x: f64,
}

impl Default for GrowAnimation {
    fn default() -> Self {
        Self {
            from_scale: 1.18,
            duration_ms: 850.0,
            offset_x: 20.0,
        }
    }
}

impl GrowAnimation {
    pub fn scale_at(&self, elapsed_ms: f64) -> f64 {
        let k = (elapsed_ms / self.duration_ms).clamp(0.0, 1.0);
        self.from_scale - (self.from_scale - 1.0) * ease_out_cubic(k)
    }
}

pub fn ease_out_cubic(x: f64) -> f64 {
    1.0 - (1.0 - x).powi(3)
}

/// What tapping a node in the map does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAction {
    Toggle(String),
    Open(String),
    Copy(String),
    Info(&'static str),
}

pub fn tap(node: &Node) -> NodeAction {
    if node.has_children() {
        return NodeAction::Toggle(node.id.clone());
    }
    if node.is_link() {
        if let Some(href) = node.href.as_ref().filter(|h| !h.is_empty()) {
            return NodeAction::Open(href.clone());
        }
    }
    if !node.prompt.is_empty() {
        return NodeAction::Copy(node.prompt.clone());
    }
    if node.is_group() {
        NodeAction::Info("empty group")
    } else {
        NodeAction::Info("nothing to copy")
    }
}
