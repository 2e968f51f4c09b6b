//! Indented hierarchy with collapse glyphs, honoring the map's collapsed set.

use crate::formatting::FormatContext;
use crate::layout::CollapsedSet;
use crate::node::Node;

pub const EXPANDED: &str = "▾";
pub const COLLAPSED: &str = "▸";
pub const LEAF: &str = "•";

pub fn render_tree(forest: &[Node], collapsed: &CollapsedSet, ctx: &FormatContext) -> Vec<String> {
    fn walk(
        nodes: &[Node],
        depth: usize,
        collapsed: &CollapsedSet,
        ctx: &FormatContext,
        out: &mut Vec<String>,
    ) {
        for node in nodes {
            let folded = collapsed.contains(&node.id);
            let glyph = match (node.has_children(), folded) {
                (false, _) => LEAF,
                (true, true) => COLLAPSED,
                (true, false) => EXPANDED,
            };
            let mut line = format!(
                "{}{} {} {}",
                "  ".repeat(depth),
                glyph,
                ctx.format_node_title(node),
                ctx.format_id(&format!("[{}]", node.id))
            );
            if node.favorite {
                line.push(' ');
                line.push_str(&ctx.favorite_mark(node));
            }
            if !node.tags.is_empty() {
                line.push(' ');
                line.push_str(&ctx.format_tags(&node.tags));
            }
            if folded && node.has_children() {
                line.push_str(&ctx.format_muted(&format!(" (+{})", crate::tree::count(&node.children))));
            }
            out.push(line);
            if !folded {
                walk(&node.children, depth + 1, collapsed, ctx, out);
            }
        }
    }

    if forest.is_empty() {
        return vec!["(empty)".to_string()];
    }
    let mut out = Vec::new();
    walk(forest, 0, collapsed, ctx, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::insert;

    #[test]
    fn collapsed_nodes_hide_children() {
        let mut forest = Vec::new();
        insert(&mut forest, Node::group("g", "G"), None).unwrap();
        insert(&mut forest, Node::group("s", "Sub"), Some("g")).unwrap();
        insert(&mut forest, Node::new("x", "X").with_tags(["t"]), Some("s")).unwrap();
        let ctx = FormatContext::new(false);

        let lines = render_tree(&forest, &CollapsedSet::default(), &ctx);
        assert_eq!(lines, vec!["▾ G [g]", "  ▾ Sub [s]", "    • X [x] #t"]);

        let mut collapsed = CollapsedSet::default();
        collapsed.toggle("s");
        let lines = render_tree(&forest, &collapsed, &ctx);
        assert_eq!(lines, vec!["▾ G [g]", "  ▸ Sub [s] (+1)"]);
    }
}
