//! Grouped list of prompts as terminal lines.

use crate::config::Preferences;
use crate::filter::{FilterState, group_records};
use crate::formatting::FormatContext;
use crate::node::Node;
use crate::shared::table::{display_len, truncate_with_ellipsis};

/// Render `forest` through `filter`. `width` bounds summary lines.
pub fn render_list(
    forest: &[Node],
    filter: &FilterState,
    prefs: &Preferences,
    ctx: &FormatContext,
    width: usize,
) -> Vec<String> {
    if forest.is_empty() {
        return vec!["No prompts yet. Try `grove add <title> --prompt <text>`.".to_string()];
    }
    let groups = group_records(forest, filter);
    if groups.is_empty() {
        return vec!["No prompts match the current filters.".to_string()];
    }

    let query = Some(filter.search.trim()).filter(|q| !q.is_empty());
    let mut lines = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 && !prefs.compact {
            lines.push(String::new());
        }
        lines.push(format!(
            "{} {}",
            ctx.format_header(&group.name),
            ctx.format_muted(&format!("({})", group.items.len()))
        ));
        for record in &group.items {
            let node = record.node;
            let mut line = format!(
                "  {} {} {}",
                ctx.favorite_mark(node),
                ctx.format_id(&node.id),
                ctx.highlight_match(&node.title, query)
            );
            if node.is_link() {
                line.push_str(&format!(" {}", ctx.format_muted("↗")));
            }
            if !record.tags.is_empty() {
                line.push(' ');
                line.push_str(&ctx.format_tags(record.tags));
            }
            lines.push(line);

            if prefs.show_summaries && !prefs.compact && !node.summary.is_empty() {
                let indent = "      ";
                let room = width.saturating_sub(display_len(indent)).max(10);
                let summary = truncate_with_ellipsis(&node.summary, room);
                lines.push(format!(
                    "{indent}{}",
                    ctx.format_muted(&ctx.highlight_match(&summary, query))
                ));
            }
        }
    }
    lines
}
