//! Text serializations of the collection: JSON, parent-pointer JSON,
//! Markdown and OPML 2.0.

use crate::filter::{FilterState, group_records};
use crate::node::Node;
use crate::pointer::{PointerDocument, to_pointer};
use crate::tags::display_tag;
use chrono::{DateTime, FixedOffset};
use std::fmt::Write as _;
use std::str::FromStr;

pub const DOCUMENT_TITLE: &str = "Prompt Grove";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Pointer,
    Markdown,
    Opml,
}

impl Format {
    pub fn file_name(self) -> &'static str {
        match self {
            Format::Json => "prompt_grove.json",
            Format::Pointer => "prompt_grove.nodes.json",
            Format::Markdown => "prompt_grove.md",
            Format::Opml => "prompt_grove.opml",
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "pointer" | "nodes" => Ok(Format::Pointer),
            "md" | "markdown" => Ok(Format::Markdown),
            "opml" | "xml" => Ok(Format::Opml),
            other => Err(format!(
                "Unknown export format: {other} (expected json|pointer|md|opml)"
            )),
        }
    }
}

pub fn export(
    forest: &[Node],
    format: Format,
    generated: DateTime<FixedOffset>,
) -> Result<String, serde_json::Error> {
    match format {
        Format::Json => to_json(forest),
        Format::Pointer => to_pointer_json(forest),
        Format::Markdown => Ok(to_markdown(forest)),
        Format::Opml => Ok(to_opml(forest, generated)),
    }
}

/// Pretty canonical forest; re-importable as-is.
pub fn to_json(forest: &[Node]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(forest)
}

pub fn to_pointer_json(forest: &[Node]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&PointerDocument {
        nodes: to_pointer(forest),
    })
}

/// A backtick fence longer than any backtick run inside `body`.
fn fence_for(body: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for ch in body.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

pub fn to_markdown(forest: &[Node]) -> String {
    let mut out = format!("# {DOCUMENT_TITLE}\n");
    for group in group_records(forest, &FilterState::default()) {
        let _ = write!(out, "\n## {}\n", group.name);
        for record in group.items {
            let node = record.node;
            let _ = write!(out, "\n### {}\n", node.title);
            if !node.summary.is_empty() {
                let _ = write!(out, "\n{}\n", node.summary);
            }
            if !record.tags.is_empty() {
                let tags: Vec<String> = record.tags.iter().map(|t| display_tag(t)).collect();
                let _ = write!(out, "\nTags: {}\n", tags.join(" "));
            }
            if let Some(href) = node.href.as_deref().filter(|h| !h.is_empty()) {
                let _ = write!(out, "\nLink: <{href}>\n");
            }
            if !node.prompt.is_empty() {
                let fence = fence_for(&node.prompt);
                let _ = write!(
                    out,
                    "\n{fence}\n{}\n{fence}\n",
                    node.prompt.trim_end_matches('\n')
                );
            }
        }
    }
    out
}

/// Escape text for an XML attribute value. Newlines survive as `&#10;`.
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

/// OPML 2.0: one outline per category holding one outline per item, with
/// the prompt as a child outline.
pub fn to_opml(forest: &[Node], generated: DateTime<FixedOffset>) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<opml version=\"2.0\">\n");
    out.push_str("  <head>\n");
    let _ = writeln!(out, "    <title>{}</title>", escape_xml(DOCUMENT_TITLE));
    let _ = writeln!(out, "    <dateCreated>{}</dateCreated>", generated.to_rfc2822());
    out.push_str("  </head>\n");
    out.push_str("  <body>\n");
    for group in group_records(forest, &FilterState::default()) {
        let _ = writeln!(out, "    <outline text=\"{}\">", escape_xml(&group.name));
        for record in group.items {
            let node = record.node;
            let mut attrs = format!(
                "text=\"{}\" type=\"{}\"",
                escape_xml(&node.title),
                escape_xml(&node.kind)
            );
            if !node.summary.is_empty() {
                let _ = write!(attrs, " _note=\"{}\"", escape_xml(&node.summary));
            }
            if !record.tags.is_empty() {
                let _ = write!(attrs, " category=\"{}\"", escape_xml(&record.tags.join(",")));
            }
            if let Some(href) = node.href.as_deref().filter(|h| !h.is_empty()) {
                let _ = write!(attrs, " url=\"{}\"", escape_xml(href));
            }
            if node.prompt.is_empty() {
                let _ = writeln!(out, "      <outline {attrs}/>");
            } else {
                let _ = writeln!(out, "      <outline {attrs}>");
                let _ = writeln!(out, "        <outline text=\"{}\"/>", escape_xml(&node.prompt));
                out.push_str("      </outline>\n");
            }
        }
        out.push_str("    </outline>\n");
    }
    out.push_str("  </body>\n");
    out.push_str("</opml>\n");
    out
}
