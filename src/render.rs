use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use yansi::Paint;

/// Styling categories used when coloring a prompt body.
#[derive(Clone, Copy)]
enum Style {
    Heading,
    Bullet,
    Rule,
    Code,
    Link,
    Body,
}

/// Render a markdown prompt body for the terminal. With `use_color` false the
/// markup is still normalized but no escape codes are emitted.
pub fn render_markdown(input: &str, use_color: bool) -> String {
    let mut rendered = String::new();
    let mut list_depth: usize = 0;
    let mut in_code_block = false;

    for event in Parser::new(input) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                rendered.push('\n');
                let mark = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    HeadingLevel::H4 => "#### ",
                    HeadingLevel::H5 => "##### ",
                    _ => "###### ",
                };
                push_styled(&mut rendered, mark, Style::Heading, use_color);
            }
            Event::End(TagEnd::Heading(_)) => rendered.push('\n'),
            Event::End(TagEnd::Paragraph) => rendered.push_str("\n\n"),
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                rendered.push('\n');
            }
            Event::Start(Tag::Item) => {
                rendered.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                push_styled(&mut rendered, "- ", Style::Bullet, use_color);
            }
            Event::End(TagEnd::Item) => {
                if !rendered.ends_with('\n') {
                    rendered.push('\n');
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                push_styled(&mut rendered, &format!("```{lang}\n"), Style::Rule, use_color);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                push_styled(&mut rendered, "```\n\n", Style::Rule, use_color);
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                push_styled(&mut rendered, &format!("<{dest_url}> "), Style::Link, use_color);
            }
            Event::Text(t) => {
                let style = if in_code_block { Style::Code } else { Style::Body };
                push_styled(&mut rendered, &t, style, use_color);
            }
            Event::Code(t) => push_styled(&mut rendered, &format!("`{t}`"), Style::Code, use_color),
            Event::SoftBreak | Event::HardBreak => rendered.push('\n'),
            Event::Rule => push_styled(&mut rendered, "---\n\n", Style::Rule, use_color),
            Event::Html(t) | Event::InlineHtml(t) => rendered.push_str(&t),
            _ => {}
        }
    }

    rendered.trim().to_string()
}

fn push_styled(buf: &mut String, text: &str, style: Style, use_color: bool) {
    if use_color {
        let painted = match style {
            Style::Heading => Paint::cyan(text).bold(),
            Style::Bullet => Paint::yellow(text).bold(),
            Style::Rule => Paint::new(text).dim(),
            Style::Code => Paint::blue(text),
            Style::Link => Paint::magenta(text).underline(),
            Style::Body => Paint::new(text),
        };
        buf.push_str(&painted.to_string());
    } else {
        buf.push_str(text);
    }
}
