use crate::{paginate_and_print, terminal_columns};
use std::error::Error;

mod content;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Command,
    Environment,
    Guide,
}

impl Section {
    /// Overview order.
    const ALL: [Section; 3] = [Section::Command, Section::Environment, Section::Guide];

    fn label(self) -> &'static str {
        match self {
            Section::Command => "Commands",
            Section::Environment => "Environment",
            Section::Guide => "Guides",
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct HelpFlag<'a> {
    pub name: &'a str,
    pub desc: &'a str,
}

#[derive(Clone, Copy)]
pub(crate) struct HelpTopic<'a> {
    pub name: &'a str,
    pub summary: &'a str,
    pub usage: &'a str,
    pub details: &'a [&'a str],
    pub flags: &'a [HelpFlag<'a>],
    pub aliases: &'a [&'a str],
    pub section: Section,
    pub examples: &'a [&'a str],
}

impl HelpTopic<'_> {
    /// Left column in the overview: guides go by name, the rest by usage.
    fn overview_label(&self) -> &str {
        match self.section {
            Section::Guide => self.name,
            _ => self.usage,
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct HelpBook<'a> {
    pub title: &'a str,
    pub usage: &'a str,
    pub topics: &'a [HelpTopic<'a>],
    pub footer: &'a [&'a str],
}

impl<'a> HelpBook<'a> {
    fn find(&self, name: &str) -> Option<&HelpTopic<'a>> {
        self.topics.iter().find(|topic| {
            topic.name.eq_ignore_ascii_case(name)
                || topic.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        })
    }

    /// Topic names starting with `prefix`, for "did you mean" hints.
    fn suggest(&self, prefix: &str) -> Vec<&'a str> {
        let prefix = prefix.to_ascii_lowercase();
        self.topics
            .iter()
            .filter(|t| !prefix.is_empty() && t.name.starts_with(&prefix))
            .map(|t| t.name)
            .collect()
    }
}

pub(crate) fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let book = content::book();
    let width = terminal_columns().unwrap_or(96).clamp(64, 120);

    let lines = match args.first().map(String::as_str) {
        None => overview(&book, width),
        Some(name) => match book.find(name) {
            Some(topic) => topic_page(&book, topic, width),
            None => {
                let prefix: String = name.chars().take(3).collect();
                let hints = book.suggest(&prefix);
                if hints.is_empty() {
                    eprintln!("Unknown help topic: {name}");
                } else {
                    eprintln!("Unknown help topic: {name} (did you mean {}?)", hints.join(", "));
                }
                overview(&book, width)
            }
        },
    };

    paginate_and_print(&lines)?;
    Ok(())
}

fn overview(book: &HelpBook<'_>, width: usize) -> Vec<String> {
    let mut page = Page::new(width);
    page.line(book.title);
    page.line(&format!("usage: {}", book.usage));
    page.blank();
    for section in Section::ALL {
        let rows: Vec<(&str, &str)> = book
            .topics
            .iter()
            .filter(|t| t.section == section)
            .map(|t| (t.overview_label(), t.summary))
            .collect();
        page.columns(section.label(), &rows);
    }
    for line in book.footer {
        page.paragraph(line, "");
    }
    page.lines
}

fn topic_page(book: &HelpBook<'_>, topic: &HelpTopic<'_>, width: usize) -> Vec<String> {
    let mut page = Page::new(width);
    page.paragraph(&format!("{}: {}", topic.name, topic.summary), "");
    page.line(&format!("usage: {}", topic.usage));
    if !topic.aliases.is_empty() {
        page.line(&format!("aliases: {}", topic.aliases.join(", ")));
    }
    page.blank();

    for detail in topic.details {
        page.paragraph(detail, "");
    }
    if !topic.details.is_empty() {
        page.blank();
    }

    let flags: Vec<(&str, &str)> = topic.flags.iter().map(|f| (f.name, f.desc)).collect();
    page.columns("Options", &flags);

    if !topic.examples.is_empty() {
        page.line("Examples:");
        for example in topic.examples {
            page.paragraph(example, "  ");
        }
        page.blank();
    }

    for line in book.footer {
        page.paragraph(line, "");
    }
    page.lines
}

/// Accumulates wrapped output lines for one help screen.
struct Page {
    width: usize,
    lines: Vec<String>,
}

impl Page {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }

    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn paragraph(&mut self, text: &str, indent: &str) {
        let room = self.width.saturating_sub(indent.chars().count());
        for l in wrap(text, room) {
            self.lines.push(format!("{indent}{l}"));
        }
    }

    /// Two-column block under `title:`. The label column is capped so the
    /// description always keeps at least half the width.
    fn columns(&mut self, title: &str, rows: &[(&str, &str)]) {
        if rows.is_empty() {
            return;
        }
        let min_desc = self.width / 2;
        let widest = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let label_width = widest.min(38).min(self.width.saturating_sub(min_desc + 4));
        let desc_width = self.width.saturating_sub(label_width + 4).max(min_desc);

        self.lines.push(format!("{title}:"));
        for (label, desc) in rows {
            let left = wrap(label, label_width);
            let right = wrap(desc, desc_width);
            for i in 0..left.len().max(right.len()) {
                let l = left.get(i).map(String::as_str).unwrap_or("");
                let d = right.get(i).map(String::as_str).unwrap_or("");
                let line = format!("  {l:label_width$}  {d}");
                self.lines.push(line.trim_end().to_string());
            }
        }
        self.blank();
    }
}

/// Greedy word wrap by character count. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut line = String::new();
    let mut len = 0;
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if len > 0 {
                out.push(std::mem::take(&mut line));
                len = 0;
            }
            out.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }
        if len > 0 && len + 1 + word.len() > width {
            out.push(std::mem::take(&mut line));
            len = 0;
        }
        if len > 0 {
            line.push(' ');
            len += 1;
        }
        len += word.len();
        line.extend(word);
    }
    if !line.is_empty() || out.is_empty() {
        out.push(line);
    }
    out
}
