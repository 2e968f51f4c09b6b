use crate::node::Node;
use crate::tags::{color_for_tag, display_tag};
use yansi::Paint;

/// Color palette for consistent theming
pub struct ColorPalette {
    pub primary: (u8, u8, u8),   // IDs, muted text
    pub secondary: (u8, u8, u8), // Headers, emphasis
    pub favorite: (u8, u8, u8),  // Favorite star
    pub highlight: (u8, u8, u8), // Search matches
}

impl ColorPalette {
    pub const DARK: Self = Self {
        primary: (108, 112, 134),   // Gray
        secondary: (148, 226, 213), // Teal
        favorite: (247, 201, 72),   // Amber
        highlight: (243, 139, 168), // Pink
    };

    pub const LIGHT: Self = Self {
        primary: (92, 95, 119),
        secondary: (23, 146, 153),
        favorite: (223, 142, 29),
        highlight: (210, 15, 57),
    };
}

/// Formatting context passed through rendering pipeline
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, palette: ColorPalette::DARK }
    }

    pub fn from_env(dark: bool) -> Self {
        let palette = if dark { ColorPalette::DARK } else { ColorPalette::LIGHT };
        Self { use_color: crate::config::color_enabled(), palette }
    }

    fn rgb(&self, text: &str, (r, g, b): (u8, u8, u8)) -> String {
        if self.use_color {
            Paint::rgb(text, r, g, b).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_id(&self, id: &str) -> String {
        self.rgb(id, self.palette.primary)
    }

    pub fn format_muted(&self, text: &str) -> String {
        self.rgb(text, self.palette.primary)
    }

    pub fn format_header(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.secondary;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_tag(&self, tag: &str) -> String {
        let shown = display_tag(tag);
        if self.use_color {
            let (r, g, b) = color_for_tag(tag);
            Paint::rgb(&shown, r, g, b).bold().to_string()
        } else {
            shown
        }
    }

    pub fn format_tags(&self, tags: &[String]) -> String {
        tags.iter()
            .map(|t| self.format_tag(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `★` for favorites, a blank of the same width otherwise.
    pub fn favorite_mark(&self, node: &Node) -> String {
        if node.favorite {
            self.rgb("★", self.palette.favorite)
        } else {
            " ".to_string()
        }
    }

    /// Paint a node title with its own map color.
    pub fn format_node_title(&self, node: &Node) -> String {
        if !self.use_color {
            return node.title.clone();
        }
        match hex_to_rgb(node.color_hex()) {
            Some((r, g, b)) if node.is_group() => {
                Paint::rgb(&node.title, r, g, b).bold().to_string()
            }
            _ => Paint::new(&node.title).bold().to_string(),
        }
    }

    pub fn highlight_match(&self, text: &str, query: Option<&str>) -> String {
        let Some(q) = query else { return text.to_string() };
        if q.is_empty() || !self.use_color {
            return text.to_string();
        }

        let q_lower = q.to_lowercase();
        let mut out = String::new();
        let mut remaining = text;

        while let Some(pos) = remaining.to_lowercase().find(&q_lower) {
            // Lowercasing can shift byte offsets for some scripts.
            if !remaining.is_char_boundary(pos)
                || !remaining.is_char_boundary((pos + q.len()).min(remaining.len()))
            {
                break;
            }
            let (before, rest) = remaining.split_at(pos);
            let (matched, after) = rest.split_at(q.len().min(rest.len()));
            out.push_str(before);

            let (r, g, b) = self.palette.highlight;
            out.push_str(&Paint::rgb(matched, r, g, b).to_string());

            remaining = after;
        }
        out.push_str(remaining);
        out
    }
}

/// Parse `#rrggbb` (or `#rgb`) into components.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
