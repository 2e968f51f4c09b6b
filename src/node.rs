use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

pub const ID_TS_WIDTH: usize = 9;
pub const DEFAULT_CATEGORY: &str = "Unsorted";

pub const KIND_PROMPT: &str = "prompt";
pub const KIND_GROUP: &str = "group";
pub const KIND_LINK: &str = "link";

/// Symbolic color keys and the hex values they resolve to.
pub const COLOR_KEYS: &[(&str, &str)] = &[
    ("accent", "#66d9ef"),
    ("good", "#9be39b"),
    ("warn", "#f7c948"),
    ("bad", "#ff6b6b"),
];

/// One prompt, group or link in the grove. The canonical shape is the nested
/// forest: a node owns its children and never points back at its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    // Always serialized so exported JSON is detected as a forest on re-import.
    #[serde(default)]
    pub children: Vec<Node>,
}

fn default_kind() -> String {
    KIND_PROMPT.to_string()
}

impl Node {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            prompt: String::new(),
            kind: default_kind(),
            category: String::new(),
            tags: Vec::new(),
            color: String::new(),
            favorite: false,
            order: 0,
            href: None,
            children: Vec::new(),
        }
    }

    pub fn group(id: impl Into<String>, title: impl Into<String>) -> Self {
        let mut node = Self::new(id, title);
        node.kind = KIND_GROUP.to_string();
        node
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = crate::tags::normalize_tags(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn is_group(&self) -> bool {
        self.kind == KIND_GROUP
    }

    pub fn is_link(&self) -> bool {
        self.kind == KIND_LINK
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Stroke color for the map view.
    pub fn color_hex(&self) -> &str {
        resolve_color(&self.color)
    }
}

pub fn resolve_color(color: &str) -> &str {
    if color.starts_with('#') {
        return color;
    }
    COLOR_KEYS
        .iter()
        .find(|(key, _)| *key == color)
        .map(|(_, hex)| *hex)
        .unwrap_or(COLOR_KEYS[0].1)
}

#[derive(Default)]
struct IdState {
    last_ts: i64,
    counter: u32,
}

/// Generate an id that is not in `taken`. Ids are base62 microsecond
/// timestamps; collisions within the same microsecond get a counter suffix.
pub fn generate_id(taken: &HashSet<String>) -> String {
    static ID_STATE: OnceLock<Mutex<IdState>> = OnceLock::new();
    let state = ID_STATE.get_or_init(|| Mutex::new(IdState::default()));

    let mut guard = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    loop {
        let now = Local::now().timestamp_micros();
        let ts = if now <= guard.last_ts { guard.last_ts } else { now };

        if ts == guard.last_ts {
            guard.counter = guard.counter.saturating_add(1);
        } else {
            guard.last_ts = ts;
            guard.counter = 0;
        }

        let ts_enc = encode_base62_width(ts.max(0) as u64, ID_TS_WIDTH);
        let id = if guard.counter == 0 {
            ts_enc
        } else {
            format!("{ts_enc}{}", encode_base62(guard.counter as u64))
        };

        if !taken.contains(&id) {
            return id;
        }
    }
}

fn encode_base62(num: u64) -> String {
    const ALPHABET: &[u8] =
        b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    if num == 0 {
        return "0".to_string();
    }
    let mut n = num;
    let base = ALPHABET.len() as u64;
    let mut out = Vec::new();
    while n > 0 {
        out.push(ALPHABET[(n % base) as usize] as char);
        n /= base;
    }
    out.iter().rev().collect()
}

fn encode_base62_width(num: u64, width: usize) -> String {
    let encoded = encode_base62(num);
    if encoded.len() >= width {
        encoded
    } else {
        format!("{}{}", "0".repeat(width - encoded.len()), encoded)
    }
}
