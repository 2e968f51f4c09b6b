use std::collections::HashSet;

/// Normalize a tag to its stored form: trimmed, without the leading `#`.
pub fn normalize_tag(t: &str) -> String {
    t.trim().trim_start_matches('#').trim().to_string()
}

/// Normalize and deduplicate tags, keeping first-seen order.
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| normalize_tag(&t))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Split a comma separated tag field, as typed into an editor.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(',').map(str::to_string))
}

/// True when `have` contains every tag in `required`.
pub fn has_all_tags(have: &[String], required: &[String]) -> bool {
    required.iter().all(|t| have.contains(t))
}

pub fn display_tag(tag: &str) -> String {
    format!("#{tag}")
}

/// Hash a tag for deterministic color selection
pub fn hash_tag(tag: &str) -> u64 {
    let mut h: u64 = 5381;
    for b in tag.bytes() {
        h = (h.wrapping_shl(5)).wrapping_add(h) ^ u64::from(b);
    }
    h
}

pub fn color_for_tag(tag: &str) -> (u8, u8, u8) {
    const PALETTE: &[(u8, u8, u8)] = &[
        (102, 217, 239),
        (155, 227, 155),
        (247, 201, 72),
        (255, 107, 107),
        (198, 160, 246),
        (148, 226, 213),
        (245, 194, 231),
        (255, 214, 165),
        (137, 180, 250),
        (211, 228, 205),
    ];
    PALETTE[(hash_tag(tag) as usize) % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_hash_and_whitespace() {
        assert_eq!(normalize_tag("  #infra "), "infra");
        assert_eq!(normalize_tag("urgent"), "urgent");
        assert_eq!(normalize_tag(" # "), "");
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        let tags = vec![
            "b".to_string(),
            "#a".to_string(),
            "b".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_tags(tags), vec!["b", "a"]);
    }

    #[test]
    fn parse_comma_list() {
        assert_eq!(parse_tag_list("x, #y,,x"), vec!["x", "y"]);
    }

    #[test]
    fn superset_check() {
        let have = vec!["infra".to_string(), "urgent".to_string()];
        assert!(has_all_tags(&have, &[]));
        assert!(has_all_tags(&have, &["urgent".to_string()]));
        assert!(!has_all_tags(&have, &["missing".to_string()]));
    }

    #[test]
    fn tag_colors_are_stable() {
        assert_eq!(color_for_tag("todo"), color_for_tag("todo"));
        assert_ne!(hash_tag("todo"), hash_tag("work"));
    }
}
