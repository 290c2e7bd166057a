//! Extraction of `[[Note Name]]` / `[[Note Name|Alias]]` cross-references.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// Name excludes `]` and `|`; anything after `|` up to `]]` is an alias
static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").expect("valid wikilink regex"));

/// Distinct note names referenced by `text`, alias dropped and whitespace trimmed
pub fn extract_links(text: &str) -> BTreeSet<String> {
    WIKILINK_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Union of [`extract_links`] over several texts
pub fn extract_links_from_all<'a, I>(texts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    texts.into_iter().flat_map(extract_links).collect()
}
