//! Selector and filter suffixes of resolvable paths
//!
//! A resolvable path is a node path followed by dot-separated tokens, for
//! example `/Subjects/s1.deep.data.dataFilter:modifiedAfter=2024-01-01T00:00:00\.000Z`.
//! Plain tokens select serialization processors; `dataFilter:name=value`
//! tokens narrow the data attached to the resource. Filter values are
//! percent-encoded and their dots escaped as `\.` so that they never split.

use std::fmt;

const FILTER_PREFIX: &str = "dataFilter:";
const OPTION_PREFIXES: [&str; 2] = ["dataOption:", "dataOptions:"];

/// Parsed suffix tokens of a resolvable path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathInfo {
    tokens: Vec<String>,
}

impl PathInfo {
    /// Parses a suffix such as `.deep.-identify`; the leading dot is optional
    pub fn parse(info: &str) -> Self {
        Self {
            tokens: split_unescaped_dots(info)
                .into_iter()
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Path info without selectors or filters
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether there is nothing after the node path
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Raw tokens, still escaped
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Processor selector tokens in order of appearance
    pub fn selectors(&self) -> Vec<String> {
        self.tokens
            .iter()
            .filter(|t| !t.contains(':'))
            .map(|t| t.replace("\\.", "."))
            .collect()
    }

    /// Whether `name` appears among the selectors
    pub fn has_selector(&self, name: &str) -> bool {
        self.selectors().iter().any(|s| s == name)
    }

    /// Decoded `dataFilter:` pairs; names may repeat
    pub fn filters(&self) -> Vec<(String, String)> {
        self.prefixed_pairs(&[FILTER_PREFIX])
    }

    /// Decoded values of one repeatable filter
    pub fn filter_values(&self, name: &str) -> Vec<String> {
        self.filters()
            .into_iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v)
            .collect()
    }

    /// Decoded `dataOption:` pairs
    pub fn options(&self) -> Vec<(String, String)> {
        self.prefixed_pairs(&OPTION_PREFIXES)
    }

    /// Appends a plain selector token
    pub fn push_selector(&mut self, selector: impl Into<String>) {
        let selector = selector.into();
        if !selector.is_empty() {
            self.tokens.push(selector);
        }
    }

    /// Appends every token of a selector string such as `.deep.bare`
    pub fn extend_selectors(&mut self, selectors: &str) {
        self.tokens.extend(Self::parse(selectors).tokens);
    }

    /// Appends a `dataFilter:` token, escaping its value
    pub fn push_filter(&mut self, name: &str, value: &str) {
        self.tokens
            .push(format!("{FILTER_PREFIX}{name}={}", escape_value(value)));
    }

    /// Suffix form, `""` or `.token.token`
    pub fn render(&self) -> String {
        self.tokens.iter().map(|t| format!(".{t}")).collect()
    }

    fn prefixed_pairs(&self, prefixes: &[&str]) -> Vec<(String, String)> {
        self.tokens
            .iter()
            .filter_map(|t| prefixes.iter().find_map(|p| t.strip_prefix(p)))
            .map(|body| match body.split_once('=') {
                Some((name, value)) => (name.to_string(), unescape_value(value)),
                None => (body.to_string(), String::new()),
            })
            .collect()
    }
}

impl fmt::Display for PathInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Splits on dots that are not preceded by a backslash escape
pub fn split_unescaped_dots(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '.' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Percent-encodes a filter value and escapes its dots
pub fn escape_value(value: &str) -> String {
    urlencoding::encode(value).replace('.', "\\.")
}

/// Reverses [`escape_value`]; undecodable input is returned unescaped
pub fn unescape_value(value: &str) -> String {
    let unescaped = value.replace("\\.", ".");
    match urlencoding::decode(&unescaped) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => unescaped,
    }
}

/// Candidate `(path, suffix)` splits of a resolvable path, longest path first
///
/// Node names may themselves contain dots (`scan.pdf`), so resolution tries
/// the whole string first and then cuts at each unescaped dot after the last
/// `/`, right to left.
pub fn candidate_splits(raw: &str) -> Vec<(String, String)> {
    let mut candidates = vec![(raw.to_string(), String::new())];
    let tail_start = raw.rfind('/').map_or(0, |idx| idx + 1);

    let mut cut_points = Vec::new();
    let mut escaped = false;
    for (idx, c) in raw[tail_start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '.' => cut_points.push(tail_start + idx),
            _ => {}
        }
    }

    for idx in cut_points.into_iter().rev() {
        if idx == 0 {
            continue;
        }
        candidates.push((raw[..idx].to_string(), raw[idx..].to_string()));
    }
    candidates
}
