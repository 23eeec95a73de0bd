//! Query sanitization: plain-text search only.

/// Longest query sent to a provider, in characters.
pub const MAX_QUERY_CHARS: usize = 200;

/// Provider operators that would widen or redirect a plain-text search.
const OPERATORS: [&str; 6] = ["site:", "filetype:", "intitle:", "inurl:", "inbody:", "ext:"];

/// Strips markup and quoting characters, bang shortcuts (`!w`), search operators and
/// leading `+`/`-` word modifiers, collapses whitespace and truncates to
/// `MAX_QUERY_CHARS`. An empty result means the query is unusable.
pub fn sanitize_query(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | ';' | '`'))
        .collect();

    let words: Vec<&str> = stripped
        .split_whitespace()
        .filter_map(|word| {
            let word = word.trim_start_matches(['+', '-']);
            if word.is_empty() || word.starts_with('!') {
                return None;
            }
            let lower = word.to_ascii_lowercase();
            if OPERATORS.iter().any(|op| lower.starts_with(op)) {
                return None;
            }
            Some(word)
        })
        .collect();

    let joined = words.join(" ");
    if joined.chars().count() <= MAX_QUERY_CHARS {
        return joined;
    }
    let truncated: String = joined.chars().take(MAX_QUERY_CHARS).collect();
    truncated.trim_end().to_string()
}

/// Cache key for a sanitized query.
pub fn cache_key(sanitized: &str) -> String {
    sanitized.to_lowercase()
}
