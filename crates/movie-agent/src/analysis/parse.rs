//! Best-effort parsing of free-text model answers.
//!
//! Model answers are prose; these matchers accept the common shapes and report every
//! line they could not use instead of failing the whole answer.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::result::CastMember;

/// A line of a cast answer that matched no pair pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line_no}: {reason}: {line:?}")]
pub struct ParseError {
    /// 1-based line number in the answer.
    pub line_no: usize,
    pub line: String,
    pub reason: String,
}

/// Pairs found in a cast answer plus the lines that did not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastParse {
    pub cast: Vec<CastMember>,
    pub failures: Vec<ParseError>,
}

impl CastParse {
    /// Distinct actors in first-seen order (case-insensitive).
    pub fn actors(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.cast
            .iter()
            .filter(|m| seen.insert(m.actor.to_lowercase()))
            .map(|m| m.actor.clone())
            .collect()
    }
}

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•+]|\d{1,3}[.)])\s+").expect("list marker regex"));
static LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^character\s*:\s*(.+?)\s*[,;]\s*actor\s*:\s*(.+)$").expect("labelled pair regex")
});
static ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*(?:->|=>|→)\s*(.+)$").expect("arrow regex"));
static PLAYED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s*\(\s*(?:played|portrayed)\s+by\s+(.+?)\s*\)\.?$").expect("played-by regex")
});
static PIPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+?)\s*\|\s*(.+)$").expect("pipe regex"));
static COLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+?)\s*:\s+(.+)$").expect("colon regex"));
static AS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+?)\s+as\s+(.+)$").expect("as regex"));
static DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+?)\s+[-–—]\s+(.+)$").expect("dash regex"));
static TRAILING_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:[(\[][^)\]]*\b(?:19|20)\d{2}\b[^)\]]*[)\]]|[,–-]\s*(?:19|20)\d{2})\s*$")
        .expect("trailing year regex")
});
static LEADING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:19|20)\d{2}\s*[:–-]\s+").expect("leading year regex"));

/// Removes a list marker, markdown emphasis and code ticks.
fn strip_markup(line: &str) -> String {
    let line = LIST_MARKER.replace(line, "");
    line.replace("**", "").replace("__", "").replace('`', "").trim().to_string()
}

fn clean_name(s: &str) -> String {
    s.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '*' | '_' | '|'))
        .trim_end_matches(['.', ',', ';'])
        .trim()
        .to_string()
}

/// A person name: capitalized, a handful of words, no sentence punctuation.
fn looks_like_name(s: &str) -> bool {
    let words = s.split_whitespace().count();
    s.chars().next().is_some_and(|c| c.is_uppercase())
        && (1..=5).contains(&words)
        && !s.contains(['?', '!', ':'])
}

fn is_heading(line: &str) -> bool {
    line.starts_with('#') || line.ends_with(':')
}

static TABLE_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-{2,}:?$").expect("table rule regex"));

/// Cells of a markdown table row (`| a | b |`), or `None` for any other line.
fn table_cells(line: &str) -> Option<Vec<String>> {
    let inner = line.strip_prefix('|')?;
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    Some(inner.split('|').map(clean_name).collect())
}

/// Column positions of (character, actor) in a markdown table.
#[derive(Clone, Copy)]
struct TableColumns {
    character: usize,
    actor: usize,
}

impl Default for TableColumns {
    fn default() -> Self {
        Self { character: 0, actor: 1 }
    }
}

impl TableColumns {
    /// Reads the column order from a header row; `None` if the row is not a header.
    fn from_header(cells: &[String]) -> Option<Self> {
        let find = |names: &[&str]| {
            cells
                .iter()
                .position(|c| names.contains(&c.to_lowercase().as_str()))
        };
        let actor = find(&["actor", "actress", "actor/actress", "cast", "played by", "performer"])?;
        let character = find(&["character", "role", "character name", "part"])
            .unwrap_or(if actor == 0 { 1 } else { 0 });
        Some(Self { character, actor })
    }

    fn pair(self, cells: &[String]) -> Option<(String, String)> {
        let character = cells.get(self.character)?.clone();
        let actor = cells.get(self.actor)?.clone();
        Some((character, actor))
    }
}

fn capture_pair(re: &Regex, line: &str, actor_first: bool) -> Option<(String, String)> {
    let c = re.captures(line)?;
    let (a, b) = (clean_name(&c[1]), clean_name(&c[2]));
    Some(if actor_first { (b, a) } else { (a, b) })
}

/// Tries each pair shape in order; returns (character, actor).
fn match_pair(line: &str) -> Option<(String, String)> {
    capture_pair(&LABELLED, line, false)
        .or_else(|| capture_pair(&ARROW, line, false))
        .or_else(|| capture_pair(&PLAYED_BY, line, false))
        .or_else(|| capture_pair(&PIPE, line, false))
        .or_else(|| capture_pair(&COLON, line, false))
        .or_else(|| capture_pair(&AS, line, true))
        .or_else(|| capture_pair(&DASH, line, false))
}

/// Parses `Character -> Actor` style lines.
///
/// Accepted shapes: `A -> B`, `A => B`, `A: B`, `A - B`, `A | B`, `B as A`,
/// `A (played by B)`, `Character: A, Actor: B`, each optionally behind a list marker
/// or wrapped in markdown emphasis. Markdown tables are read row by row; the header
/// row picks the character and actor columns and rule rows are skipped. Blank lines and headings (`# ...`, `...:`) are
/// skipped; every other unmatched line becomes a `ParseError`. Duplicate pairs are
/// dropped.
pub fn parse_cast(answer: &str) -> CastParse {
    let mut out = CastParse::default();
    let mut seen = HashSet::new();
    let mut columns = TableColumns::default();
    for (i, raw) in answer.lines().enumerate() {
        let line = strip_markup(raw);
        if line.is_empty() || is_heading(&line) {
            continue;
        }
        let fail = |reason: &str| ParseError {
            line_no: i + 1,
            line: raw.trim().to_string(),
            reason: reason.to_string(),
        };
        let pair = match table_cells(&line) {
            Some(cells) if cells.iter().all(|c| c.is_empty() || TABLE_RULE.is_match(c)) => continue,
            Some(cells) => match TableColumns::from_header(&cells) {
                Some(header) => {
                    columns = header;
                    continue;
                }
                None => columns.pair(&cells),
            },
            None => match_pair(&line),
        };
        match pair {
            Some((character, actor)) if !character.is_empty() && looks_like_name(&actor) => {
                if seen.insert((character.to_lowercase(), actor.to_lowercase())) {
                    out.cast.push(CastMember { character, actor });
                }
            }
            Some(_) => out.failures.push(fail("actor does not look like a name")),
            None => out.failures.push(fail("no character/actor pair found")),
        }
    }
    out
}

/// Removes markup, quotes, release years and trailing descriptions from a film item.
fn clean_title(item: &str) -> String {
    let mut t = strip_markup(item);
    for sep in [" - ", " – ", " — "] {
        if let Some(idx) = t.find(sep) {
            let head = t[..idx].to_string();
            // Keep "2019 - Title" for the leading-year rule below.
            if !LEADING_YEAR.is_match(&format!("{} ", t[..idx + sep.len()].trim_end())) {
                t = head;
            }
        }
    }
    let t = LEADING_YEAR.replace(&t, "").to_string();
    let t = TRAILING_YEAR.replace(&t, "").to_string();
    clean_name(&t)
        .trim_matches(|c: char| matches!(c, '*' | '_' | '"' | '“' | '”'))
        .trim()
        .to_string()
}

/// Candidate items of a one-line comma list, e.g. `Recent films: A, B, and C.`
fn comma_items(line: &str) -> Option<Vec<String>> {
    let segment = match line.rfind(':') {
        Some(idx) => &line[idx + 1..],
        None if line.ends_with(['.', '!', '?']) => return None,
        None => line,
    };
    let items: Vec<String> = segment
        .split(',')
        .map(|s| {
            let s = s.trim();
            s.strip_prefix("and ").unwrap_or(s).to_string()
        })
        .filter(|s| !s.is_empty())
        .collect();
    (items.len() >= 2).then_some(items)
}

/// Parses a filmography answer into at most `max` distinct titles, in answer order.
///
/// List items (bullets or numbering) win; without any, the first line holding a
/// comma-separated list is used. Prose without either yields no titles.
pub fn parse_films(answer: &str, max: usize) -> Vec<String> {
    let items: Vec<String> = answer
        .lines()
        .filter(|l| LIST_MARKER.is_match(l))
        .map(str::to_string)
        .collect();
    let items = if items.is_empty() {
        answer
            .lines()
            .map(strip_markup)
            .find_map(|l| comma_items(&l))
            .unwrap_or_default()
    } else {
        items
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .map(|item| clean_title(item))
        .filter(|t| !t.is_empty() && !t.ends_with(':'))
        .filter(|t| seen.insert(t.to_lowercase()))
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(p: &CastParse) -> Vec<(&str, &str)> {
        p.cast.iter().map(|m| (m.character.as_str(), m.actor.as_str())).collect()
    }

    #[test]
    fn arrow_lines() {
        let p = parse_cast("Bruce Wayne -> Christian Bale\nJoker -> Heath Ledger\n");
        assert_eq!(pairs(&p), vec![("Bruce Wayne", "Christian Bale"), ("Joker", "Heath Ledger")]);
        assert!(p.failures.is_empty());
    }

    #[test]
    fn mixed_shapes_with_markup() {
        let answer = "\
Here are the lead characters of The Dark Knight:

1. **Bruce Wayne / Batman**: Christian Bale
- Heath Ledger as the Joker
* Harvey Dent (played by Aaron Eckhart)
- Character: Alfred Pennyworth, Actor: Michael Caine
Rachel Dawes | Maggie Gyllenhaal
Commissioner Gordon - Gary Oldman
";
        let p = parse_cast(answer);
        assert_eq!(
            pairs(&p),
            vec![
                ("Bruce Wayne / Batman", "Christian Bale"),
                ("the Joker", "Heath Ledger"),
                ("Harvey Dent", "Aaron Eckhart"),
                ("Alfred Pennyworth", "Michael Caine"),
                ("Rachel Dawes", "Maggie Gyllenhaal"),
                ("Commissioner Gordon", "Gary Oldman"),
            ]
        );
        assert!(p.failures.is_empty(), "{:?}", p.failures);
    }

    #[test]
    fn markdown_table_rows() {
        let answer = "| Character | Actor |\n|---|---|\n| Bruce Wayne | Christian Bale |\n| Joker | Heath Ledger |";
        let p = parse_cast(answer);
        assert_eq!(pairs(&p), vec![("Bruce Wayne", "Christian Bale"), ("Joker", "Heath Ledger")]);
        assert_eq!(p.actors(), vec!["Christian Bale", "Heath Ledger"]);
        assert!(p.failures.is_empty(), "{:?}", p.failures);
    }

    #[test]
    fn markdown_table_with_actor_column_first() {
        let answer = "\
| # | Actor | Role |
| :-- | :---: | --- |
| 1 | **Heath Ledger** | The Joker |
| 2 | Aaron Eckhart | Harvey Dent |
";
        let p = parse_cast(answer);
        assert_eq!(pairs(&p), vec![("The Joker", "Heath Ledger"), ("Harvey Dent", "Aaron Eckhart")]);
        assert!(p.failures.is_empty(), "{:?}", p.failures);
    }

    #[test]
    fn unmatched_lines_are_reported_with_line_numbers() {
        let p = parse_cast("Joker -> Heath Ledger\nI hope this helps!\nNote: the cast was found online");
        assert_eq!(p.cast.len(), 1);
        assert_eq!(p.failures.len(), 2);
        assert_eq!(p.failures[0].line_no, 2);
        assert_eq!(p.failures[0].reason, "no character/actor pair found");
        assert_eq!(p.failures[1].line_no, 3);
        assert_eq!(p.failures[1].reason, "actor does not look like a name");
    }

    #[test]
    fn prose_only_yields_no_pairs() {
        let p = parse_cast("I could not find information about this movie.");
        assert!(p.cast.is_empty());
        assert_eq!(p.failures.len(), 1);
    }

    #[test]
    fn actors_deduplicated_in_first_seen_order() {
        let p = parse_cast("Batman -> Christian Bale\nJoker -> Heath Ledger\nBruce Wayne -> CHRISTIAN BALE\nJoker -> Heath Ledger");
        assert_eq!(p.cast.len(), 3);
        assert_eq!(p.actors(), vec!["Christian Bale", "Heath Ledger"]);
    }

    #[test]
    fn films_from_numbered_list() {
        let answer = "\
Here are Christian Bale's most recent films:
1. **The Pale Blue Eye** (2022)
2. \"Amsterdam\" (2022)
3. Thor: Love and Thunder - as Gorr the God Butcher
4. Ford v Ferrari [2019]
5. Vice, 2018
6. Hostiles
";
        assert_eq!(
            parse_films(answer, 5),
            vec!["The Pale Blue Eye", "Amsterdam", "Thor: Love and Thunder", "Ford v Ferrari", "Vice"]
        );
    }

    #[test]
    fn films_from_bullets_dedupe() {
        let answer = "- Inception\n- *Interstellar*\n- inception\n- 2023 - Oppenheimer";
        assert_eq!(parse_films(answer, 10), vec!["Inception", "Interstellar", "Oppenheimer"]);
    }

    #[test]
    fn films_from_comma_list() {
        assert_eq!(
            parse_films("His latest films are: The Dark Knight, Brokeback Mountain, and The Imaginarium of Doctor Parnassus.", 5),
            vec!["The Dark Knight", "Brokeback Mountain", "The Imaginarium of Doctor Parnassus"]
        );
        assert_eq!(parse_films("Heat, Ronin, The Irishman", 2), vec!["Heat", "Ronin"]);
    }

    #[test]
    fn prose_yields_no_films() {
        assert!(parse_films("I'm sorry, I was unable to find recent films for this actor.", 5).is_empty());
        assert!(parse_films("", 5).is_empty());
    }
}
