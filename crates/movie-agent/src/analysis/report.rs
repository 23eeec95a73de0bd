//! Plain-text report for the CLI.

use std::fmt::Write as _;

use super::result::{AnalysisResult, FilmographyStatus};

/// Renders the cast, each actor's films (or why they are missing) and parse notes.
pub fn format_report(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Movie: {}", result.title);
    let _ = writeln!(out);
    let _ = writeln!(out, "Lead cast:");
    for member in &result.cast {
        let _ = writeln!(out, "  - {}: {}", member.character, member.actor);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recent films:");
    for f in &result.filmographies {
        match &f.status {
            FilmographyStatus::Found => {
                let _ = writeln!(out, "  {}:", f.actor);
                for (i, film) in f.films.iter().enumerate() {
                    let _ = writeln!(out, "    {}. {}", i + 1, film);
                }
            }
            FilmographyStatus::Failed { reason } => {
                let _ = writeln!(out, "  {}: not available ({})", f.actor, reason);
            }
        }
    }

    if !result.parse_failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Note: {} line(s) of the cast answer could not be parsed:",
            result.parse_failures.len()
        );
        for e in &result.parse_failures {
            let _ = writeln!(out, "  - line {}: {}", e.line_no, e.line);
        }
    }
    out
}
