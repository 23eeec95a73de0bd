//! Analysis result types.

use super::parse::ParseError;

/// One lead character and the actor playing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastMember {
    pub character: String,
    pub actor: String,
}

impl CastMember {
    pub fn new(character: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            actor: actor.into(),
        }
    }
}

/// Whether an actor's filmography run produced titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilmographyStatus {
    Found,
    Failed { reason: String },
}

/// Recent films of one actor, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filmography {
    pub actor: String,
    pub films: Vec<String>,
    pub status: FilmographyStatus,
}

impl Filmography {
    pub fn found(actor: impl Into<String>, films: Vec<String>) -> Self {
        Self {
            actor: actor.into(),
            films,
            status: FilmographyStatus::Found,
        }
    }

    /// Failed lookup: the film list stays empty.
    pub fn failed(actor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            films: Vec::new(),
            status: FilmographyStatus::Failed { reason: reason.into() },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, FilmographyStatus::Failed { .. })
    }
}

/// Combined result of the cast pass and the per-actor filmography passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub title: String,
    pub cast: Vec<CastMember>,
    /// One entry per distinct actor, in cast order.
    pub filmographies: Vec<Filmography>,
    /// Lines of the cast answer that did not parse.
    pub parse_failures: Vec<ParseError>,
}

impl AnalysisResult {
    pub fn filmography(&self, actor: &str) -> Option<&Filmography> {
        self.filmographies.iter().find(|f| f.actor.eq_ignore_ascii_case(actor))
    }

    pub fn failed_actors(&self) -> impl Iterator<Item = &str> {
        self.filmographies
            .iter()
            .filter(|f| f.is_failed())
            .map(|f| f.actor.as_str())
    }

    /// True when every actor has films.
    pub fn is_complete(&self) -> bool {
        self.filmographies.iter().all(|f| !f.is_failed())
    }
}

/// Model and tool summary shown after a report.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInfo {
    pub model: String,
    pub temperature: f32,
    pub tools: Vec<String>,
}

impl AgentInfo {
    pub fn tools_count(&self) -> usize {
        self.tools.len()
    }
}
