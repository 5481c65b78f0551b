use std::sync::Arc;

use indexmap::IndexSet;
use rand::Rng;

use super::knowledge_base::KnowledgeBase;
use crate::pipeline::types::{LineRecord, PalmLine};

/// Returned verbatim when no line could be classified.
pub const UNCLEAR_PALM: &str =
    "Your palm lines are not clear enough to read. Please take a sharper photo.";

const DEFAULT_TIP: &str = "Use natural light when taking the photo.";

#[derive(Debug, Clone)]
pub struct PalmInterpreter {
    knowledge: Arc<KnowledgeBase>,
}

impl PalmInterpreter {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// One phrase per distinct line, in first-seen order, after an intro
    /// naming the lines.
    pub fn interpret<R: Rng + ?Sized>(&self, lines: &[LineRecord], rng: &mut R) -> String {
        let distinct: IndexSet<PalmLine> = lines.iter().map(|line| line.category).collect();
        if distinct.is_empty() {
            return UNCLEAR_PALM.to_string();
        }

        let names: Vec<&str> = distinct.iter().map(PalmLine::as_str).collect();
        let intro = format!("Your {} lines stand out clearly.", names.join(", "));

        let phrases: Vec<&str> = distinct
            .iter()
            .filter_map(|line| self.knowledge.line_phrases(*line))
            .map(|phrases| phrases.choose(rng))
            .collect();
        if phrases.is_empty() {
            return format!("{intro} {UNCLEAR_PALM}");
        }
        format!("{intro} {}", phrases.join(" "))
    }

    pub fn daily_tip<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.knowledge
            .palm_tips()
            .map_or(DEFAULT_TIP, |tips| tips.choose(rng))
            .to_string()
    }
}
