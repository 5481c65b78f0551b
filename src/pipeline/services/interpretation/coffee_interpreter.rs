use std::sync::Arc;

use rand::Rng;

use super::knowledge_base::KnowledgeBase;
use crate::pipeline::types::{MaritalStatus, Mood, SymbolCategory, SymbolRecord, UserProfile};

/// Narrative sections in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    General,
    Love,
    Career,
    Health,
}

impl Section {
    const ORDER: [Section; 4] = [Section::General, Section::Love, Section::Career, Section::Health];

    fn header(&self) -> &'static str {
        match self {
            Section::General => "General Outlook",
            Section::Love => "Love Life",
            Section::Career => "Career",
            Section::Health => "Health",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl From<SymbolCategory> for Section {
    fn from(category: SymbolCategory) -> Self {
        match category {
            SymbolCategory::Career => Section::Career,
            SymbolCategory::Love => Section::Love,
            SymbolCategory::Health => Section::Health,
        }
    }
}

#[derive(Debug, Default)]
struct Buckets([Vec<String>; 4]);

impl Buckets {
    fn push(&mut self, section: Section, phrase: impl Into<String>) {
        self.0[section.index()].push(phrase.into());
    }

    fn render(&self) -> String {
        Section::ORDER
            .iter()
            .filter(|section| !self.0[section.index()].is_empty())
            .map(|section| format!("{}:\n{}", section.header(), self.0[section.index()].join(" ")))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Builds a coffee-cup narrative from symbols, profile and mood.
#[derive(Debug, Clone)]
pub struct CoffeeInterpreter {
    knowledge: Arc<KnowledgeBase>,
    senior_age: u32,
}

impl CoffeeInterpreter {
    pub fn new(knowledge: Arc<KnowledgeBase>, senior_age: u32) -> Self {
        Self {
            knowledge,
            senior_age,
        }
    }

    /// Empty when there are neither symbols nor contextual phrases.
    pub fn interpret<R: Rng + ?Sized>(
        &self,
        symbols: &[SymbolRecord],
        profile: Option<&UserProfile>,
        mood: Option<Mood>,
        rng: &mut R,
    ) -> String {
        let mut buckets = Buckets::default();

        if let Some(profile) = profile {
            self.add_profile(&mut buckets, profile);
        }
        if let Some(mood) = mood {
            buckets.push(Section::General, mood_phrase(mood));
        }

        for symbol in symbols {
            if let Some(phrases) = self.knowledge.symbol_phrases(symbol.shape_type, symbol.category) {
                buckets.push(symbol.category.into(), phrases.choose(rng));
            }
        }

        buckets.render()
    }

    fn add_profile(&self, buckets: &mut Buckets, profile: &UserProfile) {
        if let Some(occupation) = profile.occupation.as_deref().map(str::trim) {
            if !occupation.is_empty() {
                buckets.push(
                    Section::Career,
                    format!("Important developments are showing in the field of {occupation}."),
                );
            }
        }
        match profile.marital_status {
            Some(MaritalStatus::Single) => buckets.push(Section::Love, "A new acquaintance is very likely."),
            Some(MaritalStatus::Married) => {
                buckets.push(Section::Love, "Your bond with your spouse will grow stronger.")
            }
            Some(MaritalStatus::Other) | None => {}
        }
        if let Some(age) = profile.age {
            let phrase = if age > self.senior_age {
                "Regular check-ups will be important."
            } else {
                "Your energy levels are about to rise."
            };
            buckets.push(Section::Health, phrase);
        }
    }
}

fn mood_phrase(mood: Mood) -> &'static str {
    match mood {
        Mood::Happy => "Your positive energy will carry on.",
        Mood::Sad => "News that lifts your spirits is on its way.",
        Mood::Stressed => "A calmer period is about to begin.",
    }
}
