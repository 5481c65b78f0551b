use std::collections::HashMap;
use std::path::Path;

use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;
use crate::pipeline::types::{PalmLine, ShapeType, SymbolCategory};

const EMBEDDED_KNOWLEDGE_BASE: &str = include_str!("../../../../data/knowledge_base.json");

/// A non-empty list of candidate phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrases(Vec<String>);

impl Phrases {
    fn new(phrases: Vec<String>) -> Option<Self> {
        (!phrases.is_empty()).then_some(Self(phrases))
    }

    /// Picks one phrase uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.0[rng.random_range(0..self.0.len())]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PhraseEntry {
    One(String),
    Many(Vec<String>),
}

impl PhraseEntry {
    fn into_phrases(self, key: impl FnOnce() -> String) -> Result<Phrases, ConfigError> {
        let phrases = match self {
            PhraseEntry::One(phrase) => vec![phrase],
            PhraseEntry::Many(phrases) => phrases,
        };
        Phrases::new(phrases).ok_or_else(|| ConfigError::EmptyPhrases(key()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKnowledgeBase {
    #[serde(default)]
    coffee: HashMap<ShapeType, HashMap<SymbolCategory, PhraseEntry>>,
    #[serde(default)]
    palm: HashMap<PalmLine, PhraseEntry>,
    #[serde(default)]
    palm_tips: Option<PhraseEntry>,
}

/// Phrase corpus for every symbol and palm line, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    coffee: HashMap<(ShapeType, SymbolCategory), Phrases>,
    palm: HashMap<PalmLine, Phrases>,
    palm_tips: Option<Phrases>,
}

impl KnowledgeBase {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawKnowledgeBase = serde_json::from_str(json)?;

        let mut coffee = HashMap::new();
        for (shape, categories) in raw.coffee {
            for (category, entry) in categories {
                let phrases =
                    entry.into_phrases(|| format!("coffee.{}.{}", shape.as_str(), category.as_str()))?;
                coffee.insert((shape, category), phrases);
            }
        }

        let mut palm = HashMap::new();
        for (line, entry) in raw.palm {
            palm.insert(line, entry.into_phrases(|| format!("palm.{}", line))?);
        }

        let palm_tips = raw
            .palm_tips
            .map(|entry| entry.into_phrases(|| "palm_tips".to_string()))
            .transpose()?;

        Ok(Self {
            coffee,
            palm,
            palm_tips,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e, path.to_path_buf()))?;
        let knowledge = Self::from_json(&json)?;
        info!(
            "Loaded knowledge base from {} ({} symbol entries, {} palm entries)",
            path.display(),
            knowledge.coffee.len(),
            knowledge.palm.len()
        );
        Ok(knowledge)
    }

    /// The corpus compiled into the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(EMBEDDED_KNOWLEDGE_BASE)
    }

    pub fn symbol_phrases(&self, shape: ShapeType, category: SymbolCategory) -> Option<&Phrases> {
        self.coffee.get(&(shape, category))
    }

    pub fn line_phrases(&self, line: PalmLine) -> Option<&Phrases> {
        self.palm.get(&line)
    }

    pub fn palm_tips(&self) -> Option<&Phrases> {
        self.palm_tips.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn embedded_corpus_covers_the_taxonomy() {
        let knowledge = KnowledgeBase::embedded().unwrap();
        for shape in [ShapeType::Round, ShapeType::Elongated, ShapeType::Mixed] {
            for category in SymbolCategory::ALL {
                assert!(knowledge.symbol_phrases(shape, category).is_some());
            }
        }
        for line in PalmLine::ALL {
            assert!(knowledge.line_phrases(line).is_some());
        }
        assert!(knowledge.palm_tips().is_some());
    }

    #[test]
    fn scalar_entries_become_single_phrase_lists() {
        let knowledge =
            KnowledgeBase::from_json(r#"{"coffee":{"round":{"love":"only one"}}}"#).unwrap();
        let phrases = knowledge
            .symbol_phrases(ShapeType::Round, SymbolCategory::Love)
            .unwrap();
        assert_eq!(phrases.as_slice(), ["only one".to_string()]);
        assert!(knowledge.symbol_phrases(ShapeType::Round, SymbolCategory::Career).is_none());
    }

    #[test]
    fn empty_lists_are_rejected() {
        let result = KnowledgeBase::from_json(r#"{"palm":{"heart":[]}}"#);
        assert!(matches!(result, Err(ConfigError::EmptyPhrases(key)) if key == "palm.heart"));
    }

    #[test]
    fn keys_outside_the_taxonomy_are_rejected() {
        let unknown_shape = KnowledgeBase::from_json(r#"{"coffee":{"square":{"love":"x"}}}"#);
        assert!(matches!(unknown_shape, Err(ConfigError::Parse(_))));
        let unknown_section = KnowledgeBase::from_json(r#"{"tarot":{}}"#);
        assert!(matches!(unknown_section, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn choose_is_deterministic_for_a_seed() {
        let knowledge = KnowledgeBase::embedded().unwrap();
        let phrases = knowledge.line_phrases(PalmLine::Head).unwrap();
        let a = phrases.choose(&mut StdRng::seed_from_u64(9)).to_string();
        let b = phrases.choose(&mut StdRng::seed_from_u64(9)).to_string();
        assert_eq!(a, b);
        assert!(phrases.as_slice().contains(&a));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"palm":{{"fate":["a","b"]}}}}"#).unwrap();
        let knowledge = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(knowledge.line_phrases(PalmLine::Fate).unwrap().as_slice().len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = KnowledgeBase::load(Path::new("/nonexistent/knowledge.json"));
        assert!(matches!(result, Err(ConfigError::Io(_, _))));
    }
}
