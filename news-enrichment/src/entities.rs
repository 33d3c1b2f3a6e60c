use crate::types::{EntityLabel, EntitySpan, ModelLoadError, NerModel};
use crate::utils::text::{dedup_capped, dedup_capped_ignore_case};
use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

/// Upper bound for each category and for the flat entity list.
pub const ENTITY_CAP: usize = 15;

// Two or three capitalized words in a row: "Joe Biden", "New York City".
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,2})\b").expect("name pattern compiles")
});

static ORG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z][A-Za-z\s&]+(?:Inc\.|Corp\.|LLC|Co\.|Ltd\.|Organization|Agency|Department|Committee))",
    )
    .expect("organization pattern compiles")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityExtraction {
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
    pub all_entities: Vec<String>,
}

/// How entities are found, fixed when the extractor is built.
#[derive(Clone)]
pub enum ExtractionCapability {
    Model(Arc<dyn NerModel>),
    Fallback,
}

impl std::fmt::Debug for ExtractionCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionCapability::Model(model) => {
                f.debug_tuple("Model").field(&model.model_name()).finish()
            }
            ExtractionCapability::Fallback => f.write_str("Fallback"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityExtractor {
    capability: ExtractionCapability,
}

impl EntityExtractor {
    pub fn with_model(model: Arc<dyn NerModel>) -> Self {
        info!("Entity extraction using model {}", model.model_name());
        Self {
            capability: ExtractionCapability::Model(model),
        }
    }

    pub fn fallback() -> Self {
        Self {
            capability: ExtractionCapability::Fallback,
        }
    }

    /// Resolve the capability once. A load failure pins the extractor to the
    /// pattern fallback for as long as it lives.
    pub fn from_load<F>(load: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn NerModel>, ModelLoadError>,
    {
        match load() {
            Ok(model) => Self::with_model(model),
            Err(e) => {
                warn!("NER unavailable, using pattern fallback: {}", e);
                Self::fallback()
            }
        }
    }

    pub fn capability(&self) -> &ExtractionCapability {
        &self.capability
    }

    /// False when running on the pattern fallback.
    pub fn is_categorized(&self) -> bool {
        matches!(self.capability, ExtractionCapability::Model(_))
    }

    pub fn extract(&self, text: &str) -> EntityExtraction {
        if text.trim().is_empty() {
            return EntityExtraction::default();
        }
        match &self.capability {
            ExtractionCapability::Model(model) => categorize(model.recognize(text)),
            ExtractionCapability::Fallback => EntityExtraction {
                all_entities: pattern_entities(text),
                ..EntityExtraction::default()
            },
        }
    }
}

fn categorize(spans: Vec<EntitySpan>) -> EntityExtraction {
    let mut persons = Vec::new();
    let mut organizations = Vec::new();
    let mut locations = Vec::new();

    for span in spans {
        let text = span.text.trim().to_string();
        if text.is_empty() {
            continue;
        }
        match span.label {
            EntityLabel::Person => persons.push(text),
            EntityLabel::Org => organizations.push(text),
            EntityLabel::Gpe | EntityLabel::Loc => locations.push(text),
            EntityLabel::Other => {}
        }
    }

    let persons = dedup_capped(persons, ENTITY_CAP);
    let organizations = dedup_capped(organizations, ENTITY_CAP);
    let locations = dedup_capped(locations, ENTITY_CAP);
    // Concatenate the capped categories, then dedup and cap once more.
    let all_entities = dedup_capped(
        persons.iter().chain(&organizations).chain(&locations),
        ENTITY_CAP,
    );

    debug!(
        "Categorized {} persons, {} organizations, {} locations",
        persons.len(),
        organizations.len(),
        locations.len()
    );

    EntityExtraction {
        persons,
        organizations,
        locations,
        all_entities,
    }
}

fn pattern_entities(text: &str) -> Vec<String> {
    let names = NAME_PATTERN.captures_iter(text).filter_map(|c| c.get(1));
    let orgs = ORG_PATTERN.captures_iter(text).filter_map(|c| c.get(1));
    let candidates = names
        .chain(orgs)
        .map(|m| m.as_str().trim())
        .filter(|candidate| candidate.chars().count() > 3);
    dedup_capped_ignore_case(candidates, ENTITY_CAP)
}

/// Dictionary-backed NER model. Surface forms are matched case-sensitively on
/// whole words. Among matches that start at the same place the longest wins,
/// and a surface listed under several labels takes the first label in
/// `EntityLabel` order.
pub struct GazetteerModel {
    name: String,
    matcher: AhoCorasick,
    labels: Vec<EntityLabel>,
}

impl GazetteerModel {
    pub fn new(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (EntityLabel, Vec<String>)>,
    ) -> Result<Self, ModelLoadError> {
        let name = name.into();
        let entries: BTreeMap<EntityLabel, Vec<String>> = entries.into_iter().collect();
        let mut patterns = Vec::new();
        let mut labels = Vec::new();
        for (label, surfaces) in entries {
            for surface in surfaces {
                let surface = surface.trim().to_string();
                if !surface.is_empty() {
                    patterns.push(surface);
                    labels.push(label.clone());
                }
            }
        }
        if patterns.is_empty() {
            return Err(ModelLoadError::Unavailable {
                model: name,
                reason: "gazetteer has no entries".to_string(),
            });
        }

        let matcher = AhoCorasick::new(&patterns)
            .map_err(|e| ModelLoadError::Unavailable {
                model: name.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name,
            matcher,
            labels,
        })
    }

    /// Load `{ "PERSON": [...], "ORG": [...], "GPE": [...], "LOC": [...] }`.
    pub fn from_json_file(path: &Path) -> Result<Self, ModelLoadError> {
        let unavailable = |reason: String| ModelLoadError::Unavailable {
            model: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        let entries: BTreeMap<EntityLabel, Vec<String>> =
            serde_json::from_str(&raw).map_err(|e| unavailable(e.to_string()))?;
        Self::new(path.display().to_string(), entries)
    }
}

impl NerModel for GazetteerModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn recognize(&self, text: &str) -> Vec<EntitySpan> {
        let mut candidates: Vec<(usize, usize, usize)> = self
            .matcher
            .find_overlapping_iter(text)
            .filter(|m| on_word_boundary(text, m.start(), m.end()))
            .map(|m| (m.start(), m.end(), m.pattern().as_usize()))
            .collect();
        // Leftmost first, then longest, then earliest pattern.
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

        let mut spans = Vec::new();
        let mut covered = 0;
        for (start, end, pattern) in candidates {
            if start < covered {
                continue;
            }
            spans.push(EntitySpan::new(&text[start..end], self.labels[pattern].clone()));
            covered = end;
        }
        spans
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
