use crate::types::{Article, CredibilityAssessment, EnrichmentError, FactAccuracyRating, Result};
use crate::utils::source::lookup_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

pub const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCredibilityEntry {
    pub credibility_score: u8,
    pub political_bias: String,
    pub bias_score: u8,
    pub notes: String,
}

impl SourceCredibilityEntry {
    pub fn new(credibility_score: u8, political_bias: &str, bias_score: u8, notes: &str) -> Self {
        Self {
            credibility_score,
            political_bias: political_bias.to_string(),
            bias_score,
            notes: notes.to_string(),
        }
    }

    fn unknown() -> Self {
        Self::new(60, "unknown", 5, "Source not in credibility database")
    }

    fn validate(&self, source: &str) -> Result<()> {
        let invalid = |reason: String| EnrichmentError::InvalidCredibilityEntry {
            source_name: source.to_string(),
            reason,
        };
        if self.credibility_score > 100 {
            return Err(invalid(format!(
                "credibility_score {} is outside 0-100",
                self.credibility_score
            )));
        }
        if !(1..=10).contains(&self.bias_score) {
            return Err(invalid(format!("bias_score {} is outside 1-10", self.bias_score)));
        }
        Ok(())
    }
}

/// Read-only source reputation table keyed by normalized source name.
/// Built once and shared by reference; unmatched names resolve to `unknown`.
#[derive(Debug, Clone)]
pub struct CredibilityTable {
    entries: HashMap<String, SourceCredibilityEntry>,
    unknown: SourceCredibilityEntry,
}

impl CredibilityTable {
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, SourceCredibilityEntry)>,
        S: Into<String>,
    {
        let mut table = HashMap::new();
        for (name, entry) in entries {
            let name = name.into();
            entry.validate(&name)?;
            table.insert(lookup_key(&name), entry);
        }
        let unknown = table
            .remove(&lookup_key(UNKNOWN_SOURCE))
            .unwrap_or_else(SourceCredibilityEntry::unknown);
        Ok(Self {
            entries: table,
            unknown,
        })
    }

    /// Load a JSON object of `source name -> entry`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: HashMap<String, SourceCredibilityEntry> = serde_json::from_str(&raw)?;
        let table = Self::from_entries(entries)?;
        info!("Loaded {} credibility entries from {}", table.len(), path.display());
        Ok(table)
    }

    /// Number of entries, the `Unknown` entry included.
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    /// Never misses: unmatched sources resolve to the `Unknown` entry.
    pub fn lookup(&self, source: &str) -> &SourceCredibilityEntry {
        self.entries.get(&lookup_key(source)).unwrap_or(&self.unknown)
    }

    pub fn contains(&self, source: &str) -> bool {
        let key = lookup_key(source);
        key == lookup_key(UNKNOWN_SOURCE) || self.entries.contains_key(&key)
    }

    pub fn unknown(&self) -> &SourceCredibilityEntry {
        &self.unknown
    }
}

impl Default for CredibilityTable {
    fn default() -> Self {
        let entries = [
            ("NPR", SourceCredibilityEntry::new(85, "center-left", 3, "Public broadcaster with strong fact-checking standards")),
            ("BBC", SourceCredibilityEntry::new(88, "center", 2, "International public broadcaster with rigorous editorial standards")),
            ("Reuters", SourceCredibilityEntry::new(90, "center", 1, "International news agency focused on factual reporting")),
            ("Associated Press", SourceCredibilityEntry::new(90, "center", 1, "Cooperative news agency with high editorial standards")),
            ("AP", SourceCredibilityEntry::new(90, "center", 1, "Associated Press - high editorial standards")),
            ("The Wall Street Journal", SourceCredibilityEntry::new(82, "center-right", 3, "Business-focused with strong reporting (opinion pages lean right)")),
            ("The New York Times", SourceCredibilityEntry::new(78, "center-left", 4, "Major newspaper with thorough reporting; some editorial lean")),
            ("The Washington Post", SourceCredibilityEntry::new(76, "center-left", 4, "Strong investigative journalism; editorial lean")),
            ("CNN", SourceCredibilityEntry::new(72, "center-left", 4, "Cable news network with center-left editorial perspective")),
            ("The Guardian", SourceCredibilityEntry::new(74, "left", 5, "British newspaper with progressive editorial stance")),
            ("Politico", SourceCredibilityEntry::new(75, "center", 3, "Political journalism focused on policy and Washington")),
            ("The Independent", SourceCredibilityEntry::new(70, "center-left", 4, "British newspaper with center-left perspective")),
            ("Financial Times", SourceCredibilityEntry::new(80, "center", 2, "International business newspaper with strong economic analysis")),
            ("ESPN", SourceCredibilityEntry::new(65, "center", 1, "Sports journalism - credibility for sports, not political news")),
            ("The White House (.gov)", SourceCredibilityEntry::new(75, "government", 5, "Official government source - factual but reflects current administration")),
            (UNKNOWN_SOURCE, SourceCredibilityEntry::unknown()),
        ];
        Self::from_entries(entries).expect("built-in credibility table is valid")
    }
}

/// Annotates articles from a borrowed [`CredibilityTable`].
#[derive(Debug, Clone, Copy)]
pub struct CredibilityScorer<'a> {
    table: &'a CredibilityTable,
}

impl<'a> CredibilityScorer<'a> {
    pub fn new(table: &'a CredibilityTable) -> Self {
        Self { table }
    }

    pub fn score(&self, article: &Article) -> CredibilityAssessment {
        let source = article.source();
        if !self.table.contains(source) {
            debug!("Source {:?} not in credibility table, using {}", source, UNKNOWN_SOURCE);
        }
        let entry = self.table.lookup(source);
        CredibilityAssessment {
            credibility_score: entry.credibility_score,
            bias_score: entry.bias_score,
            political_bias: entry.political_bias.clone(),
            fact_accuracy_rating: FactAccuracyRating::from_score(entry.credibility_score),
            credibility_notes: entry.notes.clone(),
        }
    }
}

/// Credibility tier counts plus running means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredibilityStats {
    pub high_credibility: usize,
    pub medium_credibility: usize,
    pub low_credibility: usize,
    pub high_bias: usize,
    pub low_bias: usize,
    pub avg_credibility: f64,
    pub avg_bias: f64,
    #[serde(skip)]
    scored: usize,
    #[serde(skip)]
    credibility_total: u64,
    #[serde(skip)]
    bias_total: u64,
}

impl CredibilityStats {
    pub fn record(&mut self, assessment: &CredibilityAssessment) {
        match assessment.credibility_score {
            80..=u8::MAX => self.high_credibility += 1,
            60..=79 => self.medium_credibility += 1,
            _ => self.low_credibility += 1,
        }
        if assessment.bias_score >= 7 {
            self.high_bias += 1;
        } else if assessment.bias_score < 4 {
            self.low_bias += 1;
        }

        self.scored += 1;
        self.credibility_total += u64::from(assessment.credibility_score);
        self.bias_total += u64::from(assessment.bias_score);
        self.avg_credibility = self.credibility_total as f64 / self.scored as f64;
        self.avg_bias = self.bias_total as f64 / self.scored as f64;
    }

    pub fn scored(&self) -> usize {
        self.scored
    }
}
