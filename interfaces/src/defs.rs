use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic a collector filed the article under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    #[serde(alias = "tech")]
    Technology,
    Europe,
    #[default]
    #[serde(other)]
    Other,
}

/// Article as handed over by the acquisition side.
///
/// Every field is optional on the wire: a record that lacks its text is still
/// carried through a run, it simply ends up with empty derived fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub political_leaning: Option<String>,
}

impl ArticleRecord {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Source text: `text` when it has content, otherwise `description`.
    /// `None` only when neither field was supplied.
    pub fn body(&self) -> Option<&str> {
        match (self.text.as_deref(), self.description.as_deref()) {
            (Some(text), _) if !text.is_empty() => Some(text),
            (_, Some(description)) => Some(description),
            (text, None) => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Loc,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub polarity: f64,
    pub subjectivity: f64,
}

impl SentimentReading {
    /// Pins the reading into polarity [-1, 1] and subjectivity [0, 1].
    /// NaN readings collapse to 0.
    pub fn clamped(self) -> Self {
        let pin = |value: f64, low: f64| if value.is_nan() { 0.0 } else { value.clamp(low, 1.0) };
        Self {
            polarity: pin(self.polarity, -1.0),
            subjectivity: pin(self.subjectivity, 0.0),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model {model} is unavailable: {reason}")]
    Unavailable { model: String, reason: String },
}

// Service note:
// NER and sentiment models are opaque collaborators. Implementations are
// expected to be loaded once per process and then shared read-only across
// runs, so both traits take `&self` and require `Send + Sync`.

pub trait NerModel: Send + Sync {
    fn model_name(&self) -> &str;
    fn recognize(&self, text: &str) -> Vec<EntitySpan>;
}

pub trait SentimentModel: Send + Sync {
    fn model_name(&self) -> &str;
    fn analyze(&self, text: &str) -> SentimentReading;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_accepts_tech_alias_and_unknown_topics() {
        let record: ArticleRecord =
            serde_json::from_str(r#"{"source": "CNN", "category": "tech", "text": "x"}"#).unwrap();
        assert_eq!(record.category, Category::Technology);

        let record: ArticleRecord =
            serde_json::from_str(r#"{"source": "CNN", "category": "weather"}"#).unwrap();
        assert_eq!(record.category, Category::Other);
    }

    #[test]
    fn body_prefers_text_then_description() {
        let mut record = ArticleRecord::new("BBC", "");
        assert_eq!(record.body(), Some(""));

        record.description = Some("From the feed summary".to_owned());
        assert_eq!(record.body(), Some("From the feed summary"));

        record.text = Some("Full text".to_owned());
        assert_eq!(record.body(), Some("Full text"));

        assert_eq!(ArticleRecord::default().body(), None);
    }

    #[test]
    fn timestamp_parses_rfc3339() {
        let record: ArticleRecord = serde_json::from_str(
            r#"{"source": "NPR", "timestamp": "2025-10-01T12:30:00Z", "description": "d"}"#,
        )
        .unwrap();
        assert!(record.timestamp.is_some());
        assert_eq!(record.body(), Some("d"));
    }

    #[test]
    fn readings_are_pinned_into_range() {
        let reading = SentimentReading { polarity: 1.7, subjectivity: -0.2 }.clamped();
        assert_eq!(reading, SentimentReading { polarity: 1.0, subjectivity: 0.0 });

        let reading = SentimentReading { polarity: f64::NAN, subjectivity: 0.4 }.clamped();
        assert_eq!(reading.polarity, 0.0);
    }
}
