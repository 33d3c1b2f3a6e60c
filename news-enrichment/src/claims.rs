use crate::types::{Article, FlagReason, FlaggedClaim};
use crate::utils::text::split_sentences;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_CLAIMS: usize = 5;

/// Bias score at or above which every claim of the article is flagged.
pub const HIGH_BIAS_THRESHOLD: u8 = 7;

pub const CLAIM_VERBS: [&str; 12] = [
    "said", "says", "stated", "announced", "reported", "confirmed", "revealed", "claimed",
    "argued", "warned", "predicted", "declared",
];

pub const VERIFICATION_KEYWORDS: [&str; 8] = [
    "reportedly",
    "allegedly",
    "claims",
    "unconfirmed",
    "sources say",
    "anonymous",
    "rumored",
    "speculation",
];

/// Pick out assertive sentences: those containing one of the claim verbs.
#[derive(Debug, Clone, Default)]
pub struct ClaimExtractor;

impl ClaimExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_claims(&self, text: &str) -> Vec<String> {
        split_sentences(text)
            .filter(|sentence| contains_any(sentence, &CLAIM_VERBS))
            .take(MAX_CLAIMS)
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimStats {
    pub total_claims: usize,
    pub flagged_count: usize,
    pub flag_rate: f64,
}

/// Marks claims that need independent verification. A claim yields at most one
/// flag; the verification keyword reason wins over the source bias reason.
#[derive(Debug, Clone, Default)]
pub struct ClaimFlagger;

impl ClaimFlagger {
    pub fn new() -> Self {
        Self
    }

    /// Flag reason for one claim of an article with the given bias score.
    pub fn classify(&self, claim: &str, bias_score: u8) -> Option<FlagReason> {
        if contains_any(claim, &VERIFICATION_KEYWORDS) {
            Some(FlagReason::VerificationKeyword)
        } else if bias_score >= HIGH_BIAS_THRESHOLD {
            Some(FlagReason::HighBiasSource)
        } else {
            None
        }
    }

    /// Flags for one article. Articles without a credibility assessment are
    /// treated as bias score 0, so only keyword flags apply to them.
    pub fn flag_article(&self, article: &Article) -> Vec<FlaggedClaim> {
        let (bias_score, credibility_score) = article
            .credibility
            .as_ref()
            .map(|c| (c.bias_score, c.credibility_score))
            .unwrap_or((0, 0));

        article
            .claims()
            .iter()
            .filter_map(|claim| {
                self.classify(claim, bias_score).map(|reason| FlaggedClaim {
                    claim: claim.clone(),
                    source: article.record.source.clone(),
                    article_title: article.record.title.clone(),
                    reason,
                    credibility_score,
                })
            })
            .collect()
    }

    pub fn flag(&self, articles: &[Article]) -> Vec<FlaggedClaim> {
        let flagged: Vec<FlaggedClaim> = articles.iter().flat_map(|a| self.flag_article(a)).collect();
        debug!("Flagged {} claims across {} articles", flagged.len(), articles.len());
        flagged
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    needles.iter().any(|needle| lowered.contains(needle))
}
