//! Blends rule-based scores with AI suggestions into final recommendations.

use crate::mood::{rank_top, MoodCatalog, RuleBasedAnalysis};
use crate::suggestions::SuggestionSet;
use serde::Serialize;
use std::sync::Arc;

/// Weight of the rule-based score when audio features were available.
pub const RULE_WEIGHT: f64 = 0.6;
/// Weight of an AI confidence when audio features were available.
pub const AI_WEIGHT: f64 = 0.4;
/// Number of final recommendations.
pub const MAX_RECOMMENDATIONS: usize = 3;

const KEYWORD_EXCERPT: usize = 3;
const FALLBACK_KEYWORDS: [&str; 2] = ["mood-based", "AI-suggested"];
const RULE_REASONING: &str = "Based on audio feature analysis";
const AI_ONLY_REASONING: &str = "Based on track names and playlist context";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombinedRecommendation {
    pub mood: String,
    pub score: f64,
    pub reasoning: String,
    pub keywords: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlendMode {
    Weighted,
    AiOnly,
}

#[derive(Clone, Debug)]
pub struct Combiner {
    catalog: Arc<MoodCatalog>,
}

impl Combiner {
    pub fn new(catalog: Arc<MoodCatalog>) -> Self {
        Self { catalog }
    }

    pub fn combine(
        &self,
        rule_based: &RuleBasedAnalysis,
        ai: &SuggestionSet,
    ) -> Vec<CombinedRecommendation> {
        // Insertion ordered, so ties resolve to the first mood seen.
        let mut scores: Vec<(String, f64)> = Vec::new();

        let mode = match rule_based.top_moods() {
            Some(top_moods) => {
                for ranked in top_moods {
                    scores.push((ranked.mood.clone(), ranked.score * RULE_WEIGHT));
                }
                for suggestion in &ai.suggestions {
                    let weighted = suggestion.confidence * AI_WEIGHT;
                    match scores.iter_mut().find(|(mood, _)| *mood == suggestion.mood) {
                        Some((_, score)) => *score += weighted,
                        None => scores.push((suggestion.mood.clone(), weighted)),
                    }
                }
                BlendMode::Weighted
            }
            None => {
                for suggestion in &ai.suggestions {
                    match scores.iter_mut().find(|(mood, _)| *mood == suggestion.mood) {
                        Some((_, score)) => *score = suggestion.confidence,
                        None => scores.push((suggestion.mood.clone(), suggestion.confidence)),
                    }
                }
                BlendMode::AiOnly
            }
        };

        let ranked = rank_top(
            scores.iter().map(|(mood, score)| (mood.as_str(), *score)),
            MAX_RECOMMENDATIONS,
        );

        ranked
            .into_iter()
            .map(|ranked| {
                let reasoning = match ai.find(&ranked.mood) {
                    Some(suggestion) => suggestion.reasoning.clone(),
                    None if mode == BlendMode::AiOnly => AI_ONLY_REASONING.to_string(),
                    None => RULE_REASONING.to_string(),
                };
                let keywords = match self.catalog.get(&ranked.mood) {
                    Some(category) => category.keyword_excerpt(KEYWORD_EXCERPT),
                    None => FALLBACK_KEYWORDS.iter().map(|k| k.to_string()).collect(),
                };
                CombinedRecommendation {
                    score: clamp_unit(ranked.score),
                    mood: ranked.mood,
                    reasoning,
                    keywords,
                }
            })
            .collect()
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
