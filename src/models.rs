use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A unit of retrieved context. Identity for deduplication is `content` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One recommended title and the explanation at the same position in the answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    pub explanation: String,
}

/// Parsed generator output.
///
/// Titles and explanations are paired by position only; the generator is
/// trusted to emit them in the same order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StructuredRecommendation {
    items: Vec<Recommendation>,
}

impl StructuredRecommendation {
    /// Pair titles with explanations, dropping whichever side is longer.
    pub fn zip(titles: Vec<String>, explanations: Vec<String>) -> Self {
        let items = titles
            .into_iter()
            .zip(explanations)
            .map(|(title, explanation)| Recommendation { title, explanation })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[Recommendation] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Recommendation> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn titles(&self) -> Vec<String> {
        self.items.iter().map(|r| r.title.clone()).collect()
    }

    pub fn explanations(&self) -> Vec<String> {
        self.items.iter().map(|r| r.explanation.clone()).collect()
    }
}

/// Catalog details for a recommended title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimeMetadata {
    pub image: Option<String>,
    pub score: Option<f64>,
    pub url: String,
    #[serde(rename = "title")]
    pub display_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopAnime {
    pub rank: usize,
    pub title: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopCharacter {
    pub rank: usize,
    pub name: String,
    pub favorites: Option<u64>,
}

/// Query string for `GET /api/recommend`
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendQuery {
    #[serde(default)]
    pub query: String,
    /// Look up catalog metadata for every title before responding
    #[serde(default)]
    pub enrich: bool,
}

/// A recommendation as rendered to the UI, optionally enriched.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationCard {
    pub title: String,
    pub explanation: String,
    /// `null` when not enriched or when the catalog had no match
    pub metadata: Option<AnimeMetadata>,
    /// Only present on enriched responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_available: Option<bool>,
}

/// Response for `GET /api/recommend`
#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub query: String,
    pub count: usize,
    pub titles: Vec<String>,
    pub explanations: Vec<String>,
    pub recommendations: Vec<RecommendationCard>,
}

impl RecommendResponse {
    /// Build the response from a parsed answer; `count` always matches both lists.
    pub fn new(query: String, parsed: &StructuredRecommendation) -> Self {
        Self {
            success: true,
            query,
            count: parsed.len(),
            titles: parsed.titles(),
            explanations: parsed.explanations(),
            recommendations: parsed
                .items()
                .iter()
                .map(|r| RecommendationCard {
                    title: r.title.clone(),
                    explanation: r.explanation.clone(),
                    metadata: None,
                    details_available: None,
                })
                .collect(),
        }
    }
}

/// Query string for `GET /api/metadata`
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataQuery {
    #[serde(default)]
    pub title: String,
}

/// Response for `GET /api/metadata`
#[derive(Debug, Clone, Serialize)]
pub struct MetadataResponse {
    pub found: bool,
    #[serde(flatten)]
    pub metadata: Option<AnimeMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response for the top-N listing endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
}
