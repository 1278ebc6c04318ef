//! HTTP handler tests with in-process collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use anime_recommender::api;
use anime_recommender::catalog::{JikanClient, MetadataLookup};
use anime_recommender::config::{Config, UnmatchedTitlePolicy};
use anime_recommender::error::GenerationError;
use anime_recommender::llm::{AnswerGenerator, RetryPolicy};
use anime_recommender::models::{AnimeMetadata, Document, MetadataQuery, RecommendQuery};
use anime_recommender::pipeline::{PipelineOptions, RecommendationPipeline};
use anime_recommender::search::{ContextBudget, Retriever};
use anime_recommender::state::AppState;

struct StaticRetriever(Vec<Document>);

#[async_trait]
impl Retriever for StaticRetriever {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn retrieve(&self, _query: &str, k: usize) -> anyhow::Result<Vec<Document>> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

enum Answer {
    Text(&'static str),
    Unavailable,
}

struct FixedGenerator(Answer);

#[async_trait]
impl AnswerGenerator for FixedGenerator {
    async fn generate(&self, _context: &str, _question: &str) -> Result<String, GenerationError> {
        match &self.0 {
            Answer::Text(text) => Ok(text.to_string()),
            Answer::Unavailable => Err(GenerationError::Status {
                status: 503,
                body: "overloaded".into(),
            }),
        }
    }
}

/// Knows only Akira; "Broken" fails, everything else is a miss.
struct FakeCatalog;

#[async_trait]
impl MetadataLookup for FakeCatalog {
    async fn lookup(&self, title: &str) -> anyhow::Result<Option<AnimeMetadata>> {
        match title {
            "Akira" => Ok(Some(AnimeMetadata {
                image: Some("https://cdn.myanimelist.net/images/anime/akira.jpg".into()),
                score: Some(8.16),
                url: "https://myanimelist.net/anime/47".into(),
                display_title: "Akira".into(),
            })),
            "Broken" => anyhow::bail!("Jikan returned 500"),
            _ => Ok(None),
        }
    }
}

const ANSWER: &str = "Akira, Unknown Gem\n|||neon psychic chaos|||a hidden favourite";

fn state(answer: Answer, policy: UnmatchedTitlePolicy) -> AppState {
    let config = Config {
        unmatched_policy: policy,
        ..Default::default()
    };
    let options = PipelineOptions {
        top_k: 5,
        budget: ContextBudget::unlimited(),
        retrieval_timeout: Duration::from_secs(1),
        retry: RetryPolicy::none(),
    };
    let pipeline = RecommendationPipeline::new(
        Arc::new(StaticRetriever(vec![Document::new("Title: Akira..")])),
        Arc::new(StaticRetriever(vec![Document::new("Title: Trigun..")])),
        Arc::new(FixedGenerator(answer)),
        options,
    );
    let jikan = Arc::new(JikanClient::new(
        reqwest::Client::new(),
        config.catalog.clone(),
    ));
    AppState::from_parts(config, pipeline, Arc::new(FakeCatalog), jikan)
}

fn recommend_query(query: &str, enrich: bool) -> Query<RecommendQuery> {
    Query(RecommendQuery {
        query: query.to_string(),
        enrich,
    })
}

#[tokio::test]
async fn test_recommend_empty_query_is_bad_request() {
    let state = state(Answer::Text(ANSWER), UnmatchedTitlePolicy::Placeholder);
    let (status, Json(body)) = api::recommend::recommend(State(state), recommend_query("  ", false))
        .await
        .unwrap_err();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_recommend_generation_failure_is_bad_gateway() {
    let state = state(Answer::Unavailable, UnmatchedTitlePolicy::Placeholder);
    let (status, Json(body)) =
        api::recommend::recommend(State(state), recommend_query("neon city", false))
            .await
            .unwrap_err();

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_recommend_without_enrichment() {
    let state = state(Answer::Text(ANSWER), UnmatchedTitlePolicy::Placeholder);
    let Json(resp) = api::recommend::recommend(State(state), recommend_query("neon city", false))
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.query, "neon city");
    assert_eq!(resp.count, 2);
    assert_eq!(resp.titles, vec!["Akira", "Unknown Gem"]);
    assert_eq!(resp.explanations[1], "a hidden favourite");
    assert!(resp.recommendations.iter().all(|c| c.metadata.is_none()));
}

#[tokio::test]
async fn test_enrich_placeholder_keeps_unmatched_cards() {
    let state = state(Answer::Text(ANSWER), UnmatchedTitlePolicy::Placeholder);
    let Json(resp) = api::recommend::recommend(State(state), recommend_query("neon city", true))
        .await
        .unwrap();

    assert_eq!(resp.recommendations.len(), 2);
    assert_eq!(resp.recommendations[0].details_available, Some(true));
    assert_eq!(resp.recommendations[1].title, "Unknown Gem");
    assert_eq!(resp.recommendations[1].details_available, Some(false));

    let json = serde_json::to_value(&resp).unwrap();
    assert!(json["recommendations"][1]["metadata"].is_null());
}

#[tokio::test]
async fn test_enrich_omit_drops_cards_but_keeps_parsed_lists() {
    let state = state(Answer::Text(ANSWER), UnmatchedTitlePolicy::Omit);
    let Json(resp) = api::recommend::recommend(State(state), recommend_query("neon city", true))
        .await
        .unwrap();

    assert_eq!(resp.count, 2);
    assert_eq!(resp.titles, vec!["Akira", "Unknown Gem"]);
    assert_eq!(resp.explanations.len(), 2);
    assert_eq!(resp.recommendations.len(), 1);
    assert_eq!(resp.recommendations[0].title, "Akira");
    assert_eq!(
        resp.recommendations[0].metadata.as_ref().map(|m| m.score),
        Some(Some(8.16))
    );
}

#[tokio::test]
async fn test_metadata_found() {
    let state = state(Answer::Text(ANSWER), UnmatchedTitlePolicy::Placeholder);
    let Json(resp) = api::catalog::metadata(
        State(state),
        Query(MetadataQuery {
            title: "Akira".into(),
        }),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["found"], true);
    assert_eq!(json["title"], "Akira");
    assert_eq!(json["url"], "https://myanimelist.net/anime/47");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_metadata_miss_reports_not_found() {
    let state = state(Answer::Text(ANSWER), UnmatchedTitlePolicy::Placeholder);
    let Json(resp) = api::catalog::metadata(
        State(state),
        Query(MetadataQuery {
            title: "Unknown Gem".into(),
        }),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["found"], false);
    assert_eq!(json["error"], "Not found");
}

#[tokio::test]
async fn test_metadata_lookup_failure_is_not_an_http_error() {
    let state = state(Answer::Text(ANSWER), UnmatchedTitlePolicy::Placeholder);
    let Json(resp) = api::catalog::metadata(
        State(state),
        Query(MetadataQuery {
            title: "Broken".into(),
        }),
    )
    .await
    .unwrap();

    assert!(!resp.found);
    assert_eq!(resp.error.as_deref(), Some("Details unavailable"));
}

#[tokio::test]
async fn test_metadata_empty_title_is_bad_request() {
    let state = state(Answer::Text(ANSWER), UnmatchedTitlePolicy::Placeholder);
    let (status, _) = api::catalog::metadata(
        State(state),
        Query(MetadataQuery {
            title: " ".into(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
