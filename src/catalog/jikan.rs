//! Jikan (unofficial MyAnimeList) API client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CatalogConfig;
use crate::models::{AnimeMetadata, TopAnime, TopCharacter};

/// Catalog lookup for a recommended title. "Not found" is `Ok(None)`.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(&self, title: &str) -> Result<Option<AnimeMetadata>>;
}

pub struct JikanClient {
    client: reqwest::Client,
    config: CatalogConfig,
}

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Deserialize)]
struct JikanAnime {
    url: String,
    title: String,
    title_english: Option<String>,
    score: Option<f64>,
    rank: Option<usize>,
    images: Option<JikanImages>,
}

#[derive(Deserialize)]
struct JikanImages {
    jpg: Option<JikanImage>,
}

#[derive(Deserialize)]
struct JikanImage {
    large_image_url: Option<String>,
    image_url: Option<String>,
}

#[derive(Deserialize)]
struct JikanCharacter {
    name: String,
    favorites: Option<u64>,
}

impl JikanAnime {
    fn display_title(&self) -> String {
        self.title_english
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title)
            .to_string()
    }

    fn into_metadata(self) -> AnimeMetadata {
        let display_title = self.display_title();
        let image = self
            .images
            .and_then(|i| i.jpg)
            .and_then(|jpg| jpg.large_image_url.or(jpg.image_url));
        AnimeMetadata {
            image,
            score: self.score,
            url: self.url,
            display_title,
        }
    }
}

impl JikanClient {
    pub fn new(client: reqwest::Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Page<T>> {
        let resp = self
            .client
            .get(self.url(path))
            .timeout(self.config.timeout())
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to call Jikan {path}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Jikan {path} returned {status}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse Jikan {path} response"))
    }

    /// Fetch top-ranked anime, re-numbered 1..=n in rank order.
    pub async fn top_anime(&self, limit: usize) -> Result<Vec<TopAnime>> {
        let items: Vec<JikanAnime> = self.collect_pages("/top/anime", limit).await?;
        Ok(rank_top_anime(items, limit))
    }

    /// Fetch the most favorited characters.
    pub async fn top_characters(&self, limit: usize) -> Result<Vec<TopCharacter>> {
        let items: Vec<JikanCharacter> = self.collect_pages("/top/characters", limit).await?;
        Ok(items
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, c)| TopCharacter {
                rank: i + 1,
                name: c.name,
                favorites: c.favorites,
            })
            .collect())
    }

    async fn collect_pages<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        limit: usize,
    ) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1u32;

        while all.len() < limit {
            let resp: Page<T> = self.get_page(path, &[("page", page.to_string())]).await?;
            let has_next = resp.pagination.map(|p| p.has_next_page).unwrap_or(false);
            let fetched = resp.data.len();
            all.extend(resp.data);
            if !has_next || fetched == 0 {
                break;
            }
            page += 1;
        }

        Ok(all)
    }
}

#[async_trait]
impl MetadataLookup for JikanClient {
    async fn lookup(&self, title: &str) -> Result<Option<AnimeMetadata>> {
        let page: Page<JikanAnime> = self
            .get_page("/anime", &[("q", title.to_string()), ("limit", "1".to_string())])
            .await?;
        Ok(first_match(page))
    }
}

fn first_match(page: Page<JikanAnime>) -> Option<AnimeMetadata> {
    page.data.into_iter().next().map(JikanAnime::into_metadata)
}

fn rank_top_anime(mut items: Vec<JikanAnime>, limit: usize) -> Vec<TopAnime> {
    // Unranked entries sort last
    items.sort_by_key(|a| a.rank.unwrap_or(usize::MAX));
    items
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, a)| TopAnime {
            rank: i + 1,
            title: a.display_title(),
            score: a.score,
        })
        .collect()
}
