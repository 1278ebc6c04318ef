use tracing_subscriber::EnvFilter;

use anime_recommender::config::Config;
use anime_recommender::ingest::build_indexes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Corpus: {}", config.corpus_path.display());
    tracing::info!(
        "Embeddings: {} {} ({})",
        config.embedding.provider,
        config.embedding.model,
        config.embedding.base_url
    );

    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let report = build_indexes(&config, &client).await?;
    tracing::info!(
        "Indexed {} of {} records into {}",
        report.documents,
        report.records,
        config.data_dir.display()
    );
    Ok(())
}
