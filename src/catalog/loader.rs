use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::models::Document;

/// One row of the anime dataset.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnimeRecord {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Genres", default)]
    pub genres: String,
    #[serde(alias = "sypnopsis", alias = "Synopsis", default)]
    pub synopsis: String,
}

impl AnimeRecord {
    /// A record is usable only when every field has text.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.genres, &self.synopsis]
            .iter()
            .all(|f| !f.trim().is_empty())
    }

    pub fn to_document(&self) -> Document {
        let name = self.name.trim();
        let genres = self.genres.trim();
        Document::new(format!(
            "Title: {name}.. Overview: {} Genres: {genres}",
            self.synopsis.trim()
        ))
        .with_metadata("title", name)
        .with_metadata("genres", genres)
    }
}

/// Header names accepted for each required column.
const NAME_COLUMNS: &[&str] = &["Name", "name"];
const GENRES_COLUMNS: &[&str] = &["Genres", "genres"];
const SYNOPSIS_COLUMNS: &[&str] = &["sypnopsis", "Synopsis", "synopsis"];

/// Load the dataset from disk.
///
/// `.json` files hold an array of records; anything else is read as CSV with
/// a header row. Malformed CSV rows are skipped.
pub fn load_records(path: &Path) -> Result<Vec<AnimeRecord>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus {}", path.display()))?;
        return serde_json::from_str(&data).context("Corpus is not a JSON array of anime records");
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to read corpus {}", path.display()))?;
    read_csv(file)
}

/// Read records from CSV, skipping rows that fail to parse.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<AnimeRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Corpus CSV has no header row")?
        .clone();
    for (column, accepted) in [
        ("Name", NAME_COLUMNS),
        ("Genres", GENRES_COLUMNS),
        ("sypnopsis", SYNOPSIS_COLUMNS),
    ] {
        anyhow::ensure!(
            headers.iter().any(|h| accepted.contains(&h.trim())),
            "Corpus CSV is missing the '{column}' column"
        );
    }

    let mut records = Vec::new();
    let mut bad_rows = 0usize;
    for row in csv_reader.deserialize::<AnimeRecord>() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => {
                bad_rows += 1;
                tracing::debug!("Skipping malformed corpus row: {e}");
            }
        }
    }

    if bad_rows > 0 {
        tracing::warn!("Skipped {bad_rows} malformed CSV rows");
    }
    Ok(records)
}

/// Convert complete records to documents, skipping incomplete rows.
pub fn to_documents(records: &[AnimeRecord]) -> Vec<Document> {
    let docs: Vec<Document> = records
        .iter()
        .filter(|r| r.is_complete())
        .map(AnimeRecord::to_document)
        .collect();

    let skipped = records.len() - docs.len();
    if skipped > 0 {
        tracing::warn!("Skipped {skipped} incomplete anime records");
    }
    docs
}
