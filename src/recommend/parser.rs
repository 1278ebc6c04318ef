use crate::models::StructuredRecommendation;

/// Token separating individual explanations in the answer body.
pub const EXPLANATION_DELIMITER: &str = "|||";

/// Parse the generator's raw answer into positional `(title, explanation)` pairs.
///
/// Expected shape: a comma-separated title line, a newline, then explanations
/// separated by `|||`. A body without any `|||` carries no explanations. The
/// parser is total: anything that does not fit degrades to fewer pairs,
/// possibly none.
pub fn parse(raw: &str) -> StructuredRecommendation {
    let (title_line, body) = raw.split_once('\n').unwrap_or((raw, ""));

    let titles = split_trimmed(title_line, ",");
    let explanations = if body.contains(EXPLANATION_DELIMITER) {
        split_trimmed(body, EXPLANATION_DELIMITER)
    } else {
        Vec::new()
    };

    if titles.len() != explanations.len() {
        tracing::debug!(
            titles = titles.len(),
            explanations = explanations.len(),
            "Answer has unequal title and explanation counts; truncating to the shorter"
        );
    }

    StructuredRecommendation::zip(titles, explanations)
}

fn split_trimmed(text: &str, delimiter: &str) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
