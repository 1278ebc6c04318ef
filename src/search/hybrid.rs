use std::collections::HashSet;

use crate::models::Document;

/// Separator placed between document bodies in the assembled context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Merge dense and sparse results into one deduplicated list.
///
/// Dense results come first, then sparse. Documents are deduplicated by exact
/// `content` equality; the first occurrence wins and keeps its position, so
/// survivors are biased toward the dense ranking. Metadata is not part of
/// identity. No truncation is applied.
pub fn merge(dense: Vec<Document>, sparse: Vec<Document>) -> Vec<Document> {
    let mut seen: HashSet<String> = HashSet::with_capacity(dense.len() + sparse.len());
    let mut merged = Vec::with_capacity(dense.len() + sparse.len());

    for doc in dense.into_iter().chain(sparse) {
        if seen.insert(doc.content.clone()) {
            merged.push(doc);
        }
    }

    merged
}

/// Join document bodies in order, separated by one blank line.
pub fn assemble(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Upper bound on assembled context size, in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextBudget {
    pub max_chars: Option<usize>,
}

impl ContextBudget {
    pub fn unlimited() -> Self {
        Self { max_chars: None }
    }

    pub fn chars(max_chars: usize) -> Self {
        Self {
            max_chars: Some(max_chars),
        }
    }
}

/// Trim `docs` so that `assemble` of the result fits the budget.
///
/// Whole documents are kept in rank order and the lowest-ranked ones are
/// dropped first. If the top document alone is over the cap it is cut on a
/// char boundary, so a non-empty input never produces an empty context.
pub fn apply_budget(docs: Vec<Document>, budget: ContextBudget) -> Vec<Document> {
    let Some(max_chars) = budget.max_chars else {
        return docs;
    };

    let sep_chars = CONTEXT_SEPARATOR.chars().count();
    let mut used = 0usize;
    let mut kept = Vec::new();

    for mut doc in docs {
        let doc_chars = doc.content.chars().count();
        let cost = if kept.is_empty() {
            doc_chars
        } else {
            doc_chars + sep_chars
        };

        if used + cost <= max_chars {
            used += cost;
            kept.push(doc);
            continue;
        }

        if kept.is_empty() && max_chars > 0 {
            doc.content = truncate_chars(&doc.content, max_chars).to_string();
            kept.push(doc);
        }
        break;
    }

    kept
}

/// Truncate `text` to at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> Document {
        Document::new(content)
    }

    fn contents(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.content.as_str()).collect()
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge(vec![], vec![]).is_empty());
        assert_eq!(assemble(&[]), "");
    }

    #[test]
    fn test_single_source_degrades_gracefully() {
        let dense_only = merge(vec![doc("a"), doc("b")], vec![]);
        assert_eq!(contents(&dense_only), vec!["a", "b"]);

        let sparse_only = merge(vec![], vec![doc("c"), doc("d")]);
        assert_eq!(contents(&sparse_only), vec!["c", "d"]);
    }

    #[test]
    fn test_dense_first_occurrence_wins() {
        let dense = vec![
            doc("Cowboy Bebop...").with_metadata("source", "dense"),
            doc("Akira...").with_metadata("source", "dense"),
        ];
        let sparse = vec![
            doc("Akira...").with_metadata("source", "sparse"),
            doc("Trigun...").with_metadata("source", "sparse"),
        ];

        let merged = merge(dense, sparse);
        assert_eq!(
            contents(&merged),
            vec!["Cowboy Bebop...", "Akira...", "Trigun..."]
        );
        assert_eq!(merged[1].metadata["source"], "dense");
        assert_eq!(
            assemble(&merged),
            "Cowboy Bebop...\n\nAkira...\n\nTrigun..."
        );
    }

    #[test]
    fn test_duplicates_within_one_source_collapse() {
        let merged = merge(vec![doc("x"), doc("y"), doc("x")], vec![doc("y")]);
        assert_eq!(contents(&merged), vec!["x", "y"]);
    }

    #[test]
    fn test_no_fuzzy_dedup() {
        let merged = merge(vec![doc("Akira")], vec![doc("Akira "), doc("akira")]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_disjoint_sets_are_not_truncated() {
        let dense: Vec<_> = (0..5).map(|i| doc(&format!("d{i}"))).collect();
        let sparse: Vec<_> = (0..5).map(|i| doc(&format!("s{i}"))).collect();
        assert_eq!(merge(dense, sparse).len(), 10);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let a = vec![doc("one"), doc("two")];
        let b = vec![doc("two"), doc("three")];
        let first = assemble(&merge(a.clone(), b.clone()));
        let second = assemble(&merge(a, b));
        assert_eq!(first, second);
    }

    #[test]
    fn test_budget_unlimited_keeps_everything() {
        let docs = vec![doc("aaaa"), doc("bbbb")];
        assert_eq!(apply_budget(docs.clone(), ContextBudget::unlimited()), docs);
    }

    #[test]
    fn test_budget_drops_lowest_ranked_first() {
        let docs = vec![doc("aaaa"), doc("bbbb"), doc("cccc")];
        // "aaaa\n\nbbbb" is 10 chars; adding the third would need 16.
        let kept = apply_budget(docs, ContextBudget::chars(12));
        assert_eq!(contents(&kept), vec!["aaaa", "bbbb"]);
        assert!(assemble(&kept).chars().count() <= 12);
    }

    #[test]
    fn test_budget_exact_fit() {
        let docs = vec![doc("aaaa"), doc("bbbb")];
        let kept = apply_budget(docs, ContextBudget::chars(10));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_budget_truncates_oversized_top_document() {
        let docs = vec![doc("ありがとうございます"), doc("short")];
        let kept = apply_budget(docs, ContextBudget::chars(4));
        assert_eq!(contents(&kept), vec!["ありがと"]);
    }

    #[test]
    fn test_budget_zero_yields_nothing() {
        let kept = apply_budget(vec![doc("abc")], ContextBudget::chars(0));
        assert!(kept.is_empty());
    }
}
