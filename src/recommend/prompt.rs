/// Number of titles the generator is asked to return.
pub const RECOMMENDATION_COUNT: usize = 3;

/// Answer the generator is told to give when the context cannot support a
/// recommendation. It has no title/body structure, so it parses to nothing.
pub const INSUFFICIENT_DATA_ANSWER: &str = "INSUFFICIENT DATA";

/// Render the recommendation prompt for a retrieved context and user query.
pub fn build_recommendation_prompt(context: &str, question: &str) -> String {
    let context = if context.trim().is_empty() {
        "(No matching anime were retrieved for this query.)"
    } else {
        context
    };

    format!(
        "You are an anime recommendation engine. Suggest exactly {RECOMMENDATION_COUNT} anime \
         that match the user's query, using ONLY the anime described in the context below.\n\n\
         RULES:\n\
         1. No introductory or closing remarks.\n\
         2. The response MUST begin with the title line.\n\
         3. If the context does not contain enough information to recommend anything, reply \
         with exactly \"{INSUFFICIENT_DATA_ANSWER}\" and nothing else. Never invent titles.\n\n\
         OUTPUT FORMAT:\n\
         - Line 1: Title 1, Title 2, Title 3 (comma-separated, official titles).\n\
         - Then, on the next line, the delimiter \"|||\".\n\
         - Then one analysis per title, in the same order as line 1, each followed by \"|||\".\n\
         Each analysis covers:\n\
         **[TITLE]**\n\
         **THEMATIC CORE**: 2-3 sentences on the emotional or philosophical heart of the show.\n\
         **VIBE ALIGNMENT**: how specific parts of the query map to the show's tropes or structure.\n\
         **AESTHETIC & PACE**: art style, animation quality and storytelling tempo.\n\n\
         EXAMPLE:\n\
         Cowboy Bebop, Psycho-Pass, Akira\n\
         |||\n\
         **[Cowboy Bebop]**\n\
         **THEMATIC CORE**: ...\n\
         **VIBE ALIGNMENT**: ...\n\
         **AESTHETIC & PACE**: ...\n\
         |||\n\
         **[Psycho-Pass]**\n\
         ...\n\
         |||\n\
         **[Akira]**\n\
         ...\n\n\
         CONTEXT:\n{context}\n\n\
         USER QUERY: {question}\n\n\
         RESPONSE:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_context_and_question() {
        let prompt = build_recommendation_prompt("Title: Akira.. Overview: Neo-Tokyo", "cyberpunk");
        assert!(prompt.contains("Title: Akira.. Overview: Neo-Tokyo"));
        assert!(prompt.contains("USER QUERY: cyberpunk"));
        assert!(prompt.contains("|||"));
    }

    #[test]
    fn test_empty_context_is_called_out() {
        let prompt = build_recommendation_prompt("  ", "anything");
        assert!(prompt.contains("No matching anime were retrieved"));
        assert!(prompt.contains(INSUFFICIENT_DATA_ANSWER));
    }

    #[test]
    fn test_insufficient_answer_parses_to_nothing() {
        assert!(crate::recommend::parser::parse(INSUFFICIENT_DATA_ANSWER).is_empty());
    }
}
