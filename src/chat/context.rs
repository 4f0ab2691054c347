use crate::collaborators::SearchResult;

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that answers questions using \
the web search results and the earlier conversation provided with each question. Prefer facts \
from the search results, mention the source URL when you rely on one, and say so plainly when \
the provided material does not answer the question.";

/// Builds the user turn sent to the model: search results, recalled history, then the question.
pub fn build_user_content(
    search_results: &[SearchResult],
    retrieved_context: &[String],
    query: &str,
) -> String {
    let mut content = String::from("# Web search results\n");
    if search_results.is_empty() {
        content.push_str("(no results)\n");
    }
    for (index, result) in search_results.iter().enumerate() {
        content.push_str(&format!(
            "{}. {}\n   {}\n   Source: {}\n",
            index + 1,
            result.title,
            result.snippet,
            result.url
        ));
    }

    content.push_str("\n# Related conversation history\n");
    if retrieved_context.is_empty() {
        content.push_str("(none)\n");
    }
    for snippet in retrieved_context {
        content.push_str(&format!("- {}\n", snippet.replace('\n', "\n  ")));
    }

    content.push_str(&format!("\n# Question\n{}", query));
    content
}
