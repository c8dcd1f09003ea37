//! Interview question generation for a validated tech stack.

use tracing::{info, warn};

use crate::llm_client::prompts::{ASSISTANT_SYSTEM, QUESTION_GENERATION_TEMPLATE};
use crate::llm_client::{ChatModel, LlmError};

/// Number of questions requested from the model; also the upper bound kept.
pub const QUESTION_COUNT: usize = 5;

/// Requests questions for `tech_stack` and extracts the numbered lines.
///
/// Fewer than `QUESTION_COUNT` parsed questions is tolerated. A reply with no
/// numbered line at all is reported as `LlmError::EmptyContent`.
pub async fn generate_questions(
    llm: &dyn ChatModel,
    tech_stack: &str,
) -> Result<Vec<String>, LlmError> {
    let prompt = QUESTION_GENERATION_TEMPLATE.replace("{tech_stack}", tech_stack);
    let reply = llm.complete(ASSISTANT_SYSTEM, &prompt).await?;
    let questions = parse_numbered_questions(&reply);

    if questions.is_empty() {
        warn!("Question generation for '{tech_stack}' returned no numbered lines");
        return Err(LlmError::EmptyContent);
    }
    if questions.len() < QUESTION_COUNT {
        warn!(
            "Question generation returned {} of {} questions; continuing with fewer",
            questions.len(),
            QUESTION_COUNT
        );
    }
    info!("Generated {} questions for '{tech_stack}'", questions.len());
    Ok(questions)
}

/// Keeps lines whose first non-whitespace character is a decimal digit,
/// trimmed, at most `QUESTION_COUNT` of them.
pub fn parse_numbered_questions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        // ASCII digits only; numbering in other scripts is not recognised.
        .filter(|line| line.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .take(QUESTION_COUNT)
        .map(str::to_string)
        .collect()
}
