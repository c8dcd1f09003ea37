//! Tech stack plausibility check, delegated to the LLM.

use tracing::debug;

use crate::llm_client::prompts::{ASSISTANT_SYSTEM, TECH_STACK_VALIDATION_TEMPLATE};
use crate::llm_client::{ChatModel, LlmError};

/// Asks the model whether `tech_stack` names a plausible stack.
///
/// One call per attempt, no retries. Any reply that does not contain "yes"
/// (case-insensitive) counts as a rejection.
pub async fn validate_tech_stack(llm: &dyn ChatModel, tech_stack: &str) -> Result<bool, LlmError> {
    let prompt = TECH_STACK_VALIDATION_TEMPLATE.replace("{tech_stack}", tech_stack);
    let reply = llm.complete(ASSISTANT_SYSTEM, &prompt).await?;
    let valid = reply_affirms(&reply);
    debug!("Tech stack '{tech_stack}' judged valid={valid} (reply: {reply:?})");
    Ok(valid)
}

/// Fuzzy yes/no reading of a model reply. Substring match, so "Yes." and
/// "yes, it is" both pass.
pub fn reply_affirms(reply: &str) -> bool {
    reply.to_lowercase().contains("yes")
}
