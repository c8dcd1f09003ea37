//! Presentation hook for bot messages: identity by default, LLM translation
//! when a session selects a non-default language.

use std::sync::Arc;

use tracing::warn;

use crate::llm_client::prompts::{TRANSLATION_SYSTEM, TRANSLATION_TEMPLATE};
use crate::llm_client::{ChatModel, LlmError};

/// Translates `text` into `language` (ISO 639-1 code).
pub async fn translate(
    llm: &dyn ChatModel,
    text: &str,
    language: &str,
) -> Result<String, LlmError> {
    let prompt = TRANSLATION_TEMPLATE
        .replace("{language}", language)
        .replace("{text}", text);
    let translated = llm.complete(TRANSLATION_SYSTEM, &prompt).await?;
    Ok(translated.trim().to_string())
}

/// Decorates every outgoing bot message for one session.
/// A bare ISO 639-style code: two or three ASCII letters.
pub fn is_language_code(code: &str) -> bool {
    (2..=3).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphabetic())
}

#[derive(Clone)]
pub enum Presenter {
    Identity,
    Translate {
        llm: Arc<dyn ChatModel>,
        language: String,
    },
}

impl Presenter {
    /// Picks identity when `language` is the default (or empty), translation otherwise.
    pub fn for_language(llm: Arc<dyn ChatModel>, language: &str, default_language: &str) -> Self {
        let language = language.trim();
        if language.is_empty() || language.eq_ignore_ascii_case(default_language) {
            Presenter::Identity
        } else {
            Presenter::Translate {
                llm,
                language: language.to_ascii_lowercase(),
            }
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Presenter::Identity => None,
            Presenter::Translate { language, .. } => Some(language),
        }
    }

    /// Best effort: on translation failure the original text is returned.
    pub async fn present(&self, text: &str) -> String {
        match self {
            Presenter::Identity => text.to_string(),
            Presenter::Translate { llm, language } => {
                match translate(llm.as_ref(), text, language).await {
                    Ok(translated) if !translated.is_empty() => translated,
                    Ok(_) => text.to_string(),
                    Err(e) => {
                        warn!("Translation to '{language}' failed, showing original text: {e}");
                        text.to_string()
                    }
                }
            }
        }
    }
}
