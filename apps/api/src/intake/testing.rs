//! Scripted `ChatModel` fake shared by the intake tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::IntakeSettings;
use crate::intake::export::SummaryExporter;
use crate::intake::session::SessionRegistry;
use crate::intake::slots::{SlotDescriptor, SlotPlan, EMAIL_ADDRESS, FULL_NAME, TECH_STACK};
use crate::intake::store::CandidateStore;
use crate::llm_client::{ChatModel, LlmError};
use crate::state::AppState;

pub const GREETING: &str = "Hello from TalentBot!";
pub const FAREWELL: &str = "Goodbye from TalentBot!";

pub fn five_questions() -> String {
    "Sure! Here you go:\n\
     1. What is the GIL?\n\
     2. Explain Django middleware.\n\
     3. How do you optimise ORM queries?\n\
     4. Describe a REST API you built.\n\
     5. How do you test async views?"
        .to_string()
}

/// Replies for one kind of prompt. `None` entries fail with a 503.
#[derive(Default)]
struct Script {
    queue: VecDeque<Option<String>>,
    fallback: Option<String>,
}

impl Script {
    fn ok(text: &str) -> Self {
        Self {
            queue: VecDeque::new(),
            fallback: Some(text.to_string()),
        }
    }

    fn next(&mut self) -> Result<String, LlmError> {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
            .ok_or(LlmError::Api {
                status: 503,
                message: "scripted outage".to_string(),
            })
    }
}

struct Scripts {
    greeting: Script,
    farewell: Script,
    validation: Script,
    questions: Script,
    translation_ok: bool,
}

/// Routes each prompt by its template wording and records every prompt sent.
pub struct ScriptedModel {
    scripts: Mutex<Scripts>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(Scripts {
                greeting: Script::ok(GREETING),
                farewell: Script::ok(FAREWELL),
                validation: Script::ok("Yes"),
                questions: Script::ok(&five_questions()),
                translation_ok: true,
            }),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn validation_reply(self, reply: &str) -> Self {
        self.scripts.lock().unwrap().validation = Script::ok(reply);
        self
    }

    /// Queued validation replies, consumed before the fallback ("Yes").
    pub fn validation_replies(self, replies: &[Option<&str>]) -> Self {
        self.scripts.lock().unwrap().validation.queue =
            replies.iter().map(|r| r.map(str::to_string)).collect();
        self
    }

    pub fn questions_reply(self, reply: &str) -> Self {
        self.scripts.lock().unwrap().questions = Script::ok(reply);
        self
    }

    pub fn questions_replies(self, replies: &[Option<&str>]) -> Self {
        self.scripts.lock().unwrap().questions.queue =
            replies.iter().map(|r| r.map(str::to_string)).collect();
        self
    }

    pub fn without_greeting(self) -> Self {
        self.scripts.lock().unwrap().greeting = Script::default();
        self
    }

    pub fn without_farewell(self) -> Self {
        self.scripts.lock().unwrap().farewell = Script::default();
        self
    }

    pub fn without_translation(self) -> Self {
        self.scripts.lock().unwrap().translation_ok = false;
        self
    }

    /// Every call fails.
    pub fn failing(self) -> Self {
        {
            let mut scripts = self.scripts.lock().unwrap();
            scripts.greeting = Script::default();
            scripts.farewell = Script::default();
            scripts.validation = Script::default();
            scripts.questions = Script::default();
            scripts.translation_ok = false;
        }
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.prompts().iter().filter(|p| p.contains(needle)).count()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut scripts = self.scripts.lock().unwrap();

        if prompt.starts_with("Translate the following") {
            if !scripts.translation_ok {
                return Err(LlmError::EmptyContent);
            }
            let text = prompt.split_once(":\n\n").map(|(_, t)| t).unwrap_or(prompt);
            Ok(format!("[translated] {text}"))
        } else if prompt.contains("Greet the candidate") {
            scripts.greeting.next()
        } else if prompt.contains("conversation-ending word") {
            scripts.farewell.next()
        } else if prompt.contains("valid tech stack") {
            scripts.validation.next()
        } else if prompt.contains("interview questions") {
            scripts.questions.next()
        } else {
            Err(LlmError::EmptyContent)
        }
    }
}

/// App state over a three-slot plan (name, email, tech stack) rooted in `dir`.
pub fn test_state(model: Arc<ScriptedModel>, dir: &Path) -> AppState {
    AppState {
        llm: model,
        sessions: SessionRegistry::new(),
        store: Arc::new(CandidateStore::new(dir.join("candidates.json"))),
        exporter: Arc::new(SummaryExporter::new(dir.join("exports"))),
        plan: Arc::new(
            SlotPlan::new(vec![
                SlotDescriptor::text(FULL_NAME),
                SlotDescriptor::text(EMAIL_ADDRESS),
                SlotDescriptor::tech_stack(TECH_STACK),
            ])
            .expect("valid test plan"),
        ),
        intake: IntakeSettings::default(),
        default_language: "en".to_string(),
    }
}
