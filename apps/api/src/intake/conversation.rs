//! Conversation state machine — walks the slot plan, validates the tech stack,
//! then runs the bounded question/answer phase.
//!
//! Flow: NotStarted → CollectingSlot(1..=N) → [AwaitingTechStackRetry]* →
//!       GeneratingQuestions → AnsweringQuestion(0..Q) → Ended
//!
//! A termination keyword anywhere in the input ends the conversation from any
//! non-terminal phase, before any slot or answer handling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::IntakeSettings;
use crate::intake::questions::generate_questions;
use crate::intake::record::CandidateRecord;
use crate::intake::slots::{SlotKind, SlotPlan};
use crate::intake::validator::validate_tech_stack;
use crate::llm_client::prompts::{
    ASSISTANT_SYSTEM, FALLBACK_FAREWELL, FALLBACK_GREETING, FAREWELL_PROMPT, GREETING_PROMPT,
};
use crate::llm_client::{ChatModel, LlmError};

/// Case-insensitive substring triggers. "byy" is a common typo of "bye".
pub const TERMINATION_KEYWORDS: &[&str] = &["bye", "exit", "quit", "thank you", "byy"];

pub const COMPLETION_MESSAGE: &str =
    "Thanks! All your answers have been recorded. Our team will get back to you soon. 😊";

pub const ABANDONED_MESSAGE: &str = "We've reached the maximum number of attempts for this step, \
so we'll stop here. Feel free to start a new conversation whenever you're ready.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    /// 1-based slot position.
    CollectingSlot(usize),
    /// The tech stack was rejected; the next input re-enters it.
    AwaitingTechStackRetry,
    /// Tech stack accepted but questions not generated yet (upstream failure).
    GeneratingQuestions,
    /// 0-based question index.
    AnsweringQuestion(usize),
    Ended,
}

/// Why a conversation reached `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Completed,
    Farewell,
    Abandoned,
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("conversation has already ended")]
    Ended,

    #[error("upstream model call failed: {0}")]
    Upstream(#[from] LlmError),
}

/// One exchange. Observational only; never read back by the state machine.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub user: String,
    pub replies: Vec<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub replies: Vec<String>,
    /// Set on the turn that answered the last question.
    pub completed: bool,
}

/// State for a single candidate conversation. Owns the record being built.
#[derive(Debug, Clone)]
pub struct Conversation {
    plan: Arc<SlotPlan>,
    settings: IntakeSettings,
    phase: Phase,
    end_reason: Option<EndReason>,
    record: CandidateRecord,
    questions: Vec<String>,
    answers: Vec<String>,
    tech_stack_rejections: u32,
    short_answer_rejections: u32,
    transcript: Vec<Turn>,
    persisted: bool,
    exported: bool,
}

pub fn contains_termination_keyword(input: &str) -> bool {
    let lowered = input.to_lowercase();
    TERMINATION_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

impl Conversation {
    pub fn new(plan: Arc<SlotPlan>, settings: IntakeSettings) -> Self {
        let record = CandidateRecord::for_plan(&plan);
        Self {
            plan,
            settings,
            phase: Phase::NotStarted,
            end_reason: None,
            record,
            questions: Vec::new(),
            answers: Vec::new(),
            tech_stack_rejections: 0,
            short_answer_rejections: 0,
            transcript: Vec::new(),
            persisted: false,
            exported: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// 1-based slot position currently being filled, if any.
    pub fn current_slot(&self) -> Option<usize> {
        match self.phase {
            Phase::CollectingSlot(i) => Some(i),
            Phase::AwaitingTechStackRetry => Some(self.plan.len()),
            _ => None,
        }
    }

    pub fn record(&self) -> &CandidateRecord {
        &self.record
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// The finished record, once every question has been answered.
    pub fn completed_record(&self) -> Option<&CandidateRecord> {
        (self.end_reason == Some(EndReason::Completed)).then_some(&self.record)
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn mark_persisted(&mut self) {
        self.persisted = true;
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn mark_exported(&mut self) {
        self.exported = true;
    }

    /// Runs one turn. On `Err` the phase is left as it was so the same input
    /// can be resent.
    pub async fn handle_turn(
        &mut self,
        llm: &dyn ChatModel,
        input: &str,
    ) -> Result<TurnOutcome, TurnError> {
        if self.is_ended() {
            return Err(TurnError::Ended);
        }

        let replies = if contains_termination_keyword(input) {
            self.farewell(llm).await
        } else {
            match self.phase {
                Phase::NotStarted => self.start(llm).await,
                Phase::CollectingSlot(i) if i < self.plan.len() => self.fill_slot(i, input),
                Phase::CollectingSlot(_) | Phase::AwaitingTechStackRetry => {
                    self.submit_tech_stack(llm, input).await?
                }
                Phase::GeneratingQuestions => self.prepare_questions(llm).await?,
                Phase::AnsweringQuestion(j) => self.answer_question(j, input),
                Phase::Ended => return Err(TurnError::Ended),
            }
        };

        let completed = self.end_reason == Some(EndReason::Completed) && !self.persisted;
        self.transcript.push(Turn {
            user: input.to_string(),
            replies: replies.clone(),
            at: Utc::now(),
        });

        Ok(TurnOutcome { replies, completed })
    }

    async fn start(&mut self, llm: &dyn ChatModel) -> Vec<String> {
        let greeting = match llm.complete(ASSISTANT_SYSTEM, GREETING_PROMPT).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Greeting generation failed, using fallback: {e}");
                FALLBACK_GREETING.to_string()
            }
        };
        self.phase = Phase::CollectingSlot(1);
        vec![greeting, self.slot_prompt(1)]
    }

    async fn farewell(&mut self, llm: &dyn ChatModel) -> Vec<String> {
        let farewell = match llm.complete(ASSISTANT_SYSTEM, FAREWELL_PROMPT).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Farewell generation failed, using fallback: {e}");
                FALLBACK_FAREWELL.to_string()
            }
        };
        info!("Conversation ended by candidate during {:?}", self.phase);
        self.end(EndReason::Farewell);
        vec![farewell]
    }

    fn fill_slot(&mut self, position: usize, input: &str) -> Vec<String> {
        let Some(slot) = self.plan.get(position) else {
            return Vec::new();
        };
        debug_assert_eq!(slot.kind, SlotKind::Text);
        let acknowledgment = slot.acknowledgment();
        self.record.set(&slot.key, input);
        self.phase = Phase::CollectingSlot(position + 1);
        vec![acknowledgment, self.slot_prompt(position + 1)]
    }

    async fn submit_tech_stack(
        &mut self,
        llm: &dyn ChatModel,
        input: &str,
    ) -> Result<Vec<String>, TurnError> {
        let slot = self.plan.tech_stack().clone();
        // Stored before validation; a rejected value stays until overwritten.
        self.record.set(&slot.key, input);

        if !validate_tech_stack(llm, input).await? {
            self.tech_stack_rejections += 1;
            warn!(
                "Tech stack rejected ({} so far): '{input}'",
                self.tech_stack_rejections
            );
            if exceeds(self.tech_stack_rejections, self.settings.max_tech_stack_attempts) {
                self.end(EndReason::Abandoned);
                return Ok(vec![ABANDONED_MESSAGE.to_string()]);
            }
            self.phase = Phase::AwaitingTechStackRetry;
            return Ok(vec![format!(
                "❌ '{input}' is not a valid tech stack. Please try again with something like \
                 Python + Django, Java + Spring, etc.\n\nCan you please re-enter your {}?",
                slot.key
            )]);
        }

        self.phase = Phase::GeneratingQuestions;
        let mut replies = vec![slot.acknowledgment()];
        replies.extend(self.prepare_questions(llm).await?);
        Ok(replies)
    }

    async fn prepare_questions(&mut self, llm: &dyn ChatModel) -> Result<Vec<String>, TurnError> {
        let tech_stack = self
            .record
            .get(&self.plan.tech_stack().key)
            .unwrap_or_default()
            .to_string();
        let questions = generate_questions(llm, &tech_stack).await?;

        self.questions = questions;
        self.answers.clear();
        self.short_answer_rejections = 0;
        self.phase = Phase::AnsweringQuestion(0);

        Ok(vec![format!(
            "✅ Thanks! Based on your tech stack, here are your questions:\n\n{}\n\nPlease answer question 1:",
            self.questions.join("\n")
        )])
    }

    fn answer_question(&mut self, index: usize, input: &str) -> Vec<String> {
        let number = index + 1;

        if input.trim().chars().count() < self.settings.min_answer_chars {
            self.short_answer_rejections += 1;
            if exceeds(self.short_answer_rejections, self.settings.max_answer_attempts) {
                self.end(EndReason::Abandoned);
                return vec![ABANDONED_MESSAGE.to_string()];
            }
            return vec![format!(
                "❌ Your answer seems too short. Please provide a more detailed answer to question {number}."
            )];
        }

        self.answers.push(input.to_string());
        self.short_answer_rejections = 0;
        let mut replies = vec![format!("Answer saved for question {number}.")];

        if number < self.questions.len() {
            self.phase = Phase::AnsweringQuestion(number);
            replies.push(format!("Please answer question {}:", number + 1));
        } else {
            self.record.attach_answers(self.answers.clone());
            self.end(EndReason::Completed);
            info!("All {} questions answered", self.answers.len());
            replies.push(COMPLETION_MESSAGE.to_string());
        }
        replies
    }

    fn slot_prompt(&self, position: usize) -> String {
        self.plan
            .get(position)
            .map(|slot| slot.prompt())
            .unwrap_or_default()
    }

    fn end(&mut self, reason: EndReason) {
        self.phase = Phase::Ended;
        self.end_reason = Some(reason);
    }
}

fn exceeds(rejections: u32, limit: Option<u32>) -> bool {
    limit.is_some_and(|max| rejections >= max)
}
