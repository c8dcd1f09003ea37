// Candidate intake: slot collection, tech stack validation, question/answer
// phase, persistence and export.
// All LLM calls go through llm_client; no direct HTTP calls here.

pub mod conversation;
pub mod export;
pub mod handlers;
pub mod questions;
pub mod record;
pub mod service;
pub mod session;
pub mod slots;
pub mod store;
pub mod translator;
pub mod validator;

#[cfg(test)]
pub mod testing;
