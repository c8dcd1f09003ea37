// Shared prompt constants for every LLM call TalentScout makes.
// Templates use `{placeholder}` markers filled with `str::replace`.

/// Default system instruction for conversational calls.
pub const ASSISTANT_SYSTEM: &str = "You are a helpful assistant.";

/// Persona prompt used to open a conversation.
pub const GREETING_PROMPT: &str = "\
You are TalentBot, a friendly and professional hiring assistant chatbot for TalentScout. \
Greet the candidate and explain that you'll collect their basic info and ask relevant \
technical questions based on their tech stack.";

/// Sent when the candidate uses a conversation-ending word.
pub const FAREWELL_PROMPT: &str = "\
The candidate said a conversation-ending word. Politely thank them and let them know \
the next steps. End the conversation.";

/// Yes/No plausibility check for a free-text tech stack.
pub const TECH_STACK_VALIDATION_TEMPLATE: &str = "\
Is '{tech_stack}' a valid tech stack (combination of programming languages, frameworks, \
or tools)? Just reply Yes or No.";

pub const QUESTION_GENERATION_TEMPLATE: &str = "\
Generate exactly 5 technical interview questions based on this tech stack: {tech_stack}.
Include a mix of theoretical and practical questions.
Format the questions as a numbered list.";

pub const TRANSLATION_SYSTEM: &str = "\
You are a translation engine. Translate the user's text faithfully. \
Reply with the translated text only: no quotes, no notes, no explanations. \
Keep numbering, line breaks and emoji exactly as they appear.";

pub const TRANSLATION_TEMPLATE: &str = "\
Translate the following text into the language with ISO 639-1 code '{language}':

{text}";

/// Used when the model cannot produce a greeting.
pub const FALLBACK_GREETING: &str = "\
Hello! I'm TalentBot, the TalentScout hiring assistant. I'll collect a few details \
about you and then ask some technical questions based on your tech stack.";

/// Used when the model cannot produce a farewell.
pub const FALLBACK_FAREWELL: &str = "\
Thank you for your time! Our recruitment team will review your details and get back \
to you with the next steps.";
