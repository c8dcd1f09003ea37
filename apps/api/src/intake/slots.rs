//! Slot descriptors — the ordered list of intake fields the conversation fills.

use thiserror::Error;

use crate::intake::record::TECHNICAL_ANSWERS_KEY;

pub const FULL_NAME: &str = "Full Name";
pub const EMAIL_ADDRESS: &str = "Email Address";
pub const PHONE_NUMBER: &str = "Phone Number";
pub const YEARS_OF_EXPERIENCE: &str = "Years of Experience";
pub const DESIRED_POSITIONS: &str = "Desired Position(s)";
pub const CURRENT_LOCATION: &str = "Current Location";
pub const TECH_STACK: &str = "Tech Stack";

/// How a slot's input is handled once collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Stored verbatim, no checks.
    Text,
    /// Checked for plausibility by the LLM, then drives question generation.
    TechStack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDescriptor {
    /// Record field name, also used in prompts.
    pub key: String,
    /// Prompt shown to the candidate; `{key}` is replaced with the slot key.
    pub prompt_template: String,
    pub kind: SlotKind,
}

impl SlotDescriptor {
    pub fn text(key: &str) -> Self {
        Self {
            key: key.to_string(),
            prompt_template: "Can you please tell me your {key}?".to_string(),
            kind: SlotKind::Text,
        }
    }

    pub fn tech_stack(key: &str) -> Self {
        Self {
            kind: SlotKind::TechStack,
            ..Self::text(key)
        }
    }

    pub fn prompt(&self) -> String {
        self.prompt_template.replace("{key}", &self.key)
    }

    pub fn acknowledgment(&self) -> String {
        format!("Thanks for your {}!", self.key)
    }
}

/// An ordered, non-empty slot list whose last slot is the tech stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPlan {
    slots: Vec<SlotDescriptor>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotPlanError {
    #[error("slot plan must contain at least one slot")]
    Empty,
    #[error("the last slot must be the tech stack slot, found '{0}'")]
    TechStackNotLast(String),
    #[error("only the last slot may be a tech stack slot, found '{0}' earlier")]
    MisplacedTechStack(String),
    #[error("duplicate slot key '{0}'")]
    DuplicateKey(String),
    #[error("slot key '{0}' is reserved for the technical answers")]
    ReservedKey(String),
}

impl SlotPlan {
    pub fn new(slots: Vec<SlotDescriptor>) -> Result<Self, SlotPlanError> {
        let Some((last, rest)) = slots.split_last() else {
            return Err(SlotPlanError::Empty);
        };
        if last.kind != SlotKind::TechStack {
            return Err(SlotPlanError::TechStackNotLast(last.key.clone()));
        }
        if let Some(misplaced) = rest.iter().find(|s| s.kind == SlotKind::TechStack) {
            return Err(SlotPlanError::MisplacedTechStack(misplaced.key.clone()));
        }
        for (i, slot) in slots.iter().enumerate() {
            if slot.key == TECHNICAL_ANSWERS_KEY {
                return Err(SlotPlanError::ReservedKey(slot.key.clone()));
            }
            if slots[..i].iter().any(|s| s.key == slot.key) {
                return Err(SlotPlanError::DuplicateKey(slot.key.clone()));
            }
        }
        Ok(Self { slots })
    }

    /// Text slots for every key but the last, which becomes the tech stack slot.
    pub fn from_keys(keys: &[String]) -> Result<Self, SlotPlanError> {
        let Some((last, rest)) = keys.split_last() else {
            return Err(SlotPlanError::Empty);
        };
        let mut slots: Vec<SlotDescriptor> = rest.iter().map(|k| SlotDescriptor::text(k)).collect();
        slots.push(SlotDescriptor::tech_stack(last));
        Self::new(slots)
    }

    /// Number of slots (N). Slot positions are 1-based: 1..=N.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the slot at a 1-based position.
    pub fn get(&self, position: usize) -> Option<&SlotDescriptor> {
        position
            .checked_sub(1)
            .and_then(|index| self.slots.get(index))
    }

    pub fn tech_stack(&self) -> &SlotDescriptor {
        // Non-empty by construction.
        &self.slots[self.slots.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotDescriptor> {
        self.slots.iter()
    }

    pub fn keys(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.key.clone()).collect()
    }
}

impl Default for SlotPlan {
    fn default() -> Self {
        Self {
            slots: vec![
                SlotDescriptor::text(FULL_NAME),
                SlotDescriptor::text(EMAIL_ADDRESS),
                SlotDescriptor::text(PHONE_NUMBER),
                SlotDescriptor::text(YEARS_OF_EXPERIENCE),
                SlotDescriptor::text(DESIRED_POSITIONS),
                SlotDescriptor::text(CURRENT_LOCATION),
                SlotDescriptor::tech_stack(TECH_STACK),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_order() {
        let plan = SlotPlan::default();
        assert_eq!(
            plan.keys(),
            vec![
                FULL_NAME,
                EMAIL_ADDRESS,
                PHONE_NUMBER,
                YEARS_OF_EXPERIENCE,
                DESIRED_POSITIONS,
                CURRENT_LOCATION,
                TECH_STACK
            ]
        );
        assert_eq!(plan.tech_stack().kind, SlotKind::TechStack);
    }

    #[test]
    fn test_positions_are_one_based() {
        let plan = SlotPlan::default();
        assert!(plan.get(0).is_none());
        assert_eq!(plan.get(1).unwrap().key, FULL_NAME);
        assert_eq!(plan.get(7).unwrap().key, TECH_STACK);
        assert!(plan.get(8).is_none());
    }

    #[test]
    fn test_prompt_and_acknowledgment() {
        let slot = SlotDescriptor::text(EMAIL_ADDRESS);
        assert_eq!(slot.prompt(), "Can you please tell me your Email Address?");
        assert_eq!(slot.acknowledgment(), "Thanks for your Email Address!");
    }

    #[test]
    fn test_from_keys_makes_last_slot_tech_stack() {
        let keys = vec!["Name".to_string(), "Stack".to_string()];
        let plan = SlotPlan::from_keys(&keys).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.get(1).unwrap().kind, SlotKind::Text);
        assert_eq!(plan.tech_stack().key, "Stack");
        assert_eq!(SlotPlan::from_keys(&[]), Err(SlotPlanError::Empty));
    }

    #[test]
    fn test_empty_plan_rejected() {
        assert_eq!(SlotPlan::new(vec![]), Err(SlotPlanError::Empty));
    }

    #[test]
    fn test_plan_must_end_with_tech_stack() {
        let err = SlotPlan::new(vec![SlotDescriptor::text(FULL_NAME)]).unwrap_err();
        assert_eq!(err, SlotPlanError::TechStackNotLast(FULL_NAME.to_string()));
    }

    #[test]
    fn test_tech_stack_only_last() {
        let err = SlotPlan::new(vec![
            SlotDescriptor::tech_stack("Stack A"),
            SlotDescriptor::tech_stack("Stack B"),
        ])
        .unwrap_err();
        assert_eq!(err, SlotPlanError::MisplacedTechStack("Stack A".to_string()));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = SlotPlan::new(vec![
            SlotDescriptor::text(FULL_NAME),
            SlotDescriptor::text(FULL_NAME),
            SlotDescriptor::tech_stack(TECH_STACK),
        ])
        .unwrap_err();
        assert_eq!(err, SlotPlanError::DuplicateKey(FULL_NAME.to_string()));
    }

    #[test]
    fn test_technical_answers_key_is_reserved() {
        let keys = vec![TECHNICAL_ANSWERS_KEY.to_string(), TECH_STACK.to_string()];
        assert_eq!(
            SlotPlan::from_keys(&keys),
            Err(SlotPlanError::ReservedKey(TECHNICAL_ANSWERS_KEY.to_string()))
        );

        let err = SlotPlan::new(vec![
            SlotDescriptor::text(FULL_NAME),
            SlotDescriptor::tech_stack(TECHNICAL_ANSWERS_KEY),
        ])
        .unwrap_err();
        assert_eq!(err, SlotPlanError::ReservedKey(TECHNICAL_ANSWERS_KEY.to_string()));
    }
}
