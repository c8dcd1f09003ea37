//! CandidateRecord: slot values in slot order plus the technical answers.
//!
//! Serialized as a flat JSON object: one key per slot, then `"Technical Answers"`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::intake::slots::SlotPlan;

pub const TECHNICAL_ANSWERS_KEY: &str = "Technical Answers";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct CandidateRecord {
    fields: Vec<(String, String)>,
    technical_answers: Vec<String>,
}

impl CandidateRecord {
    /// Creates a record with every slot present and empty.
    pub fn for_plan(plan: &SlotPlan) -> Self {
        Self {
            fields: plan.iter().map(|s| (s.key.clone(), String::new())).collect(),
            technical_answers: Vec::new(),
        }
    }

    /// Sets a field, appending it if the key is new.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn technical_answers(&self) -> &[String] {
        &self.technical_answers
    }

    pub fn attach_answers(&mut self, answers: Vec<String>) {
        self.technical_answers = answers;
    }
}

impl Serialize for CandidateRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(TECHNICAL_ANSWERS_KEY, &self.technical_answers)?;
        map.end()
    }
}

impl TryFrom<Map<String, Value>> for CandidateRecord {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut record = CandidateRecord::default();
        for (key, value) in map {
            if key == TECHNICAL_ANSWERS_KEY {
                record.technical_answers = serde_json::from_value(value)
                    .map_err(|e| format!("'{TECHNICAL_ANSWERS_KEY}' must be a list of strings: {e}"))?;
                continue;
            }
            match value {
                Value::String(s) => record.fields.push((key, s)),
                other => return Err(format!("field '{key}' must be a string, got {other}")),
            }
        }
        Ok(record)
    }
}
