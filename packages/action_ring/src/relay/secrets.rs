//! Masked-word substitution for relay envelopes.
//!
//! Callers put placeholder words (e.g. `WEATHER_KEY`) in their envelope and
//! the relay swaps in the configured secret, so the real value never has to
//! live in the client.

use std::collections::BTreeMap;

use regex::{NoExpand, Regex};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct SecretMasker {
    rules: Vec<(Regex, String)>,
}

impl SecretMasker {
    /// Build one case-insensitive whole-word rule per mapping.
    pub fn new(mappings: &BTreeMap<String, String>) -> Result<Self, regex::Error> {
        let rules = mappings
            .iter()
            .filter(|(word, _)| !word.is_empty())
            .map(|(word, secret)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
                Ok((Regex::new(&pattern)?, secret.clone()))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replace masked words in every string value. Object keys are left alone.
    pub fn apply(&self, value: Value) -> Value {
        if self.is_empty() {
            return value;
        }
        match value {
            Value::String(s) => Value::String(self.apply_str(&s)),
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.apply(v)).collect()),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.apply(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    pub fn apply_str(&self, input: &str) -> String {
        let mut out = input.to_string();
        for (pattern, secret) in &self.rules {
            out = pattern.replace_all(&out, NoExpand(secret)).into_owned();
        }
        out
    }
}
