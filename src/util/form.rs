//! Field state for credential forms.

use std::collections::BTreeMap;

/// Plain field-to-value form state with replacement-only updates.
///
/// Setting a field replaces that field's value and nothing else; reading it back
/// immediately yields the value that was set. Used to collect sign-in and sign-up
/// input before handing it to the auth API.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    fields: BTreeMap<String, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value of a single field, leaving every other field untouched.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
