use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::form::ParsedForm;

pub const EMAIL_FIELD: &str = "email";
pub const STORAGE_KEY_EXTENSION: &str = "json";

/// Additional field names to capture alongside `email`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    names: Vec<String>,
}

impl FieldList {
    /// Parses a comma-separated list. Names are trimmed; blanks and repeats are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in raw.split(',').map(str::trim) {
            if name.is_empty() || names.iter().any(|existing| existing == name) {
                continue;
            }
            names.push(name.to_string());
        }
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to serialize output record: {0}")]
pub struct SerializeError(#[from] serde_json::Error);

/// Field name to single value mapping that gets persisted as a JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct OutputRecord {
    fields: BTreeMap<String, String>,
}

impl OutputRecord {
    /// Every configured field is present; absent form fields become `""`.
    /// `email` is written last so it always reflects the submitted email.
    pub fn assemble(form: &ParsedForm, additional_fields: &FieldList) -> Self {
        let mut fields = BTreeMap::new();
        for name in additional_fields.names() {
            fields.insert(name.clone(), first_or_empty(form, name));
        }
        fields.insert(EMAIL_FIELD.to_string(), first_or_empty(form, EMAIL_FIELD));
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl From<BTreeMap<String, String>> for OutputRecord {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

fn first_or_empty(form: &ParsedForm, name: &str) -> String {
    form.first(name).unwrap_or_default().to_string()
}

pub fn storage_key(id: &str) -> String {
    format!("{id}.{STORAGE_KEY_EXTENSION}")
}
