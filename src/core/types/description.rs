//! Structured field descriptions, as found in compiler-emitted contract JSON

use serde::{Deserialize, Serialize};

/// One input/output entry of a contract description
///
/// Nested tuples carry their members in `components`; `type` then reads
/// `tuple`, `tuple[]`, `tuple[N]` and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescription {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<FieldDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl FieldDescription {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Self::default()
        }
    }

    pub fn with_components(mut self, components: Vec<FieldDescription>) -> Self {
        self.components = components;
        self
    }

    pub fn with_internal_type(mut self, label: impl Into<String>) -> Self {
        self.internal_type = Some(label.into());
        self
    }

    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }
}
