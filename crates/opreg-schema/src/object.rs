use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields a document carries that the model does not name explicitly.
///
/// Kept verbatim so that writing a document back out loses nothing.
pub type ExtraFields = BTreeMap<String, serde_yaml_ng::Value>;

/// The subset of Kubernetes object metadata the registry format relies on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
