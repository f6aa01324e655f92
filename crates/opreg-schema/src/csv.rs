use crate::crd::CrdKey;
use crate::object::{ExtraFields, ObjectMeta};
use serde::{Deserialize, Serialize};

pub const CSV_API_VERSION: &str = "operators.coreos.com/v1alpha1";
pub const CSV_KIND: &str = "ClusterServiceVersion";

/// A CRD reference inside a CSV's `customresourcedefinitions` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrdDescription {
    pub name: String,
    pub version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl CrdDescription {
    pub fn key(&self) -> CrdKey {
        CrdKey::new(self.name.clone(), self.version.clone(), self.kind.clone())
    }
}

impl From<CrdKey> for CrdDescription {
    fn from(key: CrdKey) -> Self {
        Self {
            name: key.name,
            version: key.version,
            kind: key.kind,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomResourceDefinitions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owned: Vec<CrdDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<CrdDescription>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CsvSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
    #[serde(default)]
    pub customresourcedefinitions: CustomResourceDefinitions,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// One release of an operator package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersion {
    #[serde(default = "default_csv_api_version")]
    pub api_version: String,
    #[serde(default = "default_csv_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: CsvSpec,
}

impl ClusterServiceVersion {
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            api_version: default_csv_api_version(),
            kind: default_csv_kind(),
            metadata: ObjectMeta::named(name),
            spec: CsvSpec {
                version: version.map(str::to_owned),
                ..Default::default()
            },
        }
    }

    #[must_use]
    pub fn owning(mut self, key: CrdKey) -> Self {
        self.spec.customresourcedefinitions.owned.push(key.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The release version exactly as written, or `None` when it is missing or blank.
    pub fn version(&self) -> Option<&str> {
        self.spec
            .version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }

    pub fn owned_crd_keys(&self) -> Vec<CrdKey> {
        self.spec
            .customresourcedefinitions
            .owned
            .iter()
            .map(CrdDescription::key)
            .collect()
    }

    pub fn required_crd_keys(&self) -> Vec<CrdKey> {
        self.spec
            .customresourcedefinitions
            .required
            .iter()
            .map(CrdDescription::key)
            .collect()
    }
}

fn default_csv_api_version() -> String {
    CSV_API_VERSION.to_owned()
}

fn default_csv_kind() -> String {
    CSV_KIND.to_owned()
}
