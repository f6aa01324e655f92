use crate::object::{ExtraFields, ObjectMeta};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const CRD_API_VERSION: &str = "apiextensions.k8s.io/v1beta1";
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// Identity of a custom resource definition as referenced from a CSV.
///
/// `name` is the fully qualified `<plural>.<group>` name, so together with
/// `version` and `kind` it pins down group, version and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CrdKey {
    pub name: String,
    pub version: String,
    pub kind: String,
}

impl CrdKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// API group encoded in the qualified name, e.g. `etcd.database.coreos.com`.
    pub fn group(&self) -> &str {
        self.name.split_once('.').map_or("", |(_, group)| group)
    }
}

impl fmt::Display for CrdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.name, self.version, self.kind)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrdNames {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub plural: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_kind: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CrdSpec {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub names: CrdNames,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A custom resource definition document owned by one or more CSVs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinition {
    #[serde(default = "default_crd_api_version")]
    pub api_version: String,
    #[serde(default = "default_crd_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: CrdSpec,
}

impl CustomResourceDefinition {
    pub fn new(group: &str, version: &str, kind: &str, plural: &str) -> Self {
        Self {
            api_version: default_crd_api_version(),
            kind: default_crd_kind(),
            metadata: ObjectMeta::named(format!("{plural}.{group}")),
            spec: CrdSpec {
                group: group.to_owned(),
                version: version.to_owned(),
                names: CrdNames {
                    kind: kind.to_owned(),
                    plural: plural.to_owned(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn key(&self) -> CrdKey {
        CrdKey::new(
            self.metadata.name.clone(),
            self.spec.version.clone(),
            self.spec.names.kind.clone(),
        )
    }
}

/// Lookup table from key to every definition carrying it, borrowed from a package.
///
/// A well-formed package has exactly one definition per key; duplicates are
/// kept so that a reference to them can be reported as ambiguous.
pub type CrdMap<'a> = HashMap<CrdKey, Vec<&'a CustomResourceDefinition>>;

pub fn crd_map(crds: &[CustomResourceDefinition]) -> CrdMap<'_> {
    let mut map = CrdMap::new();
    for crd in crds {
        map.entry(crd.key()).or_default().push(crd);
    }
    map
}

fn default_crd_api_version() -> String {
    CRD_API_VERSION.to_owned()
}

fn default_crd_kind() -> String {
    CRD_KIND.to_owned()
}
