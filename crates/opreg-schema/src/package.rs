use crate::crd::{crd_map, CrdMap, CustomResourceDefinition};
use crate::csv::ClusterServiceVersion;
use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A subscription channel pointing at the CSV currently served on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageChannel {
    pub name: String,
    #[serde(rename = "currentCSV")]
    pub current_csv: String,
}

/// The package descriptor written as `<package>.package.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub package_name: String,
    #[serde(default)]
    pub channels: Vec<PackageChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<String>,
}

impl PackageManifest {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            channels: Vec::new(),
            default_channel: None,
        }
    }

    #[must_use]
    pub fn with_channel(mut self, name: &str, current_csv: &str) -> Self {
        if self.default_channel.is_none() {
            self.default_channel = Some(name.to_owned());
        }
        self.channels.push(PackageChannel {
            name: name.to_owned(),
            current_csv: current_csv.to_owned(),
        });
        self
    }
}

/// Everything known about one operator package: its descriptor, its releases
/// in order, and the CRDs those releases may own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperatorPackage {
    pub package: PackageManifest,
    #[serde(default)]
    pub cluster_service_versions: Vec<ClusterServiceVersion>,
    #[serde(default)]
    pub custom_resource_definitions: Vec<CustomResourceDefinition>,
}

impl OperatorPackage {
    pub fn new(package: PackageManifest) -> Self {
        Self {
            package,
            cluster_service_versions: Vec::new(),
            custom_resource_definitions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_csv(mut self, csv: ClusterServiceVersion) -> Self {
        self.cluster_service_versions.push(csv);
        self
    }

    #[must_use]
    pub fn with_crd(mut self, crd: CustomResourceDefinition) -> Self {
        self.custom_resource_definitions.push(crd);
        self
    }

    #[inline]
    pub fn package_id(&self) -> &str {
        &self.package.package_name
    }

    pub fn crd_map(&self) -> CrdMap<'_> {
        crd_map(&self.custom_resource_definitions)
    }
}

pub fn parse_package_str(input: &str) -> Result<OperatorPackage, SchemaError> {
    let package: OperatorPackage = serde_yaml_ng::from_str(input)?;
    if package.package_id().trim().is_empty() {
        return Err(SchemaError::EmptyPackageName);
    }
    Ok(package)
}

pub fn parse_package_file(path: impl AsRef<Path>) -> Result<OperatorPackage, SchemaError> {
    let content = fs::read_to_string(path)?;
    parse_package_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CrdKey;

    const ETCD: &str = include_str!("../testdata/etcd.yaml");

    #[test]
    fn parses_etcd_fixture() {
        let package = parse_package_str(ETCD).expect("should parse");
        assert_eq!(package.package_id(), "etcd");
        assert_eq!(package.package.default_channel.as_deref(), Some("alpha"));
        assert_eq!(package.package.channels[0].current_csv, "etcdoperator.v0.9.2");
        assert_eq!(package.cluster_service_versions.len(), 3);
        assert_eq!(package.custom_resource_definitions.len(), 3);

        let versions: Vec<_> = package
            .cluster_service_versions
            .iter()
            .filter_map(ClusterServiceVersion::version)
            .collect();
        assert_eq!(versions, ["0.6.1", "0.9.0", "0.9.2"]);
    }

    #[test]
    fn every_owned_key_in_fixture_resolves() {
        let package = parse_package_str(ETCD).unwrap();
        let map = package.crd_map();
        for csv in &package.cluster_service_versions {
            for key in csv.owned_crd_keys() {
                assert!(map.contains_key(&key), "{key} owned by {} unresolved", csv.name());
            }
        }
    }

    #[test]
    fn rejects_empty_package_name() {
        let input = r"
package:
  packageName: ''
";
        assert!(matches!(
            parse_package_str(input),
            Err(SchemaError::EmptyPackageName)
        ));
    }

    #[test]
    fn rejects_missing_package_section() {
        let input = r"
clusterServiceVersions: []
";
        assert!(matches!(
            parse_package_str(input),
            Err(SchemaError::ParseYaml(_))
        ));
    }

    #[test]
    fn parse_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            parse_package_file(&missing),
            Err(SchemaError::Io(_))
        ));
    }

    #[test]
    fn builder_helpers_compose_a_package() {
        let key = CrdKey::new("widgets.example.com", "v1", "Widget");
        let package = OperatorPackage::new(
            PackageManifest::new("widget").with_channel("stable", "widget.v1.0.0"),
        )
        .with_crd(CustomResourceDefinition::new(
            "example.com",
            "v1",
            "Widget",
            "widgets",
        ))
        .with_csv(ClusterServiceVersion::new("widget.v1.0.0", Some("1.0.0")).owning(key.clone()));

        assert_eq!(package.package_id(), "widget");
        assert_eq!(package.package.default_channel.as_deref(), Some("stable"));
        assert!(package.crd_map().contains_key(&key));
    }

    #[test]
    fn package_manifest_uses_registry_field_names() {
        let manifest = PackageManifest::new("etcd").with_channel("alpha", "etcdoperator.v0.9.2");
        let yaml = serde_yaml_ng::to_string(&manifest).unwrap();
        assert!(yaml.contains("packageName: etcd"));
        assert!(yaml.contains("currentCSV: etcdoperator.v0.9.2"));
        assert!(yaml.contains("defaultChannel: alpha"));
    }
}
