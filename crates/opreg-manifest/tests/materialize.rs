//! End-to-end materialization of the etcd package into a manifest tree.

mod common;

use common::{etcd_package, tree_listing};
use opreg_manifest::{
    read_manifest, ErrorKind, Manifest, ManifestBuilder, ManifestError, ManifestLayout,
};
use opreg_schema::{ClusterServiceVersion, CrdKey, CustomResourceDefinition};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[test]
fn etcd_manifest_matches_registry_layout() {
    let registry = tempfile::tempdir().unwrap();
    let package = etcd_package();
    let mut manifest = ManifestBuilder::new(&package, registry.path());
    manifest.create().unwrap();

    let manifest_dir = registry.path().join("etcd");
    assert!(manifest_dir.is_dir());
    assert!(manifest_dir.join("etcd.package.yaml").is_file());

    // Hard coded on purpose: the expected layout must not be derived from the
    // same code that produced it.
    let expected: BTreeMap<&str, Vec<&str>> = BTreeMap::from([
        (
            "0.6.1",
            vec![
                "etcdclusters.etcd.database.coreos.com.crd.yaml",
                "etcdoperator.v0.6.1.csv.yaml",
            ],
        ),
        (
            "0.9.0",
            vec![
                "etcdbackups.etcd.database.coreos.com.crd.yaml",
                "etcdclusters.etcd.database.coreos.com.crd.yaml",
                "etcdoperator.v0.9.0.csv.yaml",
                "etcdrestores.etcd.database.coreos.com.crd.yaml",
            ],
        ),
        (
            "0.9.2",
            vec![
                "etcdbackups.etcd.database.coreos.com.crd.yaml",
                "etcdclusters.etcd.database.coreos.com.crd.yaml",
                "etcdoperator.v0.9.2.csv.yaml",
                "etcdrestores.etcd.database.coreos.com.crd.yaml",
            ],
        ),
    ]);

    let mut expected_listing = vec![PathBuf::from("etcd.package.yaml")];
    for (version, files) in &expected {
        expected_listing.push(PathBuf::from(version));
        for file in files {
            expected_listing.push(PathBuf::from(version).join(file));
        }
    }
    expected_listing.sort();
    assert_eq!(tree_listing(&manifest_dir), expected_listing);

    manifest.delete().unwrap();
    assert!(!manifest_dir.exists());
}

#[test]
fn written_documents_parse_back_to_the_model() {
    let registry = tempfile::tempdir().unwrap();
    let package = etcd_package();
    ManifestBuilder::new(&package, registry.path())
        .create()
        .unwrap();

    let tree = read_manifest(&registry.path().join("etcd")).unwrap();
    assert_eq!(tree.package, package.package);
    assert_eq!(tree.bundles.len(), package.cluster_service_versions.len());
    for (bundle, csv) in tree.bundles.iter().zip(&package.cluster_service_versions) {
        assert_eq!(&bundle.csv, csv);
        for crd in &bundle.crds {
            let source = package
                .custom_resource_definitions
                .iter()
                .find(|c| c.key() == crd.key())
                .expect("written CRD must come from the package");
            assert_eq!(crd, source);
        }
    }

    let mut rebuilt = tree.into_package();
    let mut original = package.clone();
    rebuilt
        .custom_resource_definitions
        .sort_by_key(CustomResourceDefinition::key);
    original
        .custom_resource_definitions
        .sort_by_key(CustomResourceDefinition::key);
    assert_eq!(rebuilt, original);
}

#[test]
fn nonexistent_registry_dir_fails_and_creates_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let registry = scratch.path().join("badir");
    let package = etcd_package();
    let mut manifest = ManifestBuilder::new(&package, &registry);

    let err = manifest.create().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!registry.exists());
    assert!(tree_listing(scratch.path()).is_empty());
    manifest.delete().unwrap();
}

#[cfg(unix)]
#[test]
fn unwritable_registry_dir_fails() {
    use std::os::unix::fs::PermissionsExt;

    let scratch = tempfile::tempdir().unwrap();
    let registry = scratch.path().join("readonly");
    std::fs::create_dir(&registry).unwrap();
    std::fs::set_permissions(&registry, std::fs::Permissions::from_mode(0o500)).unwrap();

    // Privileged users bypass mode bits; nothing to observe then.
    if std::fs::write(registry.join("writable"), b"").is_ok() {
        return;
    }

    let package = etcd_package();
    let mut manifest = ManifestBuilder::new(&package, &registry);
    let err = manifest.create().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(
        err.io_error_kind(),
        Some(std::io::ErrorKind::PermissionDenied)
    );
    std::fs::set_permissions(&registry, std::fs::Permissions::from_mode(0o700)).unwrap();
    assert!(tree_listing(&registry).is_empty());
}

#[test]
fn missing_owned_crd_names_csv_and_key_and_stops() {
    let registry = tempfile::tempdir().unwrap();
    let mut package = etcd_package();
    // drop the backups CRD, owned by 0.9.0 and 0.9.2
    package
        .custom_resource_definitions
        .retain(|crd| crd.spec.names.kind != "EtcdBackup");

    let mut manifest = ManifestBuilder::new(&package, registry.path());
    let err = manifest.create().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
    match &err {
        ManifestError::UnresolvedReference { csv, key } => {
            assert_eq!(csv, "etcdoperator.v0.9.0");
            assert_eq!(
                key,
                &CrdKey::new("etcdbackups.etcd.database.coreos.com", "v1beta2", "EtcdBackup")
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("etcdoperator.v0.9.0"));
    assert!(msg.contains("etcdbackups.etcd.database.coreos.com"));

    let layout = ManifestLayout::new(registry.path(), "etcd");
    assert!(layout.csv_file("0.6.1", "etcdoperator.v0.6.1").is_file());
    assert!(!layout.csv_file("0.9.0", "etcdoperator.v0.9.0").exists());
    assert!(!layout.bundle_dir("0.9.2").exists());

    manifest.delete().unwrap();
    assert!(!layout.manifest_dir().exists());
}

#[test]
fn csv_without_version_aborts_create() {
    let registry = tempfile::tempdir().unwrap();
    let mut package = etcd_package();
    package
        .cluster_service_versions
        .insert(1, ClusterServiceVersion::new("etcdoperator.vnext", None));

    let mut manifest = ManifestBuilder::new(&package, registry.path());
    let err = manifest.create().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingVersion);
    assert_eq!(err.csv(), Some("etcdoperator.vnext"));

    let layout = ManifestLayout::new(registry.path(), "etcd");
    assert!(layout.bundle_dir("0.6.1").is_dir());
    assert!(!layout.bundle_dir("0.9.0").exists());
    manifest.delete().unwrap();
}

#[test]
fn duplicate_versions_fail() {
    let registry = tempfile::tempdir().unwrap();
    let mut package = etcd_package();
    let mut twin = package.cluster_service_versions[0].clone();
    twin.metadata.name = "etcdoperator.v0.6.1-rebuild".to_owned();
    package.cluster_service_versions.push(twin);

    let mut manifest = ManifestBuilder::new(&package, registry.path());
    let err = manifest.create().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.csv(), Some("etcdoperator.v0.6.1-rebuild"));
    assert_eq!(err.io_error_kind(), Some(std::io::ErrorKind::AlreadyExists));
    manifest.delete().unwrap();
}

#[test]
fn delete_twice_and_without_create_never_errors() {
    let registry = tempfile::tempdir().unwrap();
    let package = etcd_package();

    let mut untouched = ManifestBuilder::new(&package, registry.path());
    untouched.delete().unwrap();
    untouched.delete().unwrap();

    let mut manifest = ManifestBuilder::new(&package, registry.path());
    manifest.create().unwrap();
    manifest.delete().unwrap();
    manifest.delete().unwrap();
    assert!(tree_listing(registry.path()).is_empty());
}

#[test]
fn one_package_shared_by_two_builders() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let package = etcd_package();

    let mut a = ManifestBuilder::new(&package, first.path());
    let mut b = ManifestBuilder::new(&package, second.path());
    a.create().unwrap();
    b.create().unwrap();
    assert_eq!(
        tree_listing(&first.path().join("etcd")),
        tree_listing(&second.path().join("etcd"))
    );

    a.delete().unwrap();
    assert!(second.path().join("etcd").is_dir());
    b.delete().unwrap();
}

#[test]
fn builders_are_usable_as_trait_objects() {
    let registry = tempfile::tempdir().unwrap();
    let package = etcd_package();
    let mut manifests: Vec<Box<dyn Manifest + '_>> =
        vec![Box::new(ManifestBuilder::new(&package, registry.path()))];
    for m in &mut manifests {
        m.create().unwrap();
    }
    for m in &mut manifests {
        m.delete().unwrap();
    }
    assert!(!registry.path().join("etcd").exists());
}
