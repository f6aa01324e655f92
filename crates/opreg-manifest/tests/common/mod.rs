//! Fixtures shared by the manifest integration tests.
//!
//! Every test builds its own package value; nothing is cached across tests.

#![allow(dead_code)]

use opreg_schema::{parse_package_str, OperatorPackage};
use std::fs;
use std::path::{Path, PathBuf};

const ETCD_PACKAGE: &str = include_str!("../../../opreg-schema/testdata/etcd.yaml");

/// The etcd operator package: three CSVs (0.6.1, 0.9.0, 0.9.2) and three CRDs.
pub fn etcd_package() -> OperatorPackage {
    parse_package_str(ETCD_PACKAGE).expect("etcd fixture must parse")
}

/// Every file and directory below `root`, relative to it, sorted.
pub fn tree_listing(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            out.push(path.strip_prefix(root).unwrap().to_path_buf());
            if path.is_dir() {
                walk(root, &path, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
