use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("provider-onboarding"));
    cmd.arg("--store-file")
        .arg(dir.path().join("identity.json"))
        .arg("--db-path")
        .arg(dir.path().join("some_db"))
        .arg("--redirect-grace-ms")
        .arg("0")
        .arg("dashboard");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to file storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("provider-onboarding"));
    cmd.arg("--db-path")
        .arg(dir.path().join("test_db"))
        .arg("--redirect-grace-ms")
        .arg("0")
        .arg("dashboard");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}
