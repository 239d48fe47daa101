#![allow(deprecated)] // cargo_bin is deprecated but still supported by assert_cmd

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use sfbundle::format::{BundleVersion, EntryRecord, FileType, ManifestHeader, BUNDLE_SIGNATURE};
use tempfile::tempdir;

/// `[host][back-pointer][signature][host][app.dll][manifest]`
fn write_bundle(path: &Path) {
	let version = BundleVersion { major: 6, minor: 0 };
	let mut bytes = b"MZ".to_vec();
	bytes.extend([0; 8]);
	bytes.extend(BUNDLE_SIGNATURE);
	bytes.extend(b"host");

	let entry = EntryRecord::new(version, bytes.len() as i64, 8, FileType::Assembly, "app.dll");
	bytes.extend(b"ASSEMBLY");

	let manifest_offset = bytes.len() as i64;
	bytes[2..10].copy_from_slice(&manifest_offset.to_le_bytes());

	let mut header = ManifestHeader::new(version, "app-id");
	header.entry_count = 1;
	bytes.extend(header.to_vec().expect("encode header"));
	bytes.extend(entry.to_vec(version).expect("encode entry"));
	fs::write(path, bytes).expect("write fixture");
}

fn sfbundle() -> Command {
	let mut cmd = Command::cargo_bin("sfbundle").expect("sfbundle binary");
	cmd.env_remove("RUST_LOG");
	cmd
}

#[test]
fn detect_a_bundle() {
	let dir = tempdir().unwrap();
	let bundle = dir.path().join("app");
	write_bundle(&bundle);

	sfbundle()
		.arg("detect")
		.arg(&bundle)
		.assert()
		.success()
		.stdout(predicate::str::contains("bundle: yes"))
		.stdout(predicate::str::contains("signature: 10"))
		.stdout(predicate::str::contains("back-pointer: 2"))
		.stdout(predicate::str::contains("manifest: 54"));
}

#[test]
fn detect_not_a_bundle_is_not_an_error() {
	let dir = tempdir().unwrap();
	let plain = dir.path().join("plain");
	fs::write(&plain, b"nothing to see here").unwrap();

	sfbundle()
		.arg("detect")
		.arg(&plain)
		.assert()
		.success()
		.stdout("bundle: no\n");
}

#[test]
fn info_shows_the_header() {
	let dir = tempdir().unwrap();
	let bundle = dir.path().join("app");
	write_bundle(&bundle);

	sfbundle()
		.arg("info")
		.arg(&bundle)
		.assert()
		.success()
		.stdout(predicate::str::contains("version: 6.0"))
		.stdout(predicate::str::contains("bundle id: app-id"))
		.stdout(predicate::str::contains("entries: 1"));
}

#[test]
fn list_and_filter() {
	let dir = tempdir().unwrap();
	let bundle = dir.path().join("app");
	write_bundle(&bundle);

	sfbundle()
		.arg("list")
		.arg(&bundle)
		.assert()
		.success()
		.stdout("app.dll\n");

	sfbundle()
		.args(["list", "--long"])
		.arg(&bundle)
		.assert()
		.success()
		.stdout(predicate::str::contains("assembly"))
		.stdout(predicate::str::contains("app.dll"));

	sfbundle()
		.args(["list", "--filter", r"\.json$"])
		.arg(&bundle)
		.assert()
		.success()
		.stdout("");
}

#[test]
fn extract_to_stdout_and_file() {
	let dir = tempdir().unwrap();
	let bundle = dir.path().join("app");
	write_bundle(&bundle);

	sfbundle()
		.arg("extract")
		.arg(&bundle)
		.arg("APP.DLL")
		.assert()
		.success()
		.stdout("ASSEMBLY");

	let out = dir.path().join("out.dll");
	sfbundle()
		.arg("extract")
		.arg(&bundle)
		.arg("app.dll")
		.arg("--output")
		.arg(&out)
		.assert()
		.success();
	assert_eq!(fs::read(&out).unwrap(), b"ASSEMBLY");
}

#[test]
fn extract_missing_entry_fails() {
	let dir = tempdir().unwrap();
	let bundle = dir.path().join("app");
	write_bundle(&bundle);
	let out = dir.path().join("out");

	sfbundle()
		.arg("extract")
		.arg(&bundle)
		.arg("missing.dll")
		.arg("--output")
		.arg(&out)
		.assert()
		.failure()
		.stderr(predicate::str::contains("no such entry"));
	assert!(!out.exists());
}

#[test]
fn append_then_extract() {
	let dir = tempdir().unwrap();
	let bundle = dir.path().join("app");
	write_bundle(&bundle);
	let resource = dir.path().join("hello.txt");
	fs::write(&resource, b"HELLO").unwrap();
	let out = dir.path().join("app2");

	sfbundle()
		.arg("append")
		.arg(&bundle)
		.arg(&resource)
		.args(["--as", "data/hello.txt", "--output"])
		.arg(&out)
		.assert()
		.success();

	sfbundle()
		.arg("list")
		.arg(&out)
		.assert()
		.success()
		.stdout("app.dll\ndata/hello.txt\n");

	sfbundle()
		.arg("extract")
		.arg(&out)
		.arg("data/hello.txt")
		.assert()
		.success()
		.stdout("HELLO");

	sfbundle()
		.arg("info")
		.arg(&out)
		.assert()
		.success()
		.stdout(predicate::str::contains("entries: 2"));
}

#[test]
fn append_failure_leaves_no_output() {
	let dir = tempdir().unwrap();
	let plain = dir.path().join("plain");
	fs::write(&plain, b"not a bundle").unwrap();
	let out = dir.path().join("out");

	sfbundle()
		.arg("append")
		.arg(&plain)
		.arg(&plain)
		.args(["--as", "x", "--output"])
		.arg(&out)
		.assert()
		.failure()
		.stderr(predicate::str::contains("not a bundle"));

	let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
	assert_eq!(leftovers.len(), 1);
	assert!(!out.exists());
}
