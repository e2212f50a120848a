// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

use std::sync::Arc;

use exports::consts::BANNER;
use exports::{Error, Export, ExportConfig, Reload};

fn export(id: i64, name: &str) -> Export {
    Export {
        id,
        name: name.into(),
        fs: "nfs".into(),
        path: format!("/volumes/{name}"),
        access: "RW".into(),
        protocols: vec![3, 4],
        clients: vec!["10.69.0.0/16".into()],
    }
}

#[test]
fn missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path().join("exports.conf"), Reload::Disabled);
    assert_eq!(config.read(|store| store.len()).unwrap(), 0);
    assert!(!dir.path().join("exports.conf").exists());
}

#[test]
fn modify_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports.conf");
    let config = ExportConfig::new(&path, Reload::Disabled);

    assert!(config.modify(|store| store.add(&export(1, "a"))).unwrap());
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(BANNER));
    assert!(text.contains("PSEUDO = \"a\";"));

    assert!(config.modify(|store| store.update(1, "RO", &[4], &["@admins".to_string()])).unwrap());
    let shown = config
        .read(|store| store.find_by_id(1).and_then(Export::from_block))
        .unwrap()
        .unwrap();
    assert_eq!(shown.access, "RO");
    assert_eq!(shown.protocols, [4]);
    assert_eq!(shown.clients, ["@admins"]);
}

#[test]
fn failed_modify_leaves_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports.conf");
    let config = ExportConfig::new(&path, Reload::Disabled);

    assert!(config.modify(|store| store.add(&export(1, "a"))).unwrap());
    let before = std::fs::read_to_string(&path).unwrap();

    assert!(!config.modify(|store| store.add(&export(1, "b"))).unwrap());
    assert!(!config.modify(|store| store.remove(2)).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn store_follows_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports.conf");
    let config = ExportConfig::new(&path, Reload::Disabled);
    assert!(config.modify(|store| store.add(&export(1, "a"))).unwrap());

    // Changes made by someone else are picked up on the next operation.
    std::fs::write(&path, "").unwrap();
    assert_eq!(config.read(|store| store.ids()).unwrap(), Vec::<i64>::new());
}

#[test]
fn unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports.conf");
    std::fs::write(&path, "EXPORT { EXPORT_ID = 1 }").unwrap();
    let config = ExportConfig::new(&path, Reload::Disabled);

    let err = config.read(|store| store.len()).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));

    let err = config.modify(|_| true).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "EXPORT { EXPORT_ID = 1 }"
    );
}

#[test]
fn reload_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports.conf");
    let reload = Reload::Signal(dir.path().join("missing.pid"));
    let config = ExportConfig::new(&path, reload);

    assert!(config.modify(|store| store.add(&export(1, "a"))).unwrap());
    assert!(path.exists());
}

#[test]
fn concurrent_adds() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(ExportConfig::new(
        dir.path().join("exports.conf"),
        Reload::Disabled,
    ));

    let handles: Vec<_> = (1..=8)
        .map(|id| {
            let config = Arc::clone(&config);
            std::thread::spawn(move || {
                let name = format!("share{id}");
                config.modify(|store| store.add(&export(id, &name))).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    let mut ids = config.read(|store| store.ids()).unwrap();
    ids.sort();
    assert_eq!(ids, (1..=8).collect::<Vec<i64>>());
}

#[test]
fn modify_replaces_file() {
    use std::io::Read;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports.conf");
    let config = ExportConfig::new(&path, Reload::Disabled);
    assert!(config.modify(|store| store.add(&export(1, "a"))).unwrap());
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let before = std::fs::read_to_string(&path).unwrap();
    let inode = std::fs::metadata(&path).unwrap().ino();
    let mut old = std::fs::File::open(&path).unwrap();

    assert!(config.modify(|store| store.add(&export(2, "b"))).unwrap());

    // The old file is left whole; a new one takes its name.
    let mut old_text = String::new();
    old.read_to_string(&mut old_text).unwrap();
    assert_eq!(old_text, before);

    let meta = std::fs::metadata(&path).unwrap();
    assert_ne!(meta.ino(), inode);
    assert_eq!(meta.permissions().mode() & 0o777, 0o644);
    assert!(std::fs::read_to_string(&path).unwrap().contains("PSEUDO = \"b\";"));

    // No temporary files are left behind.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn relative_path() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let config = ExportConfig::new("exports.conf", Reload::Disabled);
    assert!(config.modify(|store| store.add(&export(1, "a"))).unwrap());
    assert!(dir.path().join("exports.conf").exists());
}
