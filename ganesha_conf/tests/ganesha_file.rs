// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

use ganesha_conf::{parse, Block, ParseErrorKind, Value};
use pretty_assertions::assert_eq;

const GANESHA_CONF: &str = r#"
# Main configuration, as shipped.
%url "rados://nfs-ganesha/ns/conf-nfs"

NFS_CORE_PARAM {
    Enable_NLM = false;
    Protocols = 3, 4;
}

export {
    # Exported over NFSv4 only.
    EXPORT_ID = 10000;
    PATH = "/volumes/share";
    PSEUDO = "/share";
    ACCESS_TYPE = RW;
    PROTOCOLS = 4;
    TRANSPORTS = UDP, TCP;

    FSAL {
        NAME = CEPH;
        USER_ID = "admin";
        FILESYSTEM = "nfs";
    }

    CLIENT {
        CLIENTS = 10.69.0.0/16, 192.168.0.0/24;
    }
}
"#;

#[test]
fn parse_ganesha_conf() {
    let blocks = parse(GANESHA_CONF).unwrap();

    let expected = vec![
        Block::section("%url", "rados://nfs-ganesha/ns/conf-nfs"),
        Block::new("NFS_CORE_PARAM")
            .with_attribute("Enable_NLM", false)
            .with_attribute("Protocols", vec![3, 4]),
        Block::new("EXPORT")
            .with_attribute("EXPORT_ID", 10000)
            .with_attribute("PATH", "/volumes/share")
            .with_attribute("PSEUDO", "/share")
            .with_attribute("ACCESS_TYPE", "RW")
            .with_attribute("PROTOCOLS", 4)
            .with_attribute("TRANSPORTS", vec!["UDP", "TCP"])
            .with_child(
                Block::new("FSAL")
                    .with_attribute("NAME", "CEPH")
                    .with_attribute("USER_ID", "admin")
                    .with_attribute("FILESYSTEM", "nfs"),
            )
            .with_child(
                Block::new("CLIENT")
                    .with_attribute("CLIENTS", vec!["10.69.0.0/16", "192.168.0.0/24"]),
            ),
    ];
    assert_eq!(blocks, expected);
}

#[test]
fn reserialize_is_stable() {
    let blocks = parse(GANESHA_CONF).unwrap();
    let once: String = blocks.iter().map(|b| b.serialize(0) + "\n").collect();
    let reparsed = parse(&once).unwrap();
    let twice: String = reparsed.iter().map(|b| b.serialize(0) + "\n").collect();
    assert_eq!(once, twice);
    assert_eq!(reparsed, blocks);
}

#[test]
fn nested_lookup() {
    let blocks = parse(GANESHA_CONF).unwrap();
    let export = &blocks[2];
    assert_eq!(export.get("FILESYSTEM"), Some(&Value::from("nfs")));
    assert_eq!(export.attribute("FILESYSTEM"), None);
    assert_eq!(
        export.get("CLIENTS").and_then(Value::to_strings),
        Some(vec!["10.69.0.0/16".to_string(), "192.168.0.0/24".to_string()])
    );
}

#[test]
fn broken_file_is_rejected_whole() {
    let broken = GANESHA_CONF.replace("ACCESS_TYPE = RW;", "ACCESS_TYPE = RW");
    // The missing ';' swallows the next stanza, so the file still parses...
    let blocks = parse(&broken).unwrap();
    assert_eq!(blocks[2].attribute("ACCESS_TYPE"), Some(&Value::from("RWPROTOCOLS=4")));

    // ...but not when it is the last thing in the file.
    let broken = GANESHA_CONF.replace("192.168.0.0/24;", "192.168.0.0/24");
    let err = parse(&broken).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingSemicolon);
}
