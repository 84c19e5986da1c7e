//! Shared jar fixture builders for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

pub const VULNERABLE_CLASS_ENTRY: &str =
    "org/apache/logging/log4j/core/lookup/JndiLookup.class";
pub const BUILD_DESCRIPTOR_ENTRY: &str =
    "META-INF/maven/org.apache.logging.log4j/log4j-core/pom.properties";

/// Write a jar at `path` with the given entry names and bodies.
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("create jar fixture");
    let mut writer = zip::ZipWriter::new(file);
    for (name, body) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("start entry");
        writer.write_all(body).expect("write entry");
    }
    writer.finish().expect("finish jar");
}

/// Jar bytes suitable for embedding as a nested entry.
pub fn jar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("start entry");
        writer.write_all(body).expect("write entry");
    }
    writer.finish().expect("finish jar").into_inner()
}

/// A jar carrying the vulnerable lookup class.
pub fn vulnerable_jar(path: &Path) {
    write_jar(
        path,
        &[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            (VULNERABLE_CLASS_ENTRY, b"\xca\xfe\xba\xbe"),
        ],
    );
}

/// A jar with no log4j content at all.
pub fn clean_jar(path: &Path) {
    write_jar(
        path,
        &[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            ("com/example/App.class", b"\xca\xfe\xba\xbe"),
        ],
    );
}

/// A jar whose build descriptor records an exempt version.
pub fn exempt_jar(path: &Path) {
    write_jar(
        path,
        &[
            (VULNERABLE_CLASS_ENTRY, b"\xca\xfe\xba\xbe"),
            (BUILD_DESCRIPTOR_ENTRY, b"version=2.16.0\n"),
        ],
    );
}
