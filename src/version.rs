//! Version-based exemption for the packaged log4j-core line.
//!
//! Versions that ship with the JNDI lookup disabled (2.16 and later, plus
//! the 1.x line that never carried the lookup class) are exempt. A version
//! string that cannot be parsed is treated as affected.

/// First major line where exemption depends on the minor segment.
const WATERSHED_MAJOR: u32 = 2;

/// First minor of the watershed major with the lookup disabled by default.
const SAFE_MINOR: u32 = 16;

/// Returns true when `version` is exempt from the lookup exposure.
///
/// Only the major and minor segments matter. Both must be plain ASCII
/// digits; anything else fails the gate.
pub fn is_exempt(version: &str) -> bool {
    let mut segments = version.split('.');
    let Some(major) = segments.next().and_then(parse_segment) else {
        return false;
    };
    if major < WATERSHED_MAJOR {
        return true;
    }
    if major > WATERSHED_MAJOR {
        return false;
    }
    match segments.next().and_then(parse_segment) {
        Some(minor) => minor >= SAFE_MINOR,
        None => false,
    }
}

fn parse_segment(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Strip RPM epoch and release decorations from an EVR string.
///
/// `1:2.14.1-1.el8` becomes `2.14.1`.
pub fn normalize_package_version(evr: &str) -> &str {
    let without_epoch = match evr.split_once(':') {
        Some((epoch, rest)) if epoch.bytes().all(|b| b.is_ascii_digit()) => rest,
        _ => evr,
    };
    match without_epoch.split_once('-') {
        Some((version, _release)) => version,
        None => without_epoch,
    }
}

/// Extract the version from a `log4j-core-<version>.jar` file name.
pub fn version_from_archive_name(name: &str) -> Option<&str> {
    let stem = name.strip_suffix(".jar")?;
    let version = stem.strip_prefix("log4j-core-")?;
    if version.is_empty() {
        return None;
    }
    Some(version)
}

/// Extract the `version=` property from a build descriptor body.
pub fn version_from_descriptor(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    for line in text.lines() {
        if let Some(value) = line.trim().strip_prefix("version=") {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
