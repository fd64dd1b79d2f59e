//! Build-settings extraction
//!
//! `-showBuildSettings` emits a human-readable dump, one `    KEY = VALUE`
//! line per setting, with no schema guarantee. The extractor scans line by
//! line for requested keys and splits on the FIRST `=` only, so values that
//! themselves contain `=` survive. Keys never found are simply absent; the
//! caller decides whether that is fatal.

use std::collections::HashMap;
use std::path::PathBuf;

use xcpilot_core::prelude::*;

/// Directory the built products land in
pub const TARGET_BUILD_DIR: &str = "TARGET_BUILD_DIR";
/// Full file name of the product bundle ("Demo.app")
pub const FULL_PRODUCT_NAME: &str = "FULL_PRODUCT_NAME";
/// Identifier used to install/launch the product
pub const PRODUCT_BUNDLE_IDENTIFIER: &str = "PRODUCT_BUNDLE_IDENTIFIER";

/// Pull the requested keys out of a settings dump.
///
/// A line is a candidate only if it contains ` KEY = ` for a requested key.
/// The first occurrence of a key wins.
pub fn extract(dump: &str, keys: &[&str]) -> HashMap<String, String> {
    let needles: Vec<(&str, String)> = keys.iter().map(|key| (*key, format!(" {key} = "))).collect();

    let mut found = HashMap::new();
    for line in dump.lines() {
        for (key, needle) in &needles {
            if found.contains_key(*key) || !line.contains(needle.as_str()) {
                continue;
            }
            if let Some((_, value)) = line.split_once('=') {
                found.insert((*key).to_string(), value.trim().to_string());
            }
        }
        if found.len() == keys.len() {
            break;
        }
    }
    found
}

/// The three settings the deployment pipeline consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub target_build_dir: PathBuf,
    pub full_product_name: String,
    pub bundle_identifier: String,
}

impl BuildSettings {
    /// Extract the required keys from a dump.
    ///
    /// Any of the three missing means the selected target is most likely
    /// not an executable application (a framework or library), reported as
    /// `ArtifactNotLocatable` naming the absent keys.
    pub fn from_dump(dump: &str) -> Result<Self> {
        let keys = [TARGET_BUILD_DIR, FULL_PRODUCT_NAME, PRODUCT_BUNDLE_IDENTIFIER];
        let mut found = extract(dump, &keys);

        let missing: Vec<&str> = keys
            .iter()
            .filter(|key| !found.contains_key(**key))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Error::artifact_not_locatable(format!(
                "build settings missing {} (is the selected target an application?)",
                missing.join(", ")
            )));
        }

        Ok(Self {
            target_build_dir: PathBuf::from(found.remove(TARGET_BUILD_DIR).unwrap()),
            full_product_name: found.remove(FULL_PRODUCT_NAME).unwrap(),
            bundle_identifier: found.remove(PRODUCT_BUNDLE_IDENTIFIER).unwrap(),
        })
    }

    /// Path of the built app bundle
    pub fn app_path(&self) -> PathBuf {
        self.target_build_dir.join(&self.full_product_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"Build settings for action build and target Demo:
    ACTION = build
    TARGET_BUILD_DIR = /tmp/DerivedData/Demo-abc/Build/Products/Debug-iphonesimulator
    FULL_PRODUCT_NAME = Demo.app
    PRODUCT_BUNDLE_IDENTIFIER = com.example.Demo
    OTHER_LDFLAGS = -ObjC
"#;

    #[test]
    fn test_extract_round_trips_values() {
        let found = extract("    MY_KEY = some value  ", &["MY_KEY"]);
        assert_eq!(found.get("MY_KEY").map(String::as_str), Some("some value"));
    }

    #[test]
    fn test_extract_value_containing_equals() {
        let dump = "    OTHER_SWIFT_FLAGS = -DFOO=1 -DBAR=2";
        let found = extract(dump, &["OTHER_SWIFT_FLAGS"]);
        assert_eq!(
            found.get("OTHER_SWIFT_FLAGS").map(String::as_str),
            Some("-DFOO=1 -DBAR=2")
        );
    }

    #[test]
    fn test_extract_first_occurrence_wins() {
        let dump = "    KEY = first\n    KEY = second";
        let found = extract(dump, &["KEY"]);
        assert_eq!(found.get("KEY").map(String::as_str), Some("first"));
    }

    #[test]
    fn test_extract_requires_spaced_key_pattern() {
        // "MY_KEY=value" is not the dump format; only " MY_KEY = " counts
        let found = extract("MY_KEY=value", &["MY_KEY"]);
        assert!(found.is_empty());

        // A key that is a substring of another must not match its line
        let found = extract("    MY_KEY_EXTENDED = nope", &["MY_KEY"]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_extract_missing_keys_are_absent_not_error() {
        let found = extract(DUMP, &["TARGET_BUILD_DIR", "NOT_A_REAL_KEY"]);
        assert!(found.contains_key("TARGET_BUILD_DIR"));
        assert!(!found.contains_key("NOT_A_REAL_KEY"));
    }

    #[test]
    fn test_from_dump_success() {
        let settings = BuildSettings::from_dump(DUMP).unwrap();
        assert_eq!(settings.full_product_name, "Demo.app");
        assert_eq!(settings.bundle_identifier, "com.example.Demo");
        assert_eq!(
            settings.app_path(),
            PathBuf::from(
                "/tmp/DerivedData/Demo-abc/Build/Products/Debug-iphonesimulator/Demo.app"
            )
        );
    }

    #[test]
    fn test_from_dump_missing_bundle_identifier() {
        let dump = "    TARGET_BUILD_DIR = /tmp/out\n    FULL_PRODUCT_NAME = Demo.app";
        let err = BuildSettings::from_dump(dump).unwrap_err();
        match err {
            Error::ArtifactNotLocatable { message } => {
                assert!(message.contains(PRODUCT_BUNDLE_IDENTIFIER));
                assert!(!message.contains("TARGET_BUILD_DIR,"));
            }
            other => panic!("Expected ArtifactNotLocatable, got: {other:?}"),
        }
    }

    #[test]
    fn test_from_dump_empty_dump() {
        let err = BuildSettings::from_dump("").unwrap_err();
        assert!(matches!(err, Error::ArtifactNotLocatable { .. }));
    }
}
