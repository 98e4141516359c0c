use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A version label derived from a release tag.
///
/// Usually a `MAJOR.MINOR.PATCH[-PRERELEASE|+BUILD]` substring of the tag. Tags
/// without one fall back to the raw tag minus a leading `v`, so this is a label
/// rather than a validated semantic version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedVersion(String);

impl NormalizedVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.\-]+)?").expect("version pattern is valid")
    })
}

/// Pull the version out of a free-form release tag.
///
/// `v0.1.1` and `ritobin-tools-v0.1.1` both give `0.1.1`; `nightly` stays `nightly`.
pub fn extract_version(tag: &str) -> NormalizedVersion {
    if let Some(m) = version_pattern().find(tag) {
        tracing::debug!("Extracted version '{}' from tag '{}'", m.as_str(), tag);
        return NormalizedVersion(m.as_str().to_string());
    }

    let label = tag.strip_prefix('v').unwrap_or(tag);
    tracing::debug!(
        "Tag '{}' has no semantic version, using '{}' as the version label",
        tag,
        label
    );
    NormalizedVersion(label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_v_prefixed_tags() {
        assert_eq!(extract_version("v0.1.1").as_str(), "0.1.1");
        assert_eq!(extract_version("v10.20.30").as_str(), "10.20.30");
        assert_eq!(extract_version("1.2.3").as_str(), "1.2.3");
    }

    #[test]
    fn test_prefixed_tags() {
        assert_eq!(extract_version("ritobin-tools-v2.3.0").as_str(), "2.3.0");
        assert_eq!(extract_version("infisical-cli/v0.41.90").as_str(), "0.41.90");
        assert_eq!(extract_version("release 4.5.6 final").as_str(), "4.5.6");
    }

    #[test]
    fn test_prerelease_and_build_metadata_are_kept() {
        assert_eq!(extract_version("v1.0.0-rc.1").as_str(), "1.0.0-rc.1");
        assert_eq!(extract_version("v0.1.1+build5").as_str(), "0.1.1+build5");
        assert_eq!(
            extract_version("tool-v2.0.0-beta-2").as_str(),
            "2.0.0-beta-2"
        );
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(extract_version("v1.2.3-compat-4.5.6").as_str(), "1.2.3-compat-4.5.6");
        assert_eq!(extract_version("1.2.3 and 4.5.6").as_str(), "1.2.3");
    }

    #[test]
    fn test_fallback_labels() {
        assert_eq!(extract_version("nightly").as_str(), "nightly");
        assert_eq!(extract_version("vnext").as_str(), "next");
        assert_eq!(extract_version("release-2").as_str(), "release-2");
        assert_eq!(extract_version("v1.2").as_str(), "1.2");
        // Only a single leading 'v' is stripped
        assert_eq!(extract_version("vv1").as_str(), "v1");
        assert_eq!(extract_version("").as_str(), "");
    }
}
