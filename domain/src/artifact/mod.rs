//! Artifact domain: versioned named blobs produced by the publisher tools.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const PDF_MIME: &str = "application/pdf";
pub const HTML_MIME: &str = "text/html";

/// File extension for a rendered document of `mime_type`
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        HTML_MIME => "html",
        _ => "pdf",
    }
}

/// Namespace prefix for artifacts scoped to the user rather than the session
pub const USER_SCOPE_PREFIX: &str = "user:";

/// Reference to one saved artifact version, rendered as `name@vN`.
///
/// A reference parsed from a bare `name` carries no version and resolves to
/// the latest one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl ArtifactRef {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version: Some(version),
        }
    }

    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Name under the `user:` scope, e.g. `user:report.pdf`
    pub fn user_scoped(filename: &str) -> String {
        if filename.starts_with(USER_SCOPE_PREFIX) {
            filename.to_string()
        } else {
            format!("{}{}", USER_SCOPE_PREFIX, filename)
        }
    }

    /// File name without any scope prefix
    pub fn file_name(&self) -> &str {
        self.name
            .strip_prefix(USER_SCOPE_PREFIX)
            .unwrap_or(&self.name)
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.version {
            Some(version) => write!(f, "{}@v{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for ArtifactRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Artifact reference is empty".to_string());
        }
        if let Some((name, version)) = s.rsplit_once("@v")
            && let Ok(version) = version.parse::<u32>()
            && !name.is_empty()
        {
            return Ok(ArtifactRef::new(name, version));
        }
        Ok(ArtifactRef::latest(s))
    }
}

/// A stored artifact version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub reference: ArtifactRef,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse_versioned() {
        let reference = ArtifactRef::new("user:report.pdf", 2);
        assert_eq!(reference.to_string(), "user:report.pdf@v2");
        assert_eq!("user:report.pdf@v2".parse::<ArtifactRef>().unwrap(), reference);
    }

    #[test]
    fn test_parse_bare_name_is_latest() {
        let reference: ArtifactRef = "user:generated_report.pdf".parse().unwrap();
        assert_eq!(reference.version, None);
        assert_eq!(reference.file_name(), "generated_report.pdf");
    }

    #[test]
    fn test_parse_non_numeric_suffix_keeps_name() {
        let reference: ArtifactRef = "notes@vintage".parse().unwrap();
        assert_eq!(reference, ArtifactRef::latest("notes@vintage"));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!("  ".parse::<ArtifactRef>().is_err());
    }

    #[test]
    fn test_extension_follows_mime() {
        assert_eq!(extension_for_mime(HTML_MIME), "html");
        assert_eq!(extension_for_mime(PDF_MIME), "pdf");
    }

    #[test]
    fn test_user_scoped_is_idempotent() {
        assert_eq!(ArtifactRef::user_scoped("a.pdf"), "user:a.pdf");
        assert_eq!(ArtifactRef::user_scoped("user:a.pdf"), "user:a.pdf");
    }
}
