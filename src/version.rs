//! Build metadata embedded by `build.rs`.

use std::fmt;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the binary was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub branch: &'static str,
    pub sha: &'static str,
    pub dirty: bool,
}

impl BuildInfo {
    /// Metadata of the running build. Missing git data reads as "unknown".
    pub fn current() -> Self {
        Self {
            version: PKG_VERSION,
            branch: match option_env!("VERGEN_GIT_BRANCH") {
                Some(branch) => branch,
                None => "unknown",
            },
            sha: match option_env!("VERGEN_GIT_SHA") {
                Some(sha) => sha,
                None => "unknown",
            },
            dirty: option_env!("VERGEN_GIT_DIRTY") == Some("true"),
        }
    }

    fn short_sha(&self) -> &'static str {
        let end = self.sha.len().min(7);
        self.sha.get(..end).unwrap_or(self.sha)
    }
}

/// Renders as `{version}+{branch}.{sha7}` with a `.dirty` suffix for
/// uncommitted trees.
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}.{}", self.version, self.branch, self.short_sha())?;
        if self.dirty {
            f.write_str(".dirty")?;
        }
        Ok(())
    }
}

/// Full version string of the running build.
pub fn version_string() -> String {
    BuildInfo::current().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_pkg_version() {
        assert!(version_string().starts_with(PKG_VERSION));
    }

    #[test]
    fn display_shortens_sha_and_marks_dirty() {
        let info = BuildInfo {
            version: "1.2.3",
            branch: "main",
            sha: "abcdef0123456",
            dirty: true,
        };
        assert_eq!(info.to_string(), "1.2.3+main.abcdef0.dirty");
    }

    #[test]
    fn display_handles_unknown_sha() {
        let info = BuildInfo {
            version: "1.2.3",
            branch: "unknown",
            sha: "unknown",
            dirty: false,
        };
        assert_eq!(info.to_string(), "1.2.3+unknown.unknown");
    }
}
