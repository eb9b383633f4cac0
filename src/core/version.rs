//! Exact version triples (major.minor.patch)

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::core::{ChnodeError, ChnodeResult};

/// Upper bound on version input read from a stream or version file
pub const MAX_INPUT_BYTES: usize = 64;

/// An exact release version.
///
/// Components are kept as opaque strings. Nothing checks that they are
/// numeric, so `a.b.c` parses and only fails once a download is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpec {
    major: String,
    minor: String,
    patch: String,
}

impl VersionSpec {
    /// Parse a dot-separated triple
    pub fn parse(input: &str) -> ChnodeResult<Self> {
        let tokens: Vec<&str> = input.split('.').collect();

        if tokens.len() != 3 || tokens.iter().any(|t| !is_valid_token(t)) {
            return Err(ChnodeError::InvalidVersion(input.to_string()));
        }

        Ok(Self {
            major: tokens[0].to_string(),
            minor: tokens[1].to_string(),
            patch: tokens[2].to_string(),
        })
    }

    /// Read a version from a stream.
    ///
    /// Returns `Ok(None)` when the stream holds nothing but whitespace.
    pub fn from_reader<R: Read>(reader: R) -> ChnodeResult<Option<Self>> {
        let input = read_limited(reader)?;
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Ok(None);
        }

        Self::parse(trimmed).map(Some)
    }

    /// Read a version from the first line of a version file.
    ///
    /// A single leading `v` (`v18.19.0`) is accepted.
    pub fn from_file(path: &Path) -> ChnodeResult<Self> {
        let file = std::fs::File::open(path)?;
        let input = read_limited(file)?;
        let line = input.lines().next().unwrap_or("").trim();

        if line.is_empty() {
            return Err(ChnodeError::InvalidVersion(format!(
                "{} is empty",
                path.display()
            )));
        }

        Self::parse(line.strip_prefix('v').unwrap_or(line))
    }

    /// Numeric view of this version, when every component is numeric
    pub fn to_semver(&self) -> Option<semver::Version> {
        Some(semver::Version::new(
            self.major.parse().ok()?,
            self.minor.parse().ok()?,
            self.patch.parse().ok()?,
        ))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionSpec {
    type Err = ChnodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A component ends up as part of a directory name under the cache root
fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && !token.contains(['/', '\\', '\0'])
}

fn read_limited<R: Read>(reader: R) -> ChnodeResult<String> {
    let mut buf = Vec::with_capacity(MAX_INPUT_BYTES);
    reader
        .take(MAX_INPUT_BYTES as u64 + 1)
        .read_to_end(&mut buf)?;

    if buf.len() > MAX_INPUT_BYTES {
        return Err(ChnodeError::InputTooLarge {
            size: buf.len(),
            limit: MAX_INPUT_BYTES,
        });
    }

    String::from_utf8(buf)
        .map_err(|_| ChnodeError::InvalidVersion("input is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_parse_triple() {
        let v = VersionSpec::parse("18.12.1").unwrap();
        assert_eq!(v.major, "18");
        assert_eq!(v.minor, "12");
        assert_eq!(v.patch, "1");
        assert_eq!(v.to_string(), "18.12.1");
    }

    #[test]
    fn test_parse_wrong_token_count() {
        for input in ["", "1", "1.2", "1.2.3.4", "1..3", ".1.2", "1.2."] {
            assert!(VersionSpec::parse(input).is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn test_parse_keeps_tokens_opaque() {
        let v = VersionSpec::parse("a.b.c").unwrap();
        assert_eq!(v.to_string(), "a.b.c");
        assert!(v.to_semver().is_none());
    }

    #[test]
    fn test_parse_rejects_path_separators() {
        assert!(VersionSpec::parse("1/...2.3").is_err());
        assert!(VersionSpec::parse("1.2.3/x").is_err());
        assert!(VersionSpec::parse("1.2\\x.3").is_err());
    }

    #[test]
    fn test_from_reader_trims_newline() {
        let v = VersionSpec::from_reader(Cursor::new("20.1.0\n")).unwrap();
        assert_eq!(v.unwrap().to_string(), "20.1.0");
    }

    #[test]
    fn test_from_reader_empty_is_none() {
        assert!(VersionSpec::from_reader(Cursor::new("")).unwrap().is_none());
        assert!(VersionSpec::from_reader(Cursor::new("  \n")).unwrap().is_none());
    }

    #[test]
    fn test_from_reader_rejects_oversized_input() {
        let input = "1".repeat(MAX_INPUT_BYTES + 10);
        let err = VersionSpec::from_reader(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, ChnodeError::InputTooLarge { .. }));
    }

    #[test]
    fn test_from_file_uses_first_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".node-version");
        std::fs::write(&path, "16.20.2\n# pinned\n").unwrap();

        let v = VersionSpec::from_file(&path).unwrap();
        assert_eq!(v.to_string(), "16.20.2");
    }

    #[test]
    fn test_from_file_accepts_v_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".node-version");

        std::fs::write(&path, "v18.19.0\n").unwrap();
        let v = VersionSpec::from_file(&path).unwrap();
        assert_eq!(v.to_string(), "18.19.0");
        assert_eq!(v.major, "18");

        // Only one prefix is stripped
        std::fs::write(&path, "vv18.19.0\n").unwrap();
        let v = VersionSpec::from_file(&path).unwrap();
        assert_eq!(v.major, "v18");
    }

    #[test]
    fn test_to_semver_orders_numerically() {
        let a = VersionSpec::parse("9.0.0").unwrap().to_semver().unwrap();
        let b = VersionSpec::parse("10.0.0").unwrap().to_semver().unwrap();
        assert!(a < b);
    }
}
