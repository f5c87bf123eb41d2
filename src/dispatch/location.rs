//! Test locations encoded in node ids
//!
//! Test ids have the form `<file>:<line>`. File paths may themselves
//! contain `:` (drive letters), so only the last delimiter separates the
//! line number. Both parts are kept as written so a location re-encodes to
//! the exact id it came from.

use std::fmt;
use std::path::PathBuf;

use crate::common::{Error, Result};

/// Delimiter between file path and line number in a test id
pub const ID_DELIMITER: char = ':';

/// A decoded test id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestLocation {
    pub file: PathBuf,
    /// Decimal digits, exactly as they appear in the id
    pub line: String,
}

impl TestLocation {
    /// Decode a `<file>:<line>` test id
    pub fn parse(id: &str) -> Result<Self> {
        let (file, line) = id
            .rsplit_once(ID_DELIMITER)
            .ok_or_else(|| Error::InvalidNodeId(id.to_string()))?;

        if file.is_empty() || line.is_empty() || !line.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidNodeId(id.to_string()));
        }

        Ok(Self {
            file: PathBuf::from(file),
            line: line.to_string(),
        })
    }
}

impl fmt::Display for TestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.file.display(), ID_DELIMITER, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_line() {
        let loc = TestLocation::parse("/work/a.Tests.ps1:42").unwrap();
        assert_eq!(loc.file, PathBuf::from("/work/a.Tests.ps1"));
        assert_eq!(loc.line, "42");
    }

    #[test]
    fn test_parse_windows_path_keeps_drive_letter() {
        let loc = TestLocation::parse(r"C:\tests\a.ps1:42").unwrap();
        assert_eq!(loc.file, PathBuf::from(r"C:\tests\a.ps1"));
        assert_eq!(loc.line, "42");
    }

    #[test]
    fn test_parse_keeps_every_inner_delimiter() {
        let loc = TestLocation::parse("a:b:c.ps1:7").unwrap();
        assert_eq!(loc.file, PathBuf::from("a:b:c.ps1"));
        assert_eq!(loc.line, "7");
    }

    #[test]
    fn test_display_round_trips() {
        let id = r"C:\tests\a.ps1:42";
        assert_eq!(TestLocation::parse(id).unwrap().to_string(), id);
    }

    #[test]
    fn test_leading_zeros_survive_round_trip() {
        let loc = TestLocation::parse("a.ps1:007").unwrap();
        assert_eq!(loc.line, "007");
        assert_eq!(loc.to_string(), "a.ps1:007");
    }

    #[test]
    fn test_rejects_missing_delimiter() {
        assert!(matches!(
            TestLocation::parse("root"),
            Err(Error::InvalidNodeId(_))
        ));
    }

    #[test]
    fn test_rejects_non_numeric_line() {
        assert!(TestLocation::parse("a.ps1:x").is_err());
        assert!(TestLocation::parse("a.ps1:").is_err());
        assert!(TestLocation::parse("a.ps1:-3").is_err());
        assert!(TestLocation::parse(":3").is_err());
    }
}
