//! Domain identifier types with validation
//!
//! Newtype wrappers for store paths and job names. Each type validates its
//! format on construction so the export engine never sees a malformed path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Absolute path inside the distributed store
///
/// Always starts with `/`, never contains `.` or `..` segments and never ends
/// with a trailing slash (except for the root itself).
///
/// # Examples
///
/// ```
/// use statlake::domain::ids::StorePath;
///
/// let target = StorePath::new("/data_processed/career_stats_clean.csv").unwrap();
/// assert_eq!(target.file_name(), "career_stats_clean.csv");
/// assert_eq!(target.parent().unwrap().as_str(), "/data_processed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorePath(String);

impl StorePath {
    /// Creates a new StorePath, normalizing duplicate and trailing slashes
    pub fn new(path: impl Into<String>) -> Result<Self, String> {
        let path = path.into();
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err("Store path cannot be empty".to_string());
        }
        if !trimmed.starts_with('/') {
            return Err(format!("Store path must be absolute: {trimmed}"));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(format!(
                    "Store path must not contain relative segments: {trimmed}"
                ));
            }
            segments.push(segment);
        }

        Ok(Self(format!("/{}", segments.join("/"))))
    }

    /// Returns the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Last path segment (empty for the root)
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Parent directory, `None` for the root
    pub fn parent(&self) -> Option<StorePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self("/".to_string())),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Appends a child segment (or relative sub-path)
    pub fn join(&self, child: &str) -> Result<StorePath, String> {
        if self.is_root() {
            Self::new(format!("/{child}"))
        } else {
            Self::new(format!("{}/{}", self.0, child))
        }
    }

    /// Path of an object named `name` in the same directory as `self`
    pub fn sibling(&self, name: &str) -> Result<StorePath, String> {
        match self.parent() {
            Some(parent) => parent.join(name),
            None => Self::new(format!("/{name}")),
        }
    }

    /// Whether `self` is `other` or one of its ancestors
    pub fn is_ancestor_of(&self, other: &StorePath) -> bool {
        if self.is_root() || self == other {
            return true;
        }
        other
            .0
            .strip_prefix(&self.0)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    fn is_root(&self) -> bool {
        self.0 == "/"
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StorePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StorePath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StorePath> for String {
    fn from(path: StorePath) -> Self {
        path.0
    }
}

impl AsRef<str> for StorePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Export job name
///
/// Used for logging, for the snapshot file name and as the snapshot table
/// name, so it is restricted to ASCII letters, digits, `_` and `-`.
///
/// # Examples
///
/// ```
/// use statlake::domain::ids::JobName;
/// use std::str::FromStr;
///
/// let name = JobName::from_str("career_stats").unwrap();
/// assert_eq!(name.as_str(), "career_stats");
/// assert!(JobName::from_str("career stats").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobName(String);

impl JobName {
    /// Creates a new JobName from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Job name cannot be empty".to_string());
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!(
                "Invalid job name '{name}'. Only letters, digits, '_' and '-' are allowed"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the job name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for JobName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobName> for String {
    fn from(name: JobName) -> Self {
        name.0
    }
}
