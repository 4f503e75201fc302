use std::path::{Path, PathBuf};

/* 📖 # Why wrap a String for FilePath?

The facade speaks in plain path strings, exactly as the caller wrote them, and the PAL must hand
those strings to the platform unchanged: a trailing separator or a `./` prefix can matter to the
operating system. FilePath therefore owns the text as-is; parsing is left to the path layer.
A dedicated type (rather than `&str`) keeps PAL signatures self-describing and gives the mock
a single place to hang its path resolution.
*/

/// Owned path string passed across the platform abstraction layer.
///
/// # Examples
///
/// ```
/// use oskit_base::FilePath;
///
/// let path1 = FilePath::from("src/main.rs");
/// let path2 = FilePath::from(String::from("tests/data.txt"));
/// assert_eq!(path1.as_str(), "src/main.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilePath(String);

impl FilePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts to a regular Path for use with std::fs operations.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Consumes the FilePath and returns a PathBuf.
    pub fn into_path_buf(self) -> PathBuf {
        PathBuf::from(self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for FilePath {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<&Path> for FilePath {
    fn from(p: &Path) -> Self {
        Self(p.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for FilePath {
    fn from(p: PathBuf) -> Self {
        Self::from(p.as_path())
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<Path> for FilePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
