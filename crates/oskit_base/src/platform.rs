use serde::Deserialize;

/* 📖 # Why is the platform a runtime enum instead of cfg branches?

Separators and line endings differ between Windows and Unix. Selecting them with `cfg!` at every
call site would make only one convention testable per build. Carrying a `Platform` value instead
lets the path layer, the mock PAL and the facade be exercised against both conventions from one
binary, while `Platform::current()` still picks the build target by default.
*/

/// Path and text conventions of a platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    /// The platform family this binary was built for.
    pub const fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Primary path separator (`\` or `/`).
    pub const fn separator(self) -> char {
        match self {
            Platform::Unix => '/',
            Platform::Windows => '\\',
        }
    }

    /// Separator between entries of a path list such as `PATH` (`;` or `:`).
    pub const fn path_list_separator(self) -> char {
        match self {
            Platform::Unix => ':',
            Platform::Windows => ';',
        }
    }

    /// Line terminator (`\r\n` or `\n`).
    pub const fn line_separator(self) -> &'static str {
        match self {
            Platform::Unix => "\n",
            Platform::Windows => "\r\n",
        }
    }

    /// Whether `c` separates path segments. Windows accepts both slashes.
    pub const fn is_separator(self, c: char) -> bool {
        match self {
            Platform::Unix => c == '/',
            Platform::Windows => c == '\\' || c == '/',
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Unix => write!(f, "unix"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_constants() {
        let platform = Platform::Unix;
        assert_eq!(platform.separator(), '/');
        assert_eq!(platform.path_list_separator(), ':');
        assert_eq!(platform.line_separator(), "\n");
    }

    #[test]
    fn test_windows_constants() {
        let platform = Platform::Windows;
        assert_eq!(platform.separator(), '\\');
        assert_eq!(platform.path_list_separator(), ';');
        assert_eq!(platform.line_separator(), "\r\n");
    }

    #[test]
    fn test_separator_recognition() {
        assert!(Platform::Unix.is_separator('/'));
        assert!(!Platform::Unix.is_separator('\\'));
        assert!(Platform::Windows.is_separator('/'));
        assert!(Platform::Windows.is_separator('\\'));
    }

    #[test]
    fn test_current_matches_build_target() {
        #[cfg(windows)]
        assert_eq!(Platform::current(), Platform::Windows);
        #[cfg(not(windows))]
        assert_eq!(Platform::current(), Platform::Unix);
    }

    #[test]
    fn test_display() {
        assert_eq!(Platform::Unix.to_string(), "unix");
        assert_eq!(Platform::Windows.to_string(), "windows");
    }
}
