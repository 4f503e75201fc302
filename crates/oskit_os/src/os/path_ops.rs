use oskit_base::{FileInfo, FilePath, ParsedPath, Platform, path};

use super::Os;

impl Os {
    /// Joins segments with the path separator. See [`path::join`].
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        path::join(self.platform, segments)
    }

    /// Splits a path into its anchor (if any) and segments. See [`path::split`].
    pub fn split(&self, path: &str) -> Vec<String> {
        path::split(self.platform, path)
    }

    /// Normalizes a path, resolving symlinks where the filesystem allows it.
    ///
    /// The longest existing prefix is canonicalized and the rest is appended lexically. When no
    /// prefix exists the result is purely lexical, and `""` and `"."` both stay `"."`.
    pub fn normalize(&self, path: &str) -> String {
        let lexical = path::normalize(self.platform, path);
        if lexical == "." {
            return lexical;
        }
        self.weakly_canonical(&lexical).unwrap_or(lexical)
    }

    fn weakly_canonical(&self, lexical: &str) -> Option<String> {
        let parsed = ParsedPath::parse(self.platform, lexical);
        let segments = parsed.segments();
        for existing in (1..=segments.len()).rev() {
            let prefix = parsed.anchor().render(self.platform)
                + &segments[..existing].join(&self.platform.separator().to_string());
            if let Ok(canonical) = self.pal.canonicalize(&FilePath::from(prefix)) {
                let mut parts = vec![canonical.as_str()];
                parts.extend_from_slice(&segments[existing..]);
                return Some(path::normalize(self.platform, &path::join(self.platform, &parts)));
            }
        }
        None
    }

    /// Resolves `path` against the working directory and normalizes it lexically.
    ///
    /// An empty path yields the working directory. If the working directory cannot be read,
    /// the filesystem root stands in for it.
    pub fn absolute(&self, path: &str) -> String {
        let mut cwd = self.current_directory();
        if cwd.is_empty() {
            cwd = match self.platform {
                Platform::Unix => "/".to_string(),
                Platform::Windows => "C:\\".to_string(),
            };
        }
        path::make_absolute(self.platform, path, &cwd)
    }

    pub fn is_absolute(&self, path: &str) -> bool {
        path::is_absolute(self.platform, path)
    }

    pub fn basename(&self, path: &str) -> String {
        path::basename(self.platform, path)
    }

    pub fn dirname(&self, path: &str) -> String {
        path::dirname(self.platform, path)
    }

    /// The extension of the final segment, including the dot; empty if none.
    pub fn split_extension(&self, path: &str) -> String {
        path::split_extension(self.platform, path)
    }

    /// `(stem, extension)` of the final segment.
    pub fn split_extension_pair(&self, path: &str) -> (String, String) {
        path::split_extension_pair(self.platform, path)
    }

    /// `path` relative to `base`, both taken relative to the working directory.
    ///
    /// Returns `path` unchanged if no relative path exists, e.g. across drives.
    pub fn relative_to(&self, path: &str, base: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        let target = self.absolute(path);
        let start = self.absolute(base);
        path::relative_to(self.platform, &target, &start).unwrap_or_else(|| path.to_string())
    }

    /// `path` relative to the working directory.
    pub fn relative(&self, path: &str) -> String {
        self.relative_to(path, ".")
    }

    fn info(&self, operation: &str, path: &str) -> Option<FileInfo> {
        let result = self.pal.metadata(&FilePath::from(path)).map(Some);
        self.or_sentinel(operation, path, result, None)
    }

    /// Whether anything exists at `path`, following symlinks. `false` on any error.
    pub fn exists(&self, path: &str) -> bool {
        self.info("exists", path).is_some()
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.info("is_file", path).is_some_and(|info| info.is_file())
    }

    pub fn is_directory(&self, path: &str) -> bool {
        self.info("is_directory", path)
            .is_some_and(|info| info.is_directory())
    }

    /// Whether `path` itself is a symlink; the link is not followed.
    pub fn is_symlink(&self, path: &str) -> bool {
        let result = self.pal.symlink_metadata(&FilePath::from(path));
        self.or_sentinel("is_symlink", path, result.map(|info| info.is_symlink()), false)
    }

    /// Size of a regular file in bytes; `0` for anything else and on any error.
    pub fn size(&self, path: &str) -> u64 {
        self.info("size", path)
            .filter(FileInfo::is_file)
            .map_or(0, |info| info.size)
    }

    /// Modification time in seconds since the Unix epoch; `0` on any error.
    pub fn modified_time(&self, path: &str) -> i64 {
        self.info("modified_time", path)
            .and_then(|info| info.modified_unix_seconds())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use oskit_base::{MockPal, PalHandle};

    use super::*;

    fn mock_os() -> (Os, MockPal) {
        let mock = MockPal::new();
        (Os::new(PalHandle::new(mock.clone())), mock)
    }

    #[test]
    fn test_pure_operations_follow_platform() {
        let (os, _) = mock_os();
        assert_eq!(os.join(&["dir1", "dir2", "file.txt"]), "dir1/dir2/file.txt");

        let os = Os::new(PalHandle::new(MockPal::with_platform(Platform::Windows)));
        assert_eq!(os.join(&["dir1", "dir2", "file.txt"]), "dir1\\dir2\\file.txt");
        assert!(os.is_absolute("C:\\x"));
        assert_eq!(os.basename("C:\\x\\y.txt"), "y.txt");
    }

    #[test]
    fn test_absolute_uses_mock_cwd() {
        let (os, mock) = mock_os();
        mock.add_directory("/work/project");
        assert!(os.change_directory("/work/project"));

        assert_eq!(os.absolute("src/../lib.rs"), "/work/project/lib.rs");
        assert_eq!(os.absolute(""), "/work/project");
        assert_eq!(os.absolute("/etc"), "/etc");
    }

    #[test]
    fn test_absolute_without_working_directory_uses_root() {
        let (os, mock) = mock_os();
        mock.add_directory("/gone");
        assert!(os.change_directory("/gone"));
        assert!(os.remove_directory("/gone"));

        assert_eq!(os.current_directory(), "");
        assert_eq!(os.absolute("x/y"), "/x/y");
        assert!(os.is_absolute(&os.absolute("")));
    }

    #[test]
    fn test_normalize_resolves_existing_prefix() {
        let (os, mock) = mock_os();
        mock.add_directory("/real/dir");
        mock.add_symlink("/real", "/link");

        assert_eq!(os.normalize("/link/dir/../new/./file"), "/real/new/file");
        assert_eq!(os.normalize("/missing/../a//b/"), "/a/b");
        assert_eq!(os.normalize(""), ".");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let (os, mock) = mock_os();
        mock.add_directory("/a/b");
        mock.add_symlink("/a", "/s");
        for input in ["/s/b/./c", "x/../../y", "/a//b/..", "", "/s"] {
            let once = os.normalize(input);
            assert_eq!(os.normalize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_relative_to() {
        let (os, mock) = mock_os();
        mock.add_directory("/home/user");
        assert!(os.change_directory("/home/user"));

        assert_eq!(os.relative_to("/home/user/docs/a.txt", "/home/user"), "docs/a.txt");
        assert_eq!(os.relative_to("/etc/hosts", "docs"), "../../../etc/hosts");
        assert_eq!(os.relative("docs/./a.txt"), "docs/a.txt");
        assert_eq!(os.relative_to("/home/user", "/home/user"), ".");
        assert_eq!(os.relative_to("", "/"), "");
    }

    #[test]
    fn test_relative_to_different_drive_returns_input() {
        let os = Os::new(PalHandle::new(MockPal::with_platform(Platform::Windows)));
        assert_eq!(os.relative_to("D:\\data\\x.txt", "C:\\"), "D:\\data\\x.txt");
        assert_eq!(os.relative_to("C:\\data\\x.txt", "C:\\"), "data\\x.txt");
    }

    #[test]
    fn test_predicates() {
        let (os, mock) = mock_os();
        mock.add_file("/d/file.txt", b"12345");
        mock.add_symlink("/d/file.txt", "/d/link");

        assert!(os.exists("/d"));
        assert!(os.is_directory("/d"));
        assert!(!os.is_file("/d"));
        assert!(os.is_file("/d/link"));
        assert!(os.is_symlink("/d/link"));
        assert!(!os.is_symlink("/d/file.txt"));
        assert!(!os.exists("/nonexistent"));
        assert!(!os.is_symlink("/nonexistent"));
    }

    #[test]
    fn test_predicates_swallow_permission_errors() {
        let (os, mock) = mock_os();
        mock.add_file("/private/data.bin", b"x");
        mock.deny("/private");

        assert!(!os.exists("/private/data.bin"));
        assert!(!os.is_file("/private/data.bin"));
        assert_eq!(os.size("/private/data.bin"), 0);
    }

    #[test]
    fn test_size_and_modified_time() {
        let (os, mock) = mock_os();
        mock.add_file("/f.txt", b"abc");
        mock.set_modified("/f.txt", std::time::UNIX_EPOCH + std::time::Duration::from_secs(86_400));

        assert_eq!(os.size("/f.txt"), 3);
        assert_eq!(os.size("/"), 0);
        assert_eq!(os.size("/nonexistent"), 0);
        assert_eq!(os.modified_time("/f.txt"), 86_400);
        assert_eq!(os.modified_time("/nonexistent"), 0);
    }
}
