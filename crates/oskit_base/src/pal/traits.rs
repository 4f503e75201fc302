use std::io::{Read, Seek, Write};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ErrorKind, FailureReason, OsError, OsResult};
use crate::Platform;

use super::file_path::FilePath;

/// Trait combining Read + Seek for file operations.
///
/// This trait enables returning opaque file handles that support both reading
/// and seeking, useful for different implementations (real files, in-memory buffers, etc.)
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
    /// Device, socket, fifo and the like
    Other,
}

/// Snapshot of an entry's metadata, taken at call time and never cached.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub file_type: FileType,
    /// Size in bytes
    pub size: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<SystemTime>,
    /// Permission bits (`0o777` mask)
    pub mode: u32,
}

impl FileInfo {
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    /// Modification time as seconds since the Unix epoch (negative before 1970).
    pub fn modified_unix_seconds(&self) -> Option<i64> {
        let modified = self.modified?;
        match modified.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_secs()).ok(),
            Err(before) => i64::try_from(before.duration().as_secs()).ok().map(|s| -s),
        }
    }
}

/* 📖 # Why is Pal a trait instead of a struct?

Using a trait enables two key benefits:
1. **Testability**: MockPal implements Pal for fast, deterministic tests without filesystem side effects
2. **Flexibility**: Code depends on the abstraction, not the concrete implementation

Every method returns an `OsResult`, so this is also the checked surface of the library: where the
facade collapses failures into sentinels, the PAL keeps the full error with its FailureReason.
*/

/// Platform Abstraction Layer (PAL) trait providing filesystem and process-environment operations.
///
/// Two implementations are provided:
/// - `RealPal`: Uses the host operating system via `std::fs` and `std::env`
/// - `MockPal`: In-memory implementation for testing
///
/// Relative paths are resolved against the implementation's current working directory.
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Path conventions of this platform.
    fn platform(&self) -> Platform;

    fn current_directory(&self) -> OsResult<String>;

    fn change_directory(&self, path: &FilePath) -> OsResult<()>;

    /// Resolves symlinks and relative segments of an existing path.
    fn canonicalize(&self, path: &FilePath) -> OsResult<String>;

    /// Metadata of the entry, following symlinks.
    fn metadata(&self, path: &FilePath) -> OsResult<FileInfo>;

    /// Metadata of the entry itself, without following a final symlink.
    fn symlink_metadata(&self, path: &FilePath) -> OsResult<FileInfo>;

    /// Check if an entry exists at the given path (following symlinks).
    ///
    /// A missing entry is `Ok(false)`; other failures such as permission errors are returned.
    fn file_exists(&self, path: &FilePath) -> OsResult<bool> {
        match self.metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.reason() == FailureReason::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Names of the entries in a directory, sorted.
    fn list_directory(&self, path: &FilePath) -> OsResult<Vec<String>>;

    /// Create a single directory; the parent must exist.
    fn create_directory(&self, path: &FilePath, mode: u32) -> OsResult<()>;

    /// Create a directory and all missing parents. Fails with `AlreadyExists` if the
    /// directory is already there.
    fn create_directory_all(&self, path: &FilePath, mode: u32) -> OsResult<()>;

    fn remove_file(&self, path: &FilePath) -> OsResult<()>;

    /// Remove an empty directory.
    fn remove_directory(&self, path: &FilePath) -> OsResult<()>;

    /// Remove an entry and everything below it, returning how many entries were removed.
    /// A missing path removes nothing and is not an error.
    fn remove_tree(&self, path: &FilePath) -> OsResult<u64>;

    fn rename(&self, from: &FilePath, to: &FilePath) -> OsResult<()>;

    /// Copy a file, overwriting the destination. Returns the number of bytes copied.
    fn copy_file(&self, from: &FilePath, to: &FilePath) -> OsResult<u64>;

    /// Create a symbolic link at `link` pointing to `target`.
    fn create_symlink(&self, target: &FilePath, link: &FilePath) -> OsResult<()>;

    /// Open a file for reading.
    fn read_file(&self, path: &FilePath) -> OsResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents as raw bytes.
    fn read_file_to_bytes(&self, path: &FilePath) -> OsResult<Vec<u8>> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .map_err(|e| Box::new(OsError::file(path.as_path(), e)))?;
        Ok(contents)
    }

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> OsResult<String> {
        let contents = self.read_file_to_bytes(path)?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Create a new file, truncating it if it exists.
    fn create_file(&self, path: &FilePath) -> OsResult<Box<dyn Write>>;

    /// Open a file for appending, creating it if needed.
    fn append_file(&self, path: &FilePath) -> OsResult<Box<dyn Write>>;

    /// Replace a file's contents.
    fn write_file(&self, path: &FilePath, contents: &[u8]) -> OsResult<()> {
        let mut writer = self.create_file(path)?;
        writer
            .write_all(contents)
            .and_then(|()| writer.flush())
            .map_err(|e| Box::new(OsError::file(path.as_path(), e)))
    }

    /// Walk a directory tree, yielding the paths of all regular files below it.
    ///
    /// Yielded paths are `path` joined with the entry's path relative to it.
    fn walk_directory(
        &self,
        path: &FilePath,
    ) -> OsResult<Box<dyn Iterator<Item = OsResult<FilePath>> + '_>>;

    /// Value of an environment variable, `None` if unset.
    fn env_var(&self, name: &str) -> OsResult<Option<String>>;

    fn set_env_var(&self, name: &str, value: &str) -> OsResult<()>;

    /// Home directory of the current user.
    fn home_directory(&self) -> OsResult<String>;

    fn temp_directory(&self) -> OsResult<String>;

    /// Permission bits of the entry (`0o777` mask).
    fn permissions(&self, path: &FilePath) -> OsResult<u32>;

    fn set_permissions(&self, path: &FilePath, mode: u32) -> OsResult<()>;
}

/// Rejects names and values the process environment cannot hold.
pub(crate) fn validate_env_assignment(name: &str, value: Option<&str>) -> OsResult<()> {
    let env_error = |message: &str| {
        Box::new(OsError::new(ErrorKind::EnvError {
            name: name.to_string(),
            message: message.to_string(),
        }))
    };
    if name.is_empty() {
        return Err(env_error("name is empty"));
    }
    if name.contains('=') || name.contains('\0') {
        return Err(env_error("name contains '=' or NUL"));
    }
    if value.is_some_and(|v| v.contains('\0')) {
        return Err(env_error("value contains NUL"));
    }
    Ok(())
}

/* 📖 # Why use Arc<dyn Pal> with PalHandle?

Arc enables cheap cloning of the entire PAL implementation, allowing it to be
shared across multiple parts of the application (thread-safe via dyn Pal bounds).
PalHandle wraps this for ergonomic Deref access and Clone support.
*/

/// Handle to a PAL implementation, enabling shared ownership.
///
/// # Examples
///
/// ```no_run
/// use oskit_base::{RealPal, PalHandle};
///
/// let pal = PalHandle::new(RealPal::new());
/// let pal_clone = pal.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_validate_env_assignment() {
        assert!(validate_env_assignment("NAME", Some("value")).is_ok());
        assert!(validate_env_assignment("NAME", None).is_ok());
        assert!(validate_env_assignment("", Some("v")).is_err());
        assert!(validate_env_assignment("A=B", Some("v")).is_err());
        assert!(validate_env_assignment("A\0", None).is_err());
        assert!(validate_env_assignment("A", Some("v\0")).is_err());
    }

    #[test]
    fn test_modified_unix_seconds() {
        let mut info = FileInfo {
            file_type: FileType::File,
            size: 0,
            modified: Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
            mode: 0o644,
        };
        assert_eq!(info.modified_unix_seconds(), Some(1_700_000_000));

        info.modified = Some(UNIX_EPOCH - Duration::from_secs(10));
        assert_eq!(info.modified_unix_seconds(), Some(-10));

        info.modified = None;
        assert_eq!(info.modified_unix_seconds(), None);
    }

    #[test]
    fn test_pal_handle_clone() {
        use crate::pal::mock::MockPal;
        let pal = PalHandle::new(MockPal::new());
        let pal_clone = pal.clone();
        assert_eq!(pal_clone.platform(), Platform::Unix);
    }
}
