use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::io::{self, Cursor, Write};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::error::{ErrorKind, OsError, OsResult};
use crate::{ParsedPath, Platform, path};

use super::FilePath;
use super::traits::{FileInfo, FileType, Pal, ReadSeek, validate_env_assignment};

/// Upper bound on symlink hops while resolving a single path.
const MAX_SYMLINK_HOPS: usize = 40;

/* 📖 # Why a BTreeMap keyed by absolute path for MockPal storage?

MockPal uses in-memory storage behind Arc<Mutex<T>> for several reasons:
1. **Speed**: No filesystem I/O, deterministic and fast for unit tests
2. **Isolation**: No side effects on the real filesystem, the process environment or the cwd
3. **Control**: Easy to inject failures such as permission errors on specific paths

Every entry is keyed by its normalized absolute path, with symlinks resolved for all but the last
segment. A BTreeMap keeps children of a directory adjacent and sorted, so listing and walking
are range scans. Keys are compared case-sensitively on both platforms.
*/

/// In-memory PAL implementation for testing.
///
/// Simulates a small filesystem with files, directories and symlinks, a working directory,
/// an environment and a home directory, all without touching the host.
///
/// # Examples
///
/// ```
/// use oskit_base::{FilePath, MockPal, Pal};
///
/// let mock = MockPal::new();
/// mock.add_file("/data/test.txt", b"content");
/// let content = mock.read_file_to_string(&FilePath::from("/data/test.txt")).unwrap();
/// assert_eq!(content, "content");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    platform: Platform,
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    entries: BTreeMap<String, MockEntry>,
    cwd: String,
    env: HashMap<String, String>,
    home: Option<String>,
    temp: String,
    denied: HashSet<String>,
}

#[derive(Debug, Clone)]
struct MockEntry {
    node: MockNode,
    mode: u32,
    modified: SystemTime,
}

#[derive(Debug, Clone)]
enum MockNode {
    File(Vec<u8>),
    Directory,
    Symlink(String),
}

impl MockEntry {
    fn directory(mode: u32) -> Self {
        Self {
            node: MockNode::Directory,
            mode: mode & 0o777,
            modified: SystemTime::now(),
        }
    }

    fn file(content: Vec<u8>) -> Self {
        Self {
            node: MockNode::File(content),
            mode: 0o644,
            modified: SystemTime::now(),
        }
    }

    fn info(&self) -> FileInfo {
        let (file_type, size) = match &self.node {
            MockNode::File(content) => (FileType::File, content.len() as u64),
            MockNode::Directory => (FileType::Directory, 0),
            MockNode::Symlink(target) => (FileType::Symlink, target.len() as u64),
        };
        FileInfo {
            file_type,
            size,
            modified: Some(self.modified),
            mode: self.mode,
        }
    }

    fn is_directory(&self) -> bool {
        matches!(self.node, MockNode::Directory)
    }
}

fn fail(path: &str, kind: io::ErrorKind, message: &str) -> Box<OsError> {
    Box::new(OsError::file(path, io::Error::new(kind, message.to_string())))
}

impl MockPal {
    /// Create a Unix-style MockPal with `/` as working directory and `/tmp` as temp directory.
    pub fn new() -> Self {
        Self::with_platform(Platform::Unix)
    }

    /// Create a MockPal following the given platform's path conventions.
    ///
    /// Windows mocks start in `C:\` with `C:\Temp` as temp directory.
    pub fn with_platform(platform: Platform) -> Self {
        let (root, temp) = match platform {
            Platform::Unix => ("/", "/tmp"),
            Platform::Windows => ("C:\\", "C:\\Temp"),
        };
        let mut entries = BTreeMap::new();
        entries.insert(root.to_string(), MockEntry::directory(0o755));
        entries.insert(temp.to_string(), MockEntry::directory(0o777));
        Self {
            platform,
            state: Arc::new(Mutex::new(MockState {
                entries,
                cwd: root.to_string(),
                env: HashMap::new(),
                home: None,
                temp: temp.to_string(),
                denied: HashSet::new(),
            })),
        }
    }

    /// Add a file, creating missing parent directories.
    pub fn add_file(&self, path: impl Into<FilePath>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        let mut state = self.state.lock();
        let key = self.absolute(&state, path.as_str());
        self.insert_parents(&mut state, &key);
        state.entries.insert(key, MockEntry::file(content.into()));
    }

    /// Add a directory, creating missing parent directories.
    pub fn add_directory(&self, path: impl Into<FilePath>) {
        let path = path.into();
        let mut state = self.state.lock();
        let key = self.absolute(&state, path.as_str());
        self.insert_parents(&mut state, &key);
        state.entries.insert(key, MockEntry::directory(0o755));
    }

    /// Add a symlink at `link` pointing to `target` (stored verbatim).
    pub fn add_symlink(&self, target: &str, link: impl Into<FilePath>) {
        let link = link.into();
        let mut state = self.state.lock();
        let key = self.absolute(&state, link.as_str());
        self.insert_parents(&mut state, &key);
        state.entries.insert(
            key,
            MockEntry {
                node: MockNode::Symlink(target.to_string()),
                mode: 0o777,
                modified: SystemTime::now(),
            },
        );
    }

    /// Make every operation touching `path` or anything below it fail with `PermissionDenied`.
    pub fn deny(&self, path: impl Into<FilePath>) {
        let path = path.into();
        let mut state = self.state.lock();
        let key = self.absolute(&state, path.as_str());
        state.denied.insert(key);
    }

    /// Set the modification time of an existing entry.
    pub fn set_modified(&self, path: impl Into<FilePath>, modified: SystemTime) {
        let path = path.into();
        let mut state = self.state.lock();
        let key = self.absolute(&state, path.as_str());
        if let Some(entry) = state.entries.get_mut(&key) {
            entry.modified = modified;
        }
    }

    /// Set the home directory reported by `home_directory`. `None` makes the lookup fail.
    pub fn set_home(&self, home: Option<&str>) {
        self.state.lock().home = home.map(str::to_string);
    }

    /// Set an environment variable without validation.
    pub fn set_env(&self, name: &str, value: &str) {
        self.state
            .lock()
            .env
            .insert(name.to_string(), value.to_string());
    }

    /// Whether an entry exists at `path`, without following a final symlink.
    pub fn contains(&self, path: &str) -> bool {
        let state = self.state.lock();
        let key = self.absolute(&state, path);
        state.entries.contains_key(&key)
    }

    fn absolute(&self, state: &MockState, path: &str) -> String {
        path::make_absolute(self.platform, path, &state.cwd)
    }

    fn separator_suffixed(&self, key: &str) -> String {
        let sep = self.platform.separator();
        if key.ends_with(sep) {
            key.to_string()
        } else {
            format!("{key}{sep}")
        }
    }

    fn insert_parents(&self, state: &mut MockState, key: &str) {
        let mut parent = path::dirname(self.platform, key);
        let mut missing = Vec::new();
        while !state.entries.contains_key(&parent) {
            let next = path::dirname(self.platform, &parent);
            if next == parent {
                break;
            }
            missing.push(std::mem::replace(&mut parent, next));
        }
        for directory in missing {
            state.entries.insert(directory, MockEntry::directory(0o755));
        }
    }

    fn check_access(&self, state: &MockState, key: &str) -> OsResult<()> {
        let sep = self.platform.separator();
        let denied = state.denied.iter().any(|denied| {
            key == denied
                || key
                    .strip_prefix(denied.as_str())
                    .is_some_and(|rest| rest.starts_with(sep) || denied.ends_with(sep))
        });
        if denied {
            return Err(fail(key, io::ErrorKind::PermissionDenied, "permission denied"));
        }
        Ok(())
    }

    /// Resolves `path` to its storage key, following symlinks in every segment except
    /// possibly the last.
    fn resolve(&self, state: &MockState, path: &str, follow_last: bool) -> OsResult<String> {
        let platform = self.platform;
        let absolute = self.absolute(state, path);
        let parsed = ParsedPath::parse(platform, &absolute);
        let mut current = parsed.anchor().render(platform);
        let mut pending: VecDeque<String> =
            parsed.segments().iter().map(|s| s.to_string()).collect();
        let mut hops = 0;

        while let Some(segment) = pending.pop_front() {
            let candidate = path::join(platform, &[current.as_str(), segment.as_str()]);
            let is_last = pending.is_empty();
            match state.entries.get(&candidate).map(|entry| &entry.node) {
                Some(MockNode::Symlink(target)) if !is_last || follow_last => {
                    hops += 1;
                    if hops > MAX_SYMLINK_HOPS {
                        return Err(fail(path, io::ErrorKind::Other, "too many levels of symbolic links"));
                    }
                    let resolved = path::make_absolute(platform, target, &current);
                    let parsed = ParsedPath::parse(platform, &resolved);
                    let mut next: VecDeque<String> =
                        parsed.segments().iter().map(|s| s.to_string()).collect();
                    next.extend(pending.drain(..));
                    pending = next;
                    current = parsed.anchor().render(platform);
                }
                _ => current = candidate,
            }
        }
        self.check_access(state, &current)?;
        Ok(current)
    }

    fn entry<'s>(
        &self,
        state: &'s MockState,
        path: &str,
        follow_last: bool,
    ) -> OsResult<(String, &'s MockEntry)> {
        let key = self.resolve(state, path, follow_last)?;
        match state.entries.get(&key) {
            Some(entry) => Ok((key, entry)),
            None => Err(fail(path, io::ErrorKind::NotFound, "no such file or directory")),
        }
    }

    /// Key for a new entry at `path`; its parent must be an existing directory.
    fn new_entry_key(&self, state: &MockState, path: &str, follow_last: bool) -> OsResult<String> {
        let key = self.resolve(state, path, follow_last)?;
        let parent = path::dirname(self.platform, &key);
        if parent == key {
            return Err(fail(path, io::ErrorKind::AlreadyExists, "root already exists"));
        }
        match state.entries.get(&parent) {
            Some(entry) if entry.is_directory() => Ok(key),
            Some(_) => Err(fail(path, io::ErrorKind::NotADirectory, "parent is not a directory")),
            None => Err(fail(path, io::ErrorKind::NotFound, "parent directory does not exist")),
        }
    }

    /// Keys strictly below `key`, in order.
    fn descendants(&self, state: &MockState, key: &str) -> Vec<String> {
        let prefix = self.separator_suffixed(key);
        state
            .entries
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn children(&self, state: &MockState, key: &str) -> Vec<String> {
        self.descendants(state, key)
            .into_iter()
            .filter(|k| path::dirname(self.platform, k) == key)
            .collect()
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn current_directory(&self) -> OsResult<String> {
        let state = self.state.lock();
        if !state.entries.get(&state.cwd).is_some_and(MockEntry::is_directory) {
            return Err(fail(&state.cwd, io::ErrorKind::NotFound, "working directory was removed"));
        }
        Ok(state.cwd.clone())
    }

    fn change_directory(&self, path: &FilePath) -> OsResult<()> {
        let mut state = self.state.lock();
        let (key, entry) = self.entry(&state, path.as_str(), true)?;
        if !entry.is_directory() {
            return Err(fail(path.as_str(), io::ErrorKind::NotADirectory, "not a directory"));
        }
        state.cwd = key;
        Ok(())
    }

    fn canonicalize(&self, path: &FilePath) -> OsResult<String> {
        let state = self.state.lock();
        let (key, _) = self.entry(&state, path.as_str(), true)?;
        Ok(key)
    }

    fn metadata(&self, path: &FilePath) -> OsResult<FileInfo> {
        let state = self.state.lock();
        let (_, entry) = self.entry(&state, path.as_str(), true)?;
        Ok(entry.info())
    }

    fn symlink_metadata(&self, path: &FilePath) -> OsResult<FileInfo> {
        let state = self.state.lock();
        let (_, entry) = self.entry(&state, path.as_str(), false)?;
        Ok(entry.info())
    }

    fn list_directory(&self, path: &FilePath) -> OsResult<Vec<String>> {
        let state = self.state.lock();
        let (key, entry) = self.entry(&state, path.as_str(), true)?;
        if !entry.is_directory() {
            return Err(fail(path.as_str(), io::ErrorKind::NotADirectory, "not a directory"));
        }
        let mut names: Vec<String> = self
            .children(&state, &key)
            .iter()
            .map(|child| path::basename(self.platform, child))
            .collect();
        names.sort();
        Ok(names)
    }

    fn create_directory(&self, path: &FilePath, mode: u32) -> OsResult<()> {
        let mut state = self.state.lock();
        let key = self.new_entry_key(&state, path.as_str(), false)?;
        if state.entries.contains_key(&key) {
            return Err(fail(path.as_str(), io::ErrorKind::AlreadyExists, "file exists"));
        }
        state.entries.insert(key, MockEntry::directory(mode));
        Ok(())
    }

    fn create_directory_all(&self, path: &FilePath, mode: u32) -> OsResult<()> {
        let mut state = self.state.lock();
        let key = self.resolve(&state, path.as_str(), true)?;
        if let Some(entry) = state.entries.get(&key) {
            let kind = if entry.is_directory() {
                io::ErrorKind::AlreadyExists
            } else {
                io::ErrorKind::NotADirectory
            };
            return Err(fail(path.as_str(), kind, "already exists"));
        }

        let parsed = ParsedPath::parse(self.platform, &key);
        let mut current = parsed.anchor().render(self.platform);
        for segment in parsed.segments() {
            current = path::join(self.platform, &[current.as_str(), segment]);
            match state.entries.get(&current) {
                Some(entry) if entry.is_directory() => {}
                Some(_) => {
                    return Err(fail(&current, io::ErrorKind::NotADirectory, "not a directory"));
                }
                None => {
                    state.entries.insert(current.clone(), MockEntry::directory(mode));
                }
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &FilePath) -> OsResult<()> {
        let mut state = self.state.lock();
        let (key, entry) = self.entry(&state, path.as_str(), false)?;
        if entry.is_directory() {
            return Err(fail(path.as_str(), io::ErrorKind::IsADirectory, "is a directory"));
        }
        state.entries.remove(&key);
        Ok(())
    }

    fn remove_directory(&self, path: &FilePath) -> OsResult<()> {
        let mut state = self.state.lock();
        let (key, entry) = self.entry(&state, path.as_str(), false)?;
        if !entry.is_directory() {
            return Err(fail(path.as_str(), io::ErrorKind::NotADirectory, "not a directory"));
        }
        if path::dirname(self.platform, &key) == key {
            return Err(fail(path.as_str(), io::ErrorKind::PermissionDenied, "cannot remove root"));
        }
        if !self.children(&state, &key).is_empty() {
            return Err(fail(path.as_str(), io::ErrorKind::DirectoryNotEmpty, "directory not empty"));
        }
        state.entries.remove(&key);
        Ok(())
    }

    fn remove_tree(&self, path: &FilePath) -> OsResult<u64> {
        let mut state = self.state.lock();
        let key = self.resolve(&state, path.as_str(), false)?;
        let Some(entry) = state.entries.get(&key) else {
            return Ok(0);
        };
        if path::dirname(self.platform, &key) == key {
            return Err(fail(path.as_str(), io::ErrorKind::PermissionDenied, "cannot remove root"));
        }
        let mut doomed = if entry.is_directory() {
            self.descendants(&state, &key)
        } else {
            Vec::new()
        };
        for descendant in &doomed {
            self.check_access(&state, descendant)?;
        }
        doomed.push(key);
        for doomed_key in &doomed {
            state.entries.remove(doomed_key);
        }
        Ok(doomed.len() as u64)
    }

    fn rename(&self, from: &FilePath, to: &FilePath) -> OsResult<()> {
        let mut state = self.state.lock();
        let (from_key, entry) = self.entry(&state, from.as_str(), false)?;
        let moving_directory = entry.is_directory();
        let to_key = self.new_entry_key(&state, to.as_str(), false)?;
        if to_key == from_key {
            return Ok(());
        }
        if moving_directory && to_key.starts_with(&self.separator_suffixed(&from_key)) {
            return Err(fail(to.as_str(), io::ErrorKind::InvalidInput, "cannot move a directory into itself"));
        }
        if let Some(existing) = state.entries.get(&to_key) {
            match (moving_directory, existing.is_directory()) {
                (false, true) => {
                    return Err(fail(to.as_str(), io::ErrorKind::IsADirectory, "is a directory"));
                }
                (true, false) => {
                    return Err(fail(to.as_str(), io::ErrorKind::NotADirectory, "not a directory"));
                }
                (true, true) if !self.children(&state, &to_key).is_empty() => {
                    return Err(fail(to.as_str(), io::ErrorKind::DirectoryNotEmpty, "directory not empty"));
                }
                _ => {}
            }
        }

        let from_prefix = self.separator_suffixed(&from_key);
        let to_prefix = self.separator_suffixed(&to_key);
        for old_key in self.descendants(&state, &from_key) {
            if let Some(moved) = state.entries.remove(&old_key) {
                let new_key = format!("{}{}", to_prefix, &old_key[from_prefix.len()..]);
                state.entries.insert(new_key, moved);
            }
        }
        if let Some(moved) = state.entries.remove(&from_key) {
            state.entries.insert(to_key, moved);
        }
        Ok(())
    }

    fn copy_file(&self, from: &FilePath, to: &FilePath) -> OsResult<u64> {
        let mut state = self.state.lock();
        let (_, entry) = self.entry(&state, from.as_str(), true)?;
        let MockNode::File(content) = &entry.node else {
            return Err(fail(from.as_str(), io::ErrorKind::IsADirectory, "not a regular file"));
        };
        let content = content.clone();
        let mode = entry.mode;
        let to_key = self.new_entry_key(&state, to.as_str(), true)?;
        if state.entries.get(&to_key).is_some_and(MockEntry::is_directory) {
            return Err(fail(to.as_str(), io::ErrorKind::IsADirectory, "is a directory"));
        }
        let copied = content.len() as u64;
        let mut copy = MockEntry::file(content);
        copy.mode = mode;
        state.entries.insert(to_key, copy);
        Ok(copied)
    }

    fn create_symlink(&self, target: &FilePath, link: &FilePath) -> OsResult<()> {
        let mut state = self.state.lock();
        let key = self.new_entry_key(&state, link.as_str(), false)?;
        if state.entries.contains_key(&key) {
            return Err(fail(link.as_str(), io::ErrorKind::AlreadyExists, "file exists"));
        }
        state.entries.insert(
            key,
            MockEntry {
                node: MockNode::Symlink(target.as_str().to_string()),
                mode: 0o777,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn read_file(&self, path: &FilePath) -> OsResult<Box<dyn ReadSeek + 'static>> {
        let state = self.state.lock();
        let (_, entry) = self.entry(&state, path.as_str(), true)?;
        match &entry.node {
            MockNode::File(content) => Ok(Box::new(Cursor::new(content.clone()))),
            _ => Err(fail(path.as_str(), io::ErrorKind::IsADirectory, "is a directory")),
        }
    }

    fn create_file(&self, path: &FilePath) -> OsResult<Box<dyn Write>> {
        let mut state = self.state.lock();
        let key = self.new_entry_key(&state, path.as_str(), true)?;
        if state.entries.get(&key).is_some_and(MockEntry::is_directory) {
            return Err(fail(path.as_str(), io::ErrorKind::IsADirectory, "is a directory"));
        }
        let mode = state.entries.get(&key).map_or(0o644, |e| e.mode);
        let mut entry = MockEntry::file(Vec::new());
        entry.mode = mode;
        state.entries.insert(key.clone(), entry);
        // Return a writer that will store in the mock storage when dropped
        Ok(Box::new(MockFileWriter {
            key,
            state: Arc::clone(&self.state),
            buffer: Vec::new(),
        }))
    }

    fn append_file(&self, path: &FilePath) -> OsResult<Box<dyn Write>> {
        let mut state = self.state.lock();
        let key = self.new_entry_key(&state, path.as_str(), true)?;
        let buffer = match state.entries.get(&key).map(|e| &e.node) {
            Some(MockNode::File(content)) => content.clone(),
            Some(_) => {
                return Err(fail(path.as_str(), io::ErrorKind::IsADirectory, "is a directory"));
            }
            None => {
                state.entries.insert(key.clone(), MockEntry::file(Vec::new()));
                Vec::new()
            }
        };
        Ok(Box::new(MockFileWriter {
            key,
            state: Arc::clone(&self.state),
            buffer,
        }))
    }

    fn walk_directory(
        &self,
        path: &FilePath,
    ) -> OsResult<Box<dyn Iterator<Item = OsResult<FilePath>> + '_>> {
        let state = self.state.lock();
        let (key, entry) = self.entry(&state, path.as_str(), true)?;
        if !entry.is_directory() {
            return Err(fail(path.as_str(), io::ErrorKind::NotADirectory, "not a directory"));
        }
        let prefix = self.separator_suffixed(&key);
        let mut files = Vec::new();
        for descendant in self.descendants(&state, &key) {
            let is_file = match state.entries.get(&descendant).map(|e| &e.node) {
                Some(MockNode::File(_)) => true,
                Some(MockNode::Symlink(_)) => self
                    .entry(&state, &descendant, true)
                    .is_ok_and(|(_, target)| matches!(target.node, MockNode::File(_))),
                _ => false,
            };
            if !is_file {
                continue;
            }
            let relative = &descendant[prefix.len()..];
            let item = self
                .check_access(&state, &descendant)
                .map(|()| FilePath::from(path::join(self.platform, &[path.as_str(), relative])));
            files.push(item);
        }
        Ok(Box::new(files.into_iter()))
    }

    fn env_var(&self, name: &str) -> OsResult<Option<String>> {
        validate_env_assignment(name, None)?;
        Ok(self.state.lock().env.get(name).cloned())
    }

    fn set_env_var(&self, name: &str, value: &str) -> OsResult<()> {
        validate_env_assignment(name, Some(value))?;
        self.set_env(name, value);
        Ok(())
    }

    fn home_directory(&self) -> OsResult<String> {
        self.state.lock().home.clone().ok_or_else(|| {
            Box::new(OsError::new(ErrorKind::EnvError {
                name: "HOME".to_string(),
                message: "no home directory configured".to_string(),
            }))
        })
    }

    fn temp_directory(&self) -> OsResult<String> {
        Ok(self.state.lock().temp.clone())
    }

    fn permissions(&self, path: &FilePath) -> OsResult<u32> {
        let state = self.state.lock();
        let (_, entry) = self.entry(&state, path.as_str(), true)?;
        Ok(entry.mode)
    }

    fn set_permissions(&self, path: &FilePath, mode: u32) -> OsResult<()> {
        let mut state = self.state.lock();
        let key = self.resolve(&state, path.as_str(), true)?;
        match state.entries.get_mut(&key) {
            Some(entry) => {
                entry.mode = mode & 0o777;
                Ok(())
            }
            None => Err(fail(path.as_str(), io::ErrorKind::NotFound, "no such file or directory")),
        }
    }
}

/// Helper struct for writing files to MockPal.
struct MockFileWriter {
    key: String,
    state: Arc<Mutex<MockState>>,
    buffer: Vec<u8>,
}

impl Write for MockFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MockFileWriter {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        let mode = state.entries.get(&self.key).map_or(0o644, |e| e.mode);
        let mut entry = MockEntry::file(std::mem::take(&mut self.buffer));
        entry.mode = mode;
        state.entries.insert(self.key.clone(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureReason;

    fn fp(path: &str) -> FilePath {
        FilePath::from(path)
    }

    #[test]
    fn test_file_exists_true() {
        let pal = MockPal::new();
        pal.add_file("/test.txt", b"content");

        assert!(pal.file_exists(&fp("/test.txt")).unwrap());
    }

    #[test]
    fn test_file_exists_false() {
        let pal = MockPal::new();

        assert!(!pal.file_exists(&fp("/test.txt")).unwrap());
    }

    #[test]
    fn test_relative_paths_resolve_against_cwd() {
        let pal = MockPal::new();
        pal.add_file("/work/notes.txt", b"n");
        pal.change_directory(&fp("/work")).unwrap();

        assert!(pal.file_exists(&fp("notes.txt")).unwrap());
        assert!(pal.file_exists(&fp("./sub/../notes.txt")).unwrap());
        assert_eq!(pal.current_directory().unwrap(), "/work");
    }

    #[test]
    fn test_current_directory_fails_once_removed() {
        let pal = MockPal::new();
        pal.add_directory("/work");
        pal.change_directory(&fp("/work")).unwrap();
        pal.remove_directory(&fp("/work")).unwrap();

        let error = pal.current_directory().err().unwrap();
        assert_eq!(error.reason(), FailureReason::NotFound);
    }

    #[test]
    fn test_read_file_not_found() {
        let pal = MockPal::new();

        let error = pal.read_file(&fp("nonexistent.txt")).err().unwrap();
        assert_eq!(error.reason(), FailureReason::NotFound);
    }

    #[test]
    fn test_create_file_requires_parent() {
        let pal = MockPal::new();

        assert!(pal.create_file(&fp("/missing/new.txt")).is_err());

        let mut writer = pal.create_file(&fp("/new.txt")).unwrap();
        writer.write_all(b"test content").unwrap();
        drop(writer);

        let content = pal.read_file_to_string(&fp("/new.txt")).unwrap();
        assert_eq!(content, "test content");
    }

    #[test]
    fn test_append_file() {
        let pal = MockPal::new();
        pal.add_file("/log.txt", b"one");

        let mut writer = pal.append_file(&fp("/log.txt")).unwrap();
        writer.write_all(b"two").unwrap();
        drop(writer);

        assert_eq!(pal.read_file_to_bytes(&fp("/log.txt")).unwrap(), b"onetwo");
    }

    #[test]
    fn test_create_directory_and_already_exists() {
        let pal = MockPal::new();

        pal.create_directory(&fp("/a"), 0o700).unwrap();
        assert_eq!(pal.permissions(&fp("/a")).unwrap(), 0o700);
        let error = pal.create_directory(&fp("/a"), 0o700).err().unwrap();
        assert_eq!(error.reason(), FailureReason::AlreadyExists);
        assert!(pal.create_directory(&fp("/x/y"), 0o755).is_err());
    }

    #[test]
    fn test_create_directory_all() {
        let pal = MockPal::new();

        pal.create_directory_all(&fp("/a/b/c"), 0o755).unwrap();
        assert!(pal.metadata(&fp("/a/b")).unwrap().is_directory());
        assert!(pal.metadata(&fp("/a/b/c")).unwrap().is_directory());

        let error = pal.create_directory_all(&fp("/a/b/c"), 0o755).err().unwrap();
        assert_eq!(error.reason(), FailureReason::AlreadyExists);
    }

    #[test]
    fn test_list_directory_only_direct_children() {
        let pal = MockPal::new();
        pal.add_file("/d/b.txt", b"");
        pal.add_file("/d/a.txt", b"");
        pal.add_file("/d/sub/deep.txt", b"");
        pal.add_file("/d.txt", b"");

        assert_eq!(pal.list_directory(&fp("/d")).unwrap(), ["a.txt", "b.txt", "sub"]);
    }

    #[test]
    fn test_remove_directory_must_be_empty() {
        let pal = MockPal::new();
        pal.add_file("/d/file.txt", b"");

        let error = pal.remove_directory(&fp("/d")).err().unwrap();
        assert_eq!(error.reason(), FailureReason::Other);

        pal.remove_file(&fp("/d/file.txt")).unwrap();
        pal.remove_directory(&fp("/d")).unwrap();
        assert!(!pal.contains("/d"));
    }

    #[test]
    fn test_remove_tree_counts_entries() {
        let pal = MockPal::new();
        pal.add_file("/tree/a.txt", b"a");
        pal.add_file("/tree/sub/b.txt", b"b");
        pal.add_file("/tree.txt", b"sibling");

        assert_eq!(pal.remove_tree(&fp("/tree")).unwrap(), 4);
        assert!(!pal.contains("/tree"));
        assert!(pal.contains("/tree.txt"));
        assert_eq!(pal.remove_tree(&fp("/tree")).unwrap(), 0);
    }

    #[test]
    fn test_rename_moves_subtree() {
        let pal = MockPal::new();
        pal.add_file("/old/sub/file.txt", b"x");

        pal.rename(&fp("/old"), &fp("/new")).unwrap();
        assert!(!pal.contains("/old"));
        assert!(!pal.contains("/old/sub/file.txt"));
        assert_eq!(pal.read_file_to_string(&fp("/new/sub/file.txt")).unwrap(), "x");
    }

    #[test]
    fn test_rename_into_itself_fails() {
        let pal = MockPal::new();
        pal.add_directory("/a");
        assert!(pal.rename(&fp("/a"), &fp("/a/b")).is_err());
    }

    #[test]
    fn test_copy_file_overwrites() {
        let pal = MockPal::new();
        pal.add_file("/src.txt", b"new");
        pal.add_file("/dst.txt", b"old content");

        assert_eq!(pal.copy_file(&fp("/src.txt"), &fp("/dst.txt")).unwrap(), 3);
        assert_eq!(pal.read_file_to_string(&fp("/dst.txt")).unwrap(), "new");
    }

    #[test]
    fn test_symlinks_are_followed() {
        let pal = MockPal::new();
        pal.add_file("/real/data.txt", b"payload");
        pal.add_symlink("/real", "/alias");
        pal.add_symlink("data.txt", "/real/link.txt");

        assert_eq!(pal.read_file_to_string(&fp("/alias/data.txt")).unwrap(), "payload");
        assert_eq!(pal.read_file_to_string(&fp("/real/link.txt")).unwrap(), "payload");
        assert_eq!(pal.canonicalize(&fp("/alias/link.txt")).unwrap(), "/real/data.txt");
        assert!(pal.symlink_metadata(&fp("/alias")).unwrap().is_symlink());
        assert!(pal.metadata(&fp("/alias")).unwrap().is_directory());
    }

    #[test]
    fn test_symlink_loop_is_an_error() {
        let pal = MockPal::new();
        pal.add_symlink("/b", "/a");
        pal.add_symlink("/a", "/b");

        assert!(pal.metadata(&fp("/a")).is_err());
        assert!(pal.symlink_metadata(&fp("/a")).unwrap().is_symlink());
    }

    #[test]
    fn test_denied_paths() {
        let pal = MockPal::new();
        pal.add_file("/secret/key.pem", b"k");
        pal.add_file("/secretary.txt", b"s");
        pal.deny("/secret");

        let error = pal.read_file(&fp("/secret/key.pem")).err().unwrap();
        assert_eq!(error.reason(), FailureReason::PermissionDenied);
        let error = pal.file_exists(&fp("/secret")).err().unwrap();
        assert_eq!(error.reason(), FailureReason::PermissionDenied);
        assert!(pal.file_exists(&fp("/secretary.txt")).unwrap());
    }

    #[test]
    fn test_walk_directory_yields_files_below_root() {
        let pal = MockPal::new();
        pal.add_file("/r/a.txt", b"");
        pal.add_file("/r/b/c.txt", b"");
        pal.add_directory("/r/empty");
        pal.add_file("/rest.txt", b"");

        let results: Vec<String> = pal
            .walk_directory(&fp("/r"))
            .unwrap()
            .map(|p| p.unwrap().into_string())
            .collect();
        assert_eq!(results, ["/r/a.txt", "/r/b/c.txt"]);
    }

    #[test]
    fn test_walk_directory_keeps_relative_root() {
        let pal = MockPal::new();
        pal.add_file("/r/a.txt", b"");

        let results: Vec<String> = pal
            .walk_directory(&fp("r"))
            .unwrap()
            .map(|p| p.unwrap().into_string())
            .collect();
        assert_eq!(results, ["r/a.txt"]);
    }

    #[test]
    fn test_environment_is_isolated() {
        let pal = MockPal::new();
        pal.set_env_var("GREETING", "hello").unwrap();

        assert_eq!(pal.env_var("GREETING").unwrap().as_deref(), Some("hello"));
        assert_eq!(pal.env_var("MISSING").unwrap(), None);
        assert!(pal.set_env_var("", "x").is_err());
    }

    #[test]
    fn test_home_directory() {
        let pal = MockPal::new();
        assert!(pal.home_directory().is_err());
        pal.set_home(Some("/home/ada"));
        assert_eq!(pal.home_directory().unwrap(), "/home/ada");
    }

    #[test]
    fn test_windows_mock() {
        let pal = MockPal::with_platform(Platform::Windows);
        pal.add_file("C:\\Users\\me\\a.txt", b"x");

        assert_eq!(pal.current_directory().unwrap(), "C:\\");
        assert!(pal.file_exists(&fp("C:/Users/me/a.txt")).unwrap());
        assert!(pal.file_exists(&fp("Users\\me\\a.txt")).unwrap());
        assert_eq!(pal.list_directory(&fp("C:\\Users")).unwrap(), ["me"]);
        assert_eq!(pal.temp_directory().unwrap(), "C:\\Temp");
    }
}
