use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::error::{ErrorKind, OsError, OsResult};
use crate::{Platform, path};

use super::FilePath;
use super::traits::{FileInfo, FileType, Pal, ReadSeek, validate_env_assignment};

/* 📖 # Why use std::fs instead of async or other crates?

Every facade operation is a single blocking call whose result is needed right away, so std::fs
is sufficient and needs no runtime. walkdir covers the two recursive operations (tree removal
and file walks) and `dirs` provides the last-resort home directory lookup.
*/

/// Serializes every access to the process environment.
///
/// Reading and writing environment variables from several threads at once is undefined
/// behaviour on most platforms. Every RealPal method that reads or writes the environment,
/// directly or through `std::env::temp_dir` and `dirs`, holds this lock.
static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Concrete PAL implementation using the host operating system.
///
/// Relative paths are handed to the OS as-is, so they resolve against the process working
/// directory.
#[derive(Debug)]
pub struct RealPal {
    platform: Platform,
}

impl RealPal {
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
        }
    }

    fn read_env(&self, name: &str) -> Option<String> {
        let _guard = ENV_LOCK.lock();
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

impl Default for RealPal {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps an io::Error for `path`, logging it at debug level.
fn file_error(path: &Path, action: &'static str) -> impl FnOnce(io::Error) -> Box<OsError> {
    let path = path.to_path_buf();
    move |e| {
        debug!(error = %e, path = %path.display(), "failed to {action}");
        Box::new(OsError::file(path, e))
    }
}

fn walk_error(root: &Path, e: walkdir::Error) -> Box<OsError> {
    let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    debug!(error = %e, path = %path.display(), "directory walk failed");
    Box::new(OsError::file(path, io::Error::from(e)))
}

fn file_info(metadata: &fs::Metadata) -> FileInfo {
    let file_type = metadata.file_type();
    let file_type = if file_type.is_symlink() {
        FileType::Symlink
    } else if file_type.is_dir() {
        FileType::Directory
    } else if file_type.is_file() {
        FileType::File
    } else {
        FileType::Other
    };
    FileInfo {
        file_type,
        size: metadata.len(),
        modified: metadata.modified().ok(),
        mode: permission_bits(metadata),
    }
}

/// Windows canonical paths come back in `\\?\` form, which the path layer treats as UNC.
fn strip_verbatim(canonical: &str) -> String {
    if let Some(unc) = canonical.strip_prefix(r"\\?\UNC\") {
        format!(r"\\{unc}")
    } else if let Some(local) = canonical.strip_prefix(r"\\?\") {
        local.to_string()
    } else {
        canonical.to_string()
    }
}

/// Regular files and symlinks to regular files; the walk itself never follows links.
fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file()
        || (entry.path_is_symlink() && fs::metadata(entry.path()).is_ok_and(|m| m.is_file()))
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

/// Windows only knows the read-only attribute.
#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

impl Pal for RealPal {
    fn platform(&self) -> Platform {
        self.platform
    }

    #[instrument(skip(self))]
    fn current_directory(&self) -> OsResult<String> {
        let cwd = std::env::current_dir().map_err(file_error(Path::new("."), "read cwd"))?;
        Ok(cwd.to_string_lossy().into_owned())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn change_directory(&self, path: &FilePath) -> OsResult<()> {
        std::env::set_current_dir(path).map_err(file_error(path.as_path(), "change directory"))?;
        debug!("working directory changed");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn canonicalize(&self, path: &FilePath) -> OsResult<String> {
        let canonical = fs::canonicalize(path).map_err(file_error(path.as_path(), "canonicalize"))?;
        Ok(strip_verbatim(&canonical.to_string_lossy()))
    }

    fn metadata(&self, path: &FilePath) -> OsResult<FileInfo> {
        let metadata = fs::metadata(path).map_err(file_error(path.as_path(), "stat"))?;
        Ok(file_info(&metadata))
    }

    fn symlink_metadata(&self, path: &FilePath) -> OsResult<FileInfo> {
        let metadata = fs::symlink_metadata(path).map_err(file_error(path.as_path(), "lstat"))?;
        Ok(file_info(&metadata))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn list_directory(&self, path: &FilePath) -> OsResult<Vec<String>> {
        let entries = fs::read_dir(path).map_err(file_error(path.as_path(), "list directory"))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(file_error(path.as_path(), "read directory entry"))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        debug!(count = names.len(), "listed directory");
        Ok(names)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory(&self, path: &FilePath, mode: u32) -> OsResult<()> {
        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder
            .create(path)
            .map_err(file_error(path.as_path(), "create directory"))?;
        debug!("directory created");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory_all(&self, path: &FilePath, mode: u32) -> OsResult<()> {
        if fs::metadata(path).is_ok_and(|m| m.is_dir()) {
            return Err(Box::new(OsError::file(
                path.as_path(),
                io::Error::new(io::ErrorKind::AlreadyExists, "directory already exists"),
            )));
        }
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder
            .create(path)
            .map_err(file_error(path.as_path(), "create directories"))?;
        debug!("directory and parents created");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn remove_file(&self, path: &FilePath) -> OsResult<()> {
        fs::remove_file(path).map_err(file_error(path.as_path(), "remove file"))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn remove_directory(&self, path: &FilePath) -> OsResult<()> {
        fs::remove_dir(path).map_err(file_error(path.as_path(), "remove directory"))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn remove_tree(&self, path: &FilePath) -> OsResult<u64> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("nothing to remove");
                return Ok(0);
            }
            Err(e) => return Err(file_error(path.as_path(), "stat")(e)),
        };
        if !metadata.is_dir() {
            fs::remove_file(path).map_err(file_error(path.as_path(), "remove file"))?;
            return Ok(1);
        }

        let mut removed = 0;
        for entry in WalkDir::new(path).contents_first(true) {
            let entry = entry.map_err(|e| walk_error(path.as_path(), e))?;
            if entry.file_type().is_dir() {
                fs::remove_dir(entry.path())
                    .map_err(file_error(entry.path(), "remove directory"))?;
            } else {
                fs::remove_file(entry.path()).map_err(file_error(entry.path(), "remove file"))?;
            }
            removed += 1;
        }
        debug!(removed, "tree removed");
        Ok(removed)
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    fn rename(&self, from: &FilePath, to: &FilePath) -> OsResult<()> {
        fs::rename(from, to).map_err(file_error(from.as_path(), "rename"))
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    fn copy_file(&self, from: &FilePath, to: &FilePath) -> OsResult<u64> {
        let copied = fs::copy(from, to).map_err(file_error(from.as_path(), "copy file"))?;
        debug!(bytes = copied, "file copied");
        Ok(copied)
    }

    #[instrument(skip(self), fields(target = %target, link = %link))]
    fn create_symlink(&self, target: &FilePath, link: &FilePath) -> OsResult<()> {
        #[cfg(unix)]
        let result = std::os::unix::fs::symlink(target, link);
        #[cfg(windows)]
        let result = {
            let target_path = Path::new(path::dirname(self.platform, link.as_str()).as_str())
                .join(target.as_path());
            if fs::metadata(&target_path).is_ok_and(|m| m.is_dir()) {
                std::os::windows::fs::symlink_dir(target, link)
            } else {
                std::os::windows::fs::symlink_file(target, link)
            }
        };
        #[cfg(not(any(unix, windows)))]
        let result: io::Result<()> = Err(io::Error::from(io::ErrorKind::Unsupported));
        result.map_err(file_error(link.as_path(), "create symlink"))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> OsResult<Box<dyn ReadSeek + 'static>> {
        let file = fs::File::open(path).map_err(file_error(path.as_path(), "open file"))?;
        debug!("file opened successfully");
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_file(&self, path: &FilePath) -> OsResult<Box<dyn Write>> {
        let file = fs::File::create(path).map_err(file_error(path.as_path(), "create file"))?;
        debug!("file created successfully");
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn append_file(&self, path: &FilePath) -> OsResult<Box<dyn Write>> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(file_error(path.as_path(), "open file for append"))?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn walk_directory(
        &self,
        path: &FilePath,
    ) -> OsResult<Box<dyn Iterator<Item = OsResult<FilePath>> + '_>> {
        let root = path.as_path().to_path_buf();
        let metadata = fs::metadata(&root).map_err(file_error(&root, "stat walk root"))?;
        if !metadata.is_dir() {
            return Err(Box::new(OsError::file(
                root,
                io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            )));
        }

        debug!("starting directory walk");
        let platform = self.platform;
        let base = path.as_str().to_string();
        let iter = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(e) if is_regular_file(&e) => {
                    let relative: PathBuf = match e.path().strip_prefix(&root) {
                        Ok(relative) => relative.to_path_buf(),
                        Err(_) => e.path().to_path_buf(),
                    };
                    let relative = relative.to_string_lossy().into_owned();
                    Some(Ok(FilePath::from(path::join(platform, &[base.as_str(), &relative]))))
                }
                Ok(_) => None,
                Err(e) => Some(Err(walk_error(&root, e))),
            });
        Ok(Box::new(iter))
    }

    fn env_var(&self, name: &str) -> OsResult<Option<String>> {
        validate_env_assignment(name, None)?;
        Ok(self.read_env(name))
    }

    #[instrument(skip(self, value))]
    fn set_env_var(&self, name: &str, value: &str) -> OsResult<()> {
        validate_env_assignment(name, Some(value))?;
        let _guard = ENV_LOCK.lock();
        // SAFETY: name and value were validated above. Every environment read in RealPal,
        // including temp_dir() and the dirs fallback, holds ENV_LOCK.
        unsafe { std::env::set_var(name, value) };
        debug!("environment variable set");
        Ok(())
    }

    /// HOME / USERPROFILE, then HOMEDRIVE + HOMEPATH on Windows, then the OS account record.
    fn home_directory(&self) -> OsResult<String> {
        let primary = match self.platform {
            Platform::Unix => "HOME",
            Platform::Windows => "USERPROFILE",
        };
        if let Some(home) = self.read_env(primary).filter(|h| !h.is_empty()) {
            return Ok(home);
        }
        if self.platform == Platform::Windows {
            if let (Some(drive), Some(rest)) = (self.read_env("HOMEDRIVE"), self.read_env("HOMEPATH")) {
                if !drive.is_empty() || !rest.is_empty() {
                    return Ok(format!("{drive}{rest}"));
                }
            }
        }
        let fallback = {
            let _guard = ENV_LOCK.lock();
            dirs::home_dir()
        };
        fallback
            .map(|home| home.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Box::new(OsError::new(ErrorKind::EnvError {
                    name: primary.to_string(),
                    message: "home directory could not be determined".to_string(),
                }))
            })
    }

    fn temp_directory(&self) -> OsResult<String> {
        let _guard = ENV_LOCK.lock();
        Ok(std::env::temp_dir().to_string_lossy().into_owned())
    }

    fn permissions(&self, path: &FilePath) -> OsResult<u32> {
        let metadata = fs::metadata(path).map_err(file_error(path.as_path(), "stat"))?;
        Ok(permission_bits(&metadata))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn set_permissions(&self, path: &FilePath, mode: u32) -> OsResult<()> {
        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            fs::Permissions::from_mode(mode & 0o777)
        };
        #[cfg(not(unix))]
        let permissions = {
            let mut permissions = fs::metadata(path)
                .map_err(file_error(path.as_path(), "stat"))?
                .permissions();
            permissions.set_readonly(mode & 0o200 == 0);
            permissions
        };
        fs::set_permissions(path, permissions).map_err(file_error(path.as_path(), "set permissions"))
    }
}
