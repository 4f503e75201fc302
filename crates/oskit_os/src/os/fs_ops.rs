use std::io::Write;

use oskit_base::{FilePath, OsError, OsResult};

use super::Os;

impl Os {
    /// The working directory, or `""` if it cannot be determined.
    pub fn current_directory(&self) -> String {
        let result = self.pal.current_directory();
        self.or_sentinel("current_directory", "", result, String::new())
    }

    pub fn change_directory(&self, path: &str) -> bool {
        let result = self.pal.change_directory(&FilePath::from(path));
        self.succeeded("change_directory", path, result)
    }

    /// Entry names in `path`, sorted; empty on any error. Use `"."` for the working directory.
    pub fn list_directory(&self, path: &str) -> Vec<String> {
        let result = self.pal.list_directory(&FilePath::from(path));
        self.or_sentinel("list_directory", path, result, Vec::new())
    }

    /// Creates one directory. `false` if it exists already or its parent is missing.
    pub fn create_directory(&self, path: &str, mode: u32) -> bool {
        let result = self.pal.create_directory(&FilePath::from(path), mode);
        self.succeeded("create_directory", path, result)
    }

    /// Creates a directory and its missing parents. `false` if it already existed.
    pub fn create_directories(&self, path: &str, mode: u32) -> bool {
        let result = self.pal.create_directory_all(&FilePath::from(path), mode);
        self.succeeded("create_directories", path, result)
    }

    pub fn remove_file(&self, path: &str) -> bool {
        let result = self.pal.remove_file(&FilePath::from(path));
        self.succeeded("remove_file", path, result)
    }

    /// Removes an empty directory.
    pub fn remove_directory(&self, path: &str) -> bool {
        let result = self.pal.remove_directory(&FilePath::from(path));
        self.succeeded("remove_directory", path, result)
    }

    /// Removes `path` and everything below it. Returns the number of entries removed.
    pub fn remove_tree(&self, path: &str) -> u64 {
        let result = self.pal.remove_tree(&FilePath::from(path));
        self.or_sentinel("remove_tree", path, result, 0)
    }

    pub fn rename(&self, old: &str, new: &str) -> bool {
        let result = self.pal.rename(&FilePath::from(old), &FilePath::from(new));
        self.succeeded("rename", old, result)
    }

    /// Copies a file, overwriting `destination` if it exists.
    pub fn copy_file(&self, source: &str, destination: &str) -> bool {
        let result = self
            .pal
            .copy_file(&FilePath::from(source), &FilePath::from(destination))
            .map(|_| ());
        self.succeeded("copy_file", source, result)
    }

    pub fn create_symlink(&self, target: &str, link: &str) -> bool {
        let result = self.pal.create_symlink(&FilePath::from(target), &FilePath::from(link));
        self.succeeded("create_symlink", link, result)
    }

    /// Entire file contents; empty on any error.
    pub fn read_file(&self, path: &str) -> Vec<u8> {
        let result = self.pal.read_file_to_bytes(&FilePath::from(path));
        self.or_sentinel("read_file", path, result, Vec::new())
    }

    /// File contents as text, with invalid UTF-8 replaced; empty on any error.
    pub fn read_file_to_string(&self, path: &str) -> String {
        String::from_utf8_lossy(&self.read_file(path)).into_owned()
    }

    /// Replaces the file's contents, creating it if needed.
    pub fn write_file(&self, path: &str, content: &[u8]) -> bool {
        let result = self.pal.write_file(&FilePath::from(path), content);
        self.succeeded("write_file", path, result)
    }

    /// Appends to the file, creating it if needed.
    pub fn append_file(&self, path: &str, content: &[u8]) -> bool {
        let file_path = FilePath::from(path);
        let result = self.pal.append_file(&file_path).and_then(|mut writer| {
            writer
                .write_all(content)
                .and_then(|()| writer.flush())
                .map_err(|e| Box::new(OsError::file(file_path.as_path(), e)))
        });
        self.succeeded("append_file", path, result)
    }

    /// Full paths of all regular files below `root`, sorted; empty on any traversal error.
    pub fn walk_tree(&self, root: &str) -> Vec<String> {
        let result = self.pal.walk_directory(&FilePath::from(root)).and_then(|files| {
            files
                .map(|file| file.map(FilePath::into_string))
                .collect::<OsResult<Vec<_>>>()
        });
        let mut files = self.or_sentinel("walk_tree", root, result, Vec::new());
        files.sort();
        files
    }

    /// Permission bits (`mode & 0o777`), or `-1` on error.
    pub fn get_permission_bits(&self, path: &str) -> i32 {
        let result = self
            .pal
            .permissions(&FilePath::from(path))
            .map(|mode| (mode & 0o777) as i32);
        self.or_sentinel("get_permission_bits", path, result, -1)
    }

    pub fn set_permission_bits(&self, path: &str, mode: u32) -> bool {
        let result = self.pal.set_permissions(&FilePath::from(path), mode);
        self.succeeded("set_permission_bits", path, result)
    }
}
