/* 📖 # What is the path layer?

Pure, side-effect-free functions over path strings, in the spirit of a scripting language's
`os.path`. Nothing here touches the filesystem or the process environment: every function takes
the `Platform` whose conventions apply, so Windows rules can be tested on Unix and vice versa.
Operations that need the working directory or the real filesystem live on the facade, which
feeds them into these functions.
*/

mod parsed;

pub use parsed::{Anchor, ParsedPath};

use crate::Platform;
use parsed::render_parts;

/// Joins segments with the platform separator.
///
/// This is a purely textual join: empty segments are skipped, a separator is inserted only
/// where neither side already provides one, and an absolute-looking later segment does not
/// discard what came before it.
///
/// ```
/// use oskit_base::{path, Platform};
///
/// assert_eq!(path::join(Platform::Unix, &["dir1", "dir2", "file.txt"]), "dir1/dir2/file.txt");
/// assert_eq!(path::join(Platform::Unix, &["a", "/b"]), "a/b");
/// ```
pub fn join<S: AsRef<str>>(platform: Platform, segments: &[S]) -> String {
    let mut out = String::new();
    for segment in segments {
        let segment: &str = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        let ends_with_sep = out.chars().last().is_some_and(|c| platform.is_separator(c));
        let starts_with_sep = segment.chars().next().is_some_and(|c| platform.is_separator(c));
        if !out.is_empty() && !ends_with_sep && !starts_with_sep {
            out.push(platform.separator());
        }
        out.push_str(segment);
    }
    out
}

/// Splits a path into its anchor (if any) followed by its segments.
///
/// `split(join(segments))` gives back the segments for any list of non-empty segments that
/// contain no separators, and `join(split(p))` is `p` without redundant separators.
pub fn split(platform: Platform, path: &str) -> Vec<String> {
    let parsed = ParsedPath::parse(platform, path);
    let anchor = parsed.anchor().render(platform);
    let mut parts = Vec::with_capacity(parsed.segments().len() + 1);
    if !anchor.is_empty() {
        parts.push(anchor);
    }
    parts.extend(parsed.segments().iter().map(|s| s.to_string()));
    parts
}

/// Lexically collapses redundant separators, `.` and `..`.
///
/// `..` above a root is dropped, `..` at the start of a relative path is kept. An empty path
/// normalizes to `.`. The function is idempotent.
pub fn normalize(platform: Platform, path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let parsed = ParsedPath::parse(platform, path);
    let anchor = parsed.anchor();
    let segments = collapse(parsed.segments(), anchor.rooted);
    let rendered = render_parts(platform, anchor, &segments);
    if rendered.is_empty() {
        ".".to_string()
    } else {
        rendered
    }
}

fn collapse<'a>(segments: &[&'a str], rooted: bool) -> Vec<&'a str> {
    let mut out: Vec<&'a str> = Vec::with_capacity(segments.len());
    for segment in segments {
        match *segment {
            "." => {}
            ".." => {
                if out.last().is_some_and(|last| *last != "..") {
                    out.pop();
                } else if !rooted {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolves `path` against `cwd` and normalizes the result.
///
/// An empty `path` yields the (normalized) working directory. On Windows a root-relative path
/// such as `\temp` takes the drive of `cwd`, and a drive-relative path such as `D:temp` is
/// anchored at the root of its own drive unless that drive is the working directory's.
pub fn make_absolute(platform: Platform, path: &str, cwd: &str) -> String {
    if path.is_empty() {
        return normalize(platform, cwd);
    }
    let parsed = ParsedPath::parse(platform, path);
    if parsed.is_absolute() {
        return normalize(platform, path);
    }
    let anchor = parsed.anchor();
    let (cwd_anchor, _) = Anchor::split(platform, cwd);
    if anchor.rooted {
        return normalize(platform, &format!("{}{}", cwd_anchor.prefix, path));
    }
    let cwd_drive = Anchor {
        rooted: false,
        ..cwd_anchor
    };
    if !anchor.prefix.is_empty() && !anchor.same_root(&cwd_drive, platform) {
        let rest = &path[anchor.raw.len()..];
        return normalize(platform, &format!("{}{}{}", anchor.prefix, platform.separator(), rest));
    }
    let rest = &path[anchor.raw.len()..];
    normalize(platform, &join(platform, &[cwd, rest]))
}

/// Whether the path is absolute under the platform's rules.
pub fn is_absolute(platform: Platform, path: &str) -> bool {
    ParsedPath::parse(platform, path).is_absolute()
}

/// Splits into (anchor + directory part, final segment) the way `os.path.split` does.
fn split_head_tail(platform: Platform, path: &str) -> (String, &str) {
    let (anchor, rest) = Anchor::split(platform, path);
    match rest.rfind(|c| platform.is_separator(c)) {
        Some(index) => {
            let head = rest[..index].trim_end_matches(|c| platform.is_separator(c));
            (format!("{}{}", anchor.raw, head), &rest[index + 1..])
        }
        None => (anchor.raw.to_string(), rest),
    }
}

/// The final segment. A trailing separator yields an empty basename.
pub fn basename(platform: Platform, path: &str) -> String {
    split_head_tail(platform, path).1.to_string()
}

/// Everything before the final segment, with trailing separators removed (the root is kept).
pub fn dirname(platform: Platform, path: &str) -> String {
    split_head_tail(platform, path).0
}

/// Splits the final segment into its stem and extension.
///
/// The extension is the suffix from the last `.` of the final segment. Leading dots of the
/// final segment never start an extension, so `.bashrc` has none. Directory components are not
/// part of the stem.
///
/// ```
/// use oskit_base::{path, Platform};
///
/// let (stem, ext) = path::split_extension_pair(Platform::Unix, "backups/archive.tar.gz");
/// assert_eq!((stem.as_str(), ext.as_str()), ("archive.tar", ".gz"));
/// ```
pub fn split_extension_pair(platform: Platform, path: &str) -> (String, String) {
    let name = split_head_tail(platform, path).1;
    let extension_len = match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => name.len() - dot,
        _ => 0,
    };
    let (stem, extension) = name.split_at(name.len() - extension_len);
    (stem.to_string(), extension.to_string())
}

/// The extension part of [`split_extension_pair`], empty if none.
pub fn split_extension(platform: Platform, path: &str) -> String {
    split_extension_pair(platform, path).1
}

/// Computes `path` relative to `base` lexically.
///
/// Both paths are normalized first. Returns `None` when no relative path exists: different
/// roots or drives, an empty input, or a `base` that climbs above where `path` starts.
pub fn relative_to(platform: Platform, path: &str, base: &str) -> Option<String> {
    if path.is_empty() || base.is_empty() {
        return None;
    }
    let path = normalize(platform, path);
    let base = normalize(platform, base);
    let target = ParsedPath::parse(platform, &path);
    let start = ParsedPath::parse(platform, &base);
    if !target.anchor().same_root(start.anchor(), platform) {
        return None;
    }

    let same_segment = |a: &str, b: &str| match platform {
        Platform::Unix => a == b,
        Platform::Windows => a.eq_ignore_ascii_case(b),
    };
    let common = target
        .segments()
        .iter()
        .zip(start.segments())
        .take_while(|(a, b)| same_segment(a, b))
        .count();
    let remaining_base = &start.segments()[common..];
    if remaining_base.contains(&"..") {
        return None;
    }

    let mut parts: Vec<&str> = vec![".."; remaining_base.len()];
    parts.extend_from_slice(&target.segments()[common..]);
    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join(&platform.separator().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Platform::{Unix, Windows};

    #[test]
    fn test_join_scenario() {
        assert_eq!(join(Unix, &["dir1", "dir2", "file.txt"]), "dir1/dir2/file.txt");
        assert_eq!(join(Windows, &["dir1", "dir2", "file.txt"]), "dir1\\dir2\\file.txt");
    }

    #[test]
    fn test_join_empty_input() {
        let empty: [&str; 0] = [];
        assert_eq!(join(Unix, &empty), "");
        assert_eq!(join(Unix, &["", ""]), "");
    }

    #[test]
    fn test_join_does_not_reset_on_absolute_segment() {
        assert_eq!(join(Unix, &["a", "/b"]), "a/b");
        assert_eq!(join(Unix, &["/", "usr", "lib"]), "/usr/lib");
        assert_eq!(join(Unix, &["a/", "b"]), "a/b");
    }

    #[test]
    fn test_split_join_round_trip() {
        let cases: [&[&str]; 4] = [
            &["dir1", "dir2", "file.txt"],
            &["/", "usr", "local"],
            &["single"],
            &["..", "up", "there"],
        ];
        for segments in cases {
            let joined = join(Unix, segments);
            assert_eq!(split(Unix, &joined), segments, "round trip of {joined}");
        }
        let windows: &[&str] = &["C:\\", "Users", "me"];
        assert_eq!(split(Windows, &join(Windows, windows)), windows);
    }

    #[test]
    fn test_split_collapses_redundant_separators() {
        assert_eq!(split(Unix, "//a///b/"), ["/", "a", "b"]);
        assert!(split(Unix, "").is_empty());
    }

    #[test]
    fn test_normalize() {
        let cases = [
            ("", "."),
            (".", "."),
            ("a/./b", "a/b"),
            ("a//b///c", "a/b/c"),
            ("a/b/../c", "a/c"),
            ("a/..", "."),
            ("../a/../../b", "../../b"),
            ("/../a", "/a"),
            ("/a/b/../../..", "/"),
            ("a/b/", "a/b"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize(Unix, input), expected, "normalize({input:?})");
        }
    }

    #[test]
    fn test_normalize_windows() {
        assert_eq!(normalize(Windows, "C:/a/./b/../c"), "C:\\a\\c");
        assert_eq!(normalize(Windows, "C:\\..\\x"), "C:\\x");
        assert_eq!(normalize(Windows, "C:..\\x"), "C:..\\x");
        assert_eq!(normalize(Windows, "\\\\srv\\share\\a\\..\\b"), "\\\\srv\\share\\b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = ["", "a/../..", "/x/./y//", "../../z/..", "./", "a/b/c/../../d"];
        for input in inputs {
            let once = normalize(Unix, input);
            assert_eq!(normalize(Unix, &once), once, "idempotence of {input:?}");
        }
        for input in ["C:\\a\\..\\..", "\\\\s\\h\\x\\.", "d:x/./y"] {
            let once = normalize(Windows, input);
            assert_eq!(normalize(Windows, &once), once, "idempotence of {input:?}");
        }
    }

    #[test]
    fn test_make_absolute() {
        assert_eq!(make_absolute(Unix, "", "/home/me"), "/home/me");
        assert_eq!(make_absolute(Unix, "docs/../a.txt", "/home/me"), "/home/me/a.txt");
        assert_eq!(make_absolute(Unix, "/etc//hosts", "/home/me"), "/etc/hosts");
        assert_eq!(make_absolute(Unix, "../..", "/home"), "/");
    }

    #[test]
    fn test_make_absolute_windows() {
        assert_eq!(make_absolute(Windows, "x\\y", "C:\\work"), "C:\\work\\x\\y");
        assert_eq!(make_absolute(Windows, "\\temp", "C:\\work"), "C:\\temp");
        assert_eq!(make_absolute(Windows, "D:data", "C:\\work"), "D:\\data");
        assert_eq!(make_absolute(Windows, "c:data", "C:\\work"), "C:\\work\\data");
    }

    #[test]
    fn test_absolute_is_always_absolute() {
        for input in ["", ".", "..", "a/b", "/x", "../../../.."] {
            assert!(is_absolute(Unix, &make_absolute(Unix, input, "/srv/app")), "{input:?}");
        }
        for input in ["", "a", "\\b", "E:c", "\\\\s\\h"] {
            let absolute = make_absolute(Windows, input, "C:\\work");
            assert!(is_absolute(Windows, &absolute), "{input:?} -> {absolute:?}");
        }
    }

    #[test]
    fn test_basename_and_dirname() {
        let cases = [
            ("/home/user/file.txt", "/home/user", "file.txt"),
            ("/home", "/", "home"),
            ("file.txt", "", "file.txt"),
            ("a/b/", "a/b", ""),
            ("/", "/", ""),
            ("a//b", "a", "b"),
        ];
        for (input, dir, base) in cases {
            assert_eq!(dirname(Unix, input), dir, "dirname({input:?})");
            assert_eq!(basename(Unix, input), base, "basename({input:?})");
        }
        assert_eq!(basename(Windows, "C:\\dir\\f.txt"), "f.txt");
        assert_eq!(dirname(Windows, "C:\\dir\\f.txt"), "C:\\dir");
        assert_eq!(dirname(Windows, "C:\\f.txt"), "C:\\");
        assert_eq!(basename(Windows, "C:f.txt"), "f.txt");
    }

    #[test]
    fn test_split_extension_pair() {
        let cases = [
            ("archive.tar.gz", "archive.tar", ".gz"),
            ("dir/file.txt", "file", ".txt"),
            ("/srv/data/report.final.pdf", "report.final", ".pdf"),
            ("noext", "noext", ""),
            (".bashrc", ".bashrc", ""),
            ("home/.bashrc", ".bashrc", ""),
            ("..", "..", ""),
            ("dir.d/file", "file", ""),
            ("dir/", "", ""),
            ("name.", "name", "."),
            ("..hidden.cfg", "..hidden", ".cfg"),
        ];
        for (input, stem, ext) in cases {
            let (s, e) = split_extension_pair(Unix, input);
            assert_eq!((s.as_str(), e.as_str()), (stem, ext), "split_extension_pair({input:?})");
            assert_eq!(split_extension(Unix, input), ext);
        }
        assert_eq!(split_extension(Windows, "C:\\dir.d\\file"), "");
        let (stem, ext) = split_extension_pair(Windows, "C:\\docs\\notes.txt");
        assert_eq!((stem.as_str(), ext.as_str()), ("notes", ".txt"));
    }

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute(Unix, "/"));
        assert!(!is_absolute(Unix, "a/b"));
        assert!(!is_absolute(Unix, "C:\\x"));
        assert!(is_absolute(Windows, "C:\\x"));
        assert!(is_absolute(Windows, "\\\\server\\share"));
        assert!(!is_absolute(Windows, "C:x"));
    }

    #[test]
    fn test_relative_to() {
        let rel = |p, b| relative_to(Unix, p, b);
        assert_eq!(rel("/a/b/c", "/a").as_deref(), Some("b/c"));
        assert_eq!(rel("/a/b", "/a/c/d").as_deref(), Some("../../b"));
        assert_eq!(rel("/a", "/a").as_deref(), Some("."));
        assert_eq!(rel("x/y", "x").as_deref(), Some("y"));
        assert_eq!(rel("a", "/a"), None);
        assert_eq!(rel("a", "../b"), None);
        assert_eq!(rel("", "/a"), None);
    }

    #[test]
    fn test_relative_to_windows() {
        let rel = |p, b| relative_to(Windows, p, b);
        assert_eq!(rel("C:\\a\\B\\c", "c:\\a\\b").as_deref(), Some("c"));
        assert_eq!(rel("C:\\a", "D:\\a"), None);
    }
}
