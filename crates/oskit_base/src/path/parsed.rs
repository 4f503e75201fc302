use crate::Platform;

/* 📖 # Why parse paths into an anchor plus segments?

Every lexical operation (normalize, split, relative paths) needs the same two facts: where the
path is anchored (drive, UNC share, root) and which segments follow. Parsing once into
`ParsedPath` keeps the platform-specific prefix rules in a single place, so the operations
themselves only ever deal with a list of strings.
*/

/// The leading part of a path that segments are resolved against.
///
/// `raw` is the anchor exactly as written, `prefix` is the drive (`C:`) or UNC share
/// (`\\server\share`) and `rooted` tells whether a root separator follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor<'a> {
    pub raw: &'a str,
    pub prefix: &'a str,
    pub rooted: bool,
}

impl<'a> Anchor<'a> {
    /// Splits `text` into its anchor and the remainder that holds the segments.
    pub fn split(platform: Platform, text: &'a str) -> (Anchor<'a>, &'a str) {
        let prefix_len = match platform {
            Platform::Unix => 0,
            Platform::Windows => windows_prefix_len(text),
        };
        let prefix = &text[..prefix_len];
        let after_prefix = &text[prefix_len..];
        let rest = after_prefix.trim_start_matches(|c| platform.is_separator(c));
        let root_len = after_prefix.len() - rest.len();
        let is_unc = prefix_len > 0 && !prefix.ends_with(':');
        let anchor = Anchor {
            raw: &text[..prefix_len + root_len],
            prefix,
            rooted: root_len > 0 || is_unc,
        };
        (anchor, rest)
    }

    /// Whether this anchor is a UNC share rather than a drive letter.
    pub fn is_unc(&self) -> bool {
        !self.prefix.is_empty() && !self.prefix.ends_with(':')
    }

    /// Renders the anchor using the platform's primary separator.
    pub fn render(&self, platform: Platform) -> String {
        let sep = platform.separator();
        let mut out: String = self
            .prefix
            .chars()
            .map(|c| if platform.is_separator(c) { sep } else { c })
            .collect();
        if self.rooted {
            out.push(sep);
        }
        out
    }

    /// Anchors compare equal when they point at the same root. Drive letters and UNC names
    /// are case-insensitive on Windows.
    pub fn same_root(&self, other: &Anchor<'_>, platform: Platform) -> bool {
        if self.rooted != other.rooted {
            return false;
        }
        match platform {
            Platform::Unix => self.prefix == other.prefix,
            Platform::Windows => {
                let normalize = |p: &str| p.replace('/', "\\").to_lowercase();
                normalize(self.prefix) == normalize(other.prefix)
            }
        }
    }
}

/// Length of the drive (`C:`) or UNC (`\\server\share`) prefix of a Windows path.
fn windows_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let is_sep = |b: u8| b == b'\\' || b == b'/';
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return 2;
    }
    if bytes.len() >= 3 && is_sep(bytes[0]) && is_sep(bytes[1]) && !is_sep(bytes[2]) {
        let server_end = bytes[2..]
            .iter()
            .position(|b| is_sep(*b))
            .map_or(bytes.len(), |i| i + 2);
        if server_end == bytes.len() {
            return server_end;
        }
        let share_start = server_end + 1;
        let share_end = bytes[share_start..]
            .iter()
            .position(|b| is_sep(*b))
            .map_or(bytes.len(), |i| i + share_start);
        return share_end;
    }
    0
}

/// A path broken into its anchor and its non-empty segments.
///
/// Redundant separators disappear during parsing; `.` and `..` segments are kept so that
/// parsing alone never changes what a path refers to.
///
/// # Examples
///
/// ```
/// use oskit_base::{ParsedPath, Platform};
///
/// let parsed = ParsedPath::parse(Platform::Unix, "/usr//lib/./x.so");
/// assert_eq!(parsed.segments(), ["usr", "lib", ".", "x.so"]);
/// assert!(parsed.is_absolute());
/// assert_eq!(parsed.render(), "/usr/lib/./x.so");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath<'a> {
    platform: Platform,
    anchor: Anchor<'a>,
    segments: Vec<&'a str>,
}

impl<'a> ParsedPath<'a> {
    pub fn parse(platform: Platform, text: &'a str) -> Self {
        let (anchor, rest) = Anchor::split(platform, text);
        let segments = rest
            .split(|c| platform.is_separator(c))
            .filter(|segment| !segment.is_empty())
            .collect();
        Self {
            platform,
            anchor,
            segments,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn anchor(&self) -> &Anchor<'a> {
        &self.anchor
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// Unix: rooted. Windows: a drive with a root, or any UNC share.
    pub fn is_absolute(&self) -> bool {
        match self.platform {
            Platform::Unix => self.anchor.rooted,
            Platform::Windows => {
                self.anchor.is_unc() || (!self.anchor.prefix.is_empty() && self.anchor.rooted)
            }
        }
    }

    /// Renders the path with the primary separator and no redundant separators.
    pub fn render(&self) -> String {
        render_parts(self.platform, &self.anchor, &self.segments)
    }
}

pub(crate) fn render_parts(platform: Platform, anchor: &Anchor<'_>, segments: &[&str]) -> String {
    let mut out = anchor.render(platform);
    let sep = platform.separator().to_string();
    out.push_str(&segments.join(&sep));
    out
}
