/* 📖 # Why does the facade return sentinels instead of Results?

`Os` mirrors the ergonomics of a scripting language's `os` module: `exists` is a plain bool,
`size` of a missing file is `0`, listing an unreadable directory gives an empty list. Callers
that only want the happy path get one-liners. Every swallowed error is still logged at debug
level, and callers that need the reason go through `Os::pal()`, the checked surface with the
same operations returning `OsResult`.
*/

mod env_ops;
mod fs_ops;
mod path_ops;

use tracing::debug;

use oskit_base::{ErrorKind, OsError, OsResult, PalHandle, Platform, RealPal};

use crate::config::OsConfig;
use crate::random::TokenGenerator;

/// Default mode for new directories, before the umask is applied.
pub const DEFAULT_DIRECTORY_MODE: u32 = 0o777;

/// Path and filesystem facade over a platform abstraction layer.
///
/// # Examples
///
/// ```
/// use oskit_base::{MockPal, PalHandle};
/// use oskit_os::Os;
///
/// let os = Os::new(PalHandle::new(MockPal::new()));
/// assert!(os.write_file("/notes.txt", b"hello"));
/// assert_eq!(os.size("/notes.txt"), 5);
/// assert!(!os.exists("/nonexistent"));
/// ```
#[derive(Debug)]
pub struct Os {
    pal: PalHandle,
    platform: Platform,
    tokens: Option<TokenGenerator>,
}

impl Os {
    /// A facade over `pal`, using its path conventions and the shared random generator.
    pub fn new(pal: PalHandle) -> Self {
        let platform = pal.platform();
        Self {
            pal,
            platform,
            tokens: None,
        }
    }

    /// A facade over the host operating system.
    pub fn real() -> Self {
        Self::new(PalHandle::new(RealPal::new()))
    }

    /// A facade over `pal` with `config` applied.
    ///
    /// Fails if the configured platform is not the one `pal` runs on: working directory and
    /// filesystem paths would not parse under the configured conventions.
    pub fn from_config(pal: PalHandle, config: &OsConfig) -> OsResult<Self> {
        let mut os = Self::new(pal);
        if let Some(expected) = config.platform {
            if expected != os.platform {
                return Err(Box::new(OsError::new(ErrorKind::InvalidInput {
                    message: format!(
                        "configured platform {} does not match host platform {}",
                        expected, os.platform
                    ),
                })));
            }
        }
        os.tokens = config.random_seed.map(TokenGenerator::seeded);
        Ok(os)
    }

    /// The checked surface: the same operations, returning the underlying errors.
    pub fn pal(&self) -> &PalHandle {
        &self.pal
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Collapses a result into its value or `fallback`, logging the swallowed error.
    fn or_sentinel<T>(&self, operation: &str, path: &str, result: OsResult<T>, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(error) => {
                debug!(
                    operation,
                    path,
                    reason = ?error.reason(),
                    root_cause = %error.root_cause(),
                    %error,
                    "returning sentinel"
                );
                fallback
            }
        }
    }

    fn succeeded(&self, operation: &str, path: &str, result: OsResult<()>) -> bool {
        self.or_sentinel(operation, path, result.map(|()| true), false)
    }
}
