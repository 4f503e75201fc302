/* 📖 # Why have oskit_base as a core library?
oskit_base provides the foundations the facade is built on: error handling, tracing setup,
pure path manipulation and the platform abstraction layer. Keeping them in their own crate keeps
the facade thin and lets tests of the path layer run without any I/O.
*/

pub mod error;
pub mod pal;
pub mod path;
pub mod platform;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, FailureReason, OsError, OsResult, ResultExt};
pub use pal::{FileInfo, FilePath, FileType, MockPal, Pal, PalHandle, RealPal};
pub use path::ParsedPath;
pub use platform::Platform;
