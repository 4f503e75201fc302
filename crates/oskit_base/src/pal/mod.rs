/* 📖 # What is the Platform Abstraction Layer?

The PAL provides a trait-based abstraction over filesystem and process-environment operations,
enabling testable code.
Key benefits:
- Testability: MockPal allows deterministic unit tests without touching the host
- Flexibility: Switch between the real operating system and an in-memory implementation
- Consistency: All operations report failures through the same OsError type

This follows the Dependency Inversion Principle—code depends on abstractions (Pal trait),
not concrete implementations (RealPal or MockPal).
*/

mod file_path;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{FileInfo, FileType, Pal, PalHandle, ReadSeek};
