/* 📖 # What does oskit_os provide?

`Os` is the path and filesystem facade: one struct whose methods read like a scripting
language's `os` and `os.path` modules and never return errors. It sits on top of the platform
abstraction layer from oskit_base, which it exposes again through `Os::pal()` for callers that
need to know why something failed.
*/

pub mod config;
mod os;
pub mod random;

pub use config::{OsConfig, load_config};
pub use os::{DEFAULT_DIRECTORY_MODE, Os};
pub use random::TokenGenerator;
