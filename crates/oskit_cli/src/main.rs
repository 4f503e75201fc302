/* 📖 # Why is the CLI minimal and hardcoded?

The CLI is a smoke test of the facade on the host machine, not a general tool, so it takes no
arguments. It always looks for `oskit.toml` in the current directory and otherwise runs with
defaults.

The workflow is straightforward:
1. Optionally place an `oskit.toml` in the working directory
2. Run `oskit`
3. Read the report: path operations, locations, separators and a scratch round trip

Exit codes:
- 0: Success
- 1: Error (config unreadable or invalid, a config platform other than the host's, or the
  scratch round trip failed)
*/

use std::process;

use oskit_base::tracing::{init_tracing, init_tracing_with_filter};
use oskit_base::{FilePath, PalHandle, RealPal};
use oskit_os::{DEFAULT_DIRECTORY_MODE, Os, OsConfig, load_config};
use tracing::{info, warn};

const CONFIG_FILE: &str = "oskit.toml";
const SCRATCH_CONTENT: &[u8] = b"Hello, World!";

fn main() {
    let pal = PalHandle::new(RealPal::new());

    let config_path = FilePath::from(CONFIG_FILE);
    let config = match pal.file_exists(&config_path) {
        Ok(false) => OsConfig::default(),
        Ok(true) => load_config(&pal, &config_path).unwrap_or_else(|e| {
            eprintln!("Error: Failed to load config from {}: {}", CONFIG_FILE, e);
            process::exit(1);
        }),
        Err(e) => {
            eprintln!("Error: Cannot access {}: {}", CONFIG_FILE, e);
            process::exit(1);
        }
    };

    let tracing_result = match &config.log_filter {
        Some(filter) => init_tracing_with_filter(filter),
        None => init_tracing(),
    };
    if let Err(e) = tracing_result {
        eprintln!("Warning: Logging disabled: {}", e);
    }

    let os = Os::from_config(pal, &config).unwrap_or_else(|e| {
        eprintln!("Error: Invalid config in {}: {}", CONFIG_FILE, e);
        process::exit(1);
    });
    info!(platform = %os.platform(), "starting report");

    println!("=== oskit report ===");
    report_paths(&os);
    report_locations(&os);
    report_separators(&os);

    println!("\n4. Scratch round trip:");
    match scratch_round_trip(&os) {
        Ok(()) => println!("  round trip succeeded"),
        Err(message) => {
            eprintln!("Error: Scratch round trip failed: {}", message);
            process::exit(1);
        }
    }
}

fn report_paths(os: &Os) {
    println!("\n1. Path operations:");
    println!("  join:      {}", os.join(&["dir1", "dir2", "file.txt"]));
    println!("  absolute:  {}", os.absolute(CONFIG_FILE));
    println!("  basename:  {}", os.basename("/home/user/file.txt"));
    println!("  exists({}): {}", CONFIG_FILE, os.exists(CONFIG_FILE));
    println!("  normalize: {}", os.normalize("./a/../b//c"));
}

fn report_locations(os: &Os) {
    println!("\n2. Locations:");
    println!("  working directory: {}", os.current_directory());
    println!("  temp directory:    {}", os.temporary_directory_path());
    println!("  home directory:    {}", os.home_directory());
}

fn report_separators(os: &Os) {
    println!("\n3. Separators:");
    println!("  path separator:      {}", os.path_separator());
    println!("  path list separator: {}", os.path_list_separator());
    println!("  line separator:      {:?}", os.line_separator());
}

/// Creates a scratch directory in the temp directory, writes and reads back a file, and
/// removes the directory again.
fn scratch_round_trip(os: &Os) -> Result<(), String> {
    let scratch = os.join(&[
        os.temporary_directory_path(),
        format!("oskit-{}", os.random_string(12)),
    ]);
    if !os.create_directory(&scratch, DEFAULT_DIRECTORY_MODE) {
        return Err(format!("could not create {}", scratch));
    }
    println!("  created {}", scratch);

    let file = os.join(&[scratch.as_str(), "test.txt"]);
    let outcome = check_file(os, &file);

    let removed = os.remove_tree(&scratch);
    println!("  removed {} entries", removed);
    if os.exists(&scratch) {
        warn!(path = %scratch, "scratch directory survived removal");
        return Err(format!("could not remove {}", scratch));
    }
    outcome
}

fn check_file(os: &Os, file: &str) -> Result<(), String> {
    if !os.write_file(file, SCRATCH_CONTENT) {
        return Err(format!("could not write {}", file));
    }
    println!("  wrote {} ({} bytes)", file, os.size(file));

    let content = os.read_file(file);
    if content != SCRATCH_CONTENT {
        return Err(format!("read back {} bytes that differ from what was written", content.len()));
    }
    println!("  read back: {}", String::from_utf8_lossy(&content));
    Ok(())
}
