//! Filesystem utilities

use std::path::Path;

use log::warn;

/// Check if a path is a regular file
///
/// Logs a warning when the path exists but is something else, e.g. a
/// directory passed where a database file was expected.
pub fn is_file(path: &str) -> bool {
    let path = Path::new(path);
    if path.exists() && !path.is_file() {
        warn!("Expected a file but found something else: {}", path.display());
        return false;
    }
    path.is_file()
}
