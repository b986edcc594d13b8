use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

const BUSY_BACKOFF: Duration = Duration::from_millis(100);

/// Remove a file or directory tree.
///
/// A missing path is not an error. Other failures (busy files on Windows,
/// a concurrent writer refilling a directory) are retried up to
/// `max_busy_tries` times with linearly growing backoff. Returns whether
/// anything was removed.
pub fn remove_path(path: &Path, max_busy_tries: u32) -> io::Result<bool> {
    let mut attempt = 0;

    loop {
        match remove_once(path) {
            Ok(()) => return Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) if attempt < max_busy_tries => {
                attempt += 1;
                eprintln!(
                    "[clean] Retrying {} ({}/{}): {}",
                    path.display(),
                    attempt,
                    max_busy_tries,
                    e
                );
                thread::sleep(BUSY_BACKOFF * attempt);
            }
            Err(e) => return Err(e),
        }
    }
}

fn remove_once(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
