/// Single-instance lockfile
///
/// Prevents two server processes from opening the same SQLite database
/// concurrently. A plain exclusive-create file next to the database path;
/// held for the process lifetime and removed on graceful shutdown.
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

pub struct Lockfile {
    path: PathBuf,
}

impl Lockfile {
    /// Acquires the lock at `db_path` + `.lock`. Fails if another process
    /// already holds it.
    pub fn acquire(db_path: &Path) -> io::Result<Self> {
        let path = lock_path(db_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let result = OpenOptions::new().write(true).create_new(true).open(&path);
        match result {
            Ok(mut file) => {
                use std::io::Write;
                write!(file, "{}", std::process::id())?;
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "another SparkQ instance appears to be running (lockfile {} exists)",
                    path.display()
                ),
            )),
            Err(e) => Err(e),
        }
    }

    pub fn release(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        self.release();
    }
}

fn lock_path(db_path: &Path) -> PathBuf {
    let mut os_string = db_path.as_os_str().to_owned();
    os_string.push(".lock");
    PathBuf::from(os_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_acquire_and_release() {
        let db_path = env::temp_dir().join(format!("sparkq-lock-test-{}.db", std::process::id()));
        let lock = Lockfile::acquire(&db_path).expect("should acquire free lock");
        assert!(lock_path(&db_path).exists());
        drop(lock);
        assert!(!lock_path(&db_path).exists());
    }

    #[test]
    fn test_second_acquire_fails() {
        let db_path =
            env::temp_dir().join(format!("sparkq-lock-test-dup-{}.db", std::process::id()));
        let first = Lockfile::acquire(&db_path).expect("first acquire should succeed");
        let second = Lockfile::acquire(&db_path);
        assert!(second.is_err());
        drop(first);
    }
}
