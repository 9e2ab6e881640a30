//! Size-, count- and age-bounded rotating log file
//!
//! [`RotatingFile`] is a plain [`std::io::Write`] destination. When a write
//! would push the active file past the size limit, the file is renamed to
//! `{name}.1` (older backups shift up by one), optionally gzip-compressed to
//! `{name}.1.gz`, and a fresh file is opened. Backups beyond the count limit
//! or older than the age limit are deleted.

use crate::core::error::{LoggerError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Limits applied by [`RotatingFile`]
///
/// # Examples
///
/// ```
/// use logwrap::appenders::RotationPolicy;
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(10 * 1024 * 1024)
///     .with_max_backups(5)
///     .with_max_age(Duration::from_secs(7 * 24 * 3600))
///     .with_compression(true);
/// assert_eq!(policy.max_backups, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RotationPolicy {
    /// Rotate before the active file would exceed this many bytes
    pub max_bytes: u64,
    /// Rotated files to keep
    pub max_backups: usize,
    /// Delete rotated files last modified longer ago than this
    pub max_age: Option<Duration>,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 100 * MEGABYTE,
            max_backups: 3,
            max_age: Some(28 * DAY),
            compress: false,
        }
    }
}

impl RotationPolicy {
    /// Create a new rotation policy with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy with sizes in megabytes and ages in days
    pub fn from_limits(max_size_mb: u64, max_backups: usize, max_age_days: u64, compress: bool) -> Self {
        Self {
            max_bytes: max_size_mb.saturating_mul(MEGABYTE),
            max_backups,
            max_age: Some(DAY.saturating_mul(u32::try_from(max_age_days).unwrap_or(u32::MAX))),
            compress,
        }
    }

    #[must_use]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_bytes = size;
        self
    }

    #[must_use]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, age: Duration) -> Self {
        self.max_age = Some(age);
        self
    }

    /// Keep rotated files regardless of age
    #[must_use]
    pub fn without_max_age(mut self) -> Self {
        self.max_age = None;
        self
    }

    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// Rotating log file
pub struct RotatingFile {
    base_path: PathBuf,
    policy: RotationPolicy,
    /// Unbuffered so each line reaches the OS as it is written
    writer: Option<File>,
    current_size: u64,
    /// Counter for consecutive deletion failures (reset on successful deletion)
    deletion_failure_count: usize,
}

impl RotatingFile {
    /// Open (or create) the active file at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let mut file = Self {
            base_path,
            policy,
            writer: None,
            current_size: 0,
            deletion_failure_count: 0,
        };
        file.open()?;
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Flush and release the file handle; the next write reopens it
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to flush on close: {}", e),
                )
            })?;
        }
        Ok(())
    }

    /// Rotate now, regardless of size
    pub fn rotate(&mut self) -> Result<()> {
        // Explicitly drop writer to release file handle before renaming
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.policy.max_backups == 0 {
            if self.base_path.exists() {
                fs::remove_file(&self.base_path).map_err(|e| {
                    LoggerError::file_rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to remove log file: {}", e),
                    )
                })?;
            }
            return self.open();
        }

        self.remove_oldest_backup()?;

        for i in (1..self.policy.max_backups).rev() {
            let old_path = self.backup_path(i);
            let new_path = self.backup_path(i + 1);

            let old_compressed = gz_path(&old_path);
            if old_compressed.exists() {
                rename_replacing(&old_compressed, &gz_path(&new_path))?;
            } else if old_path.exists() {
                rename_replacing(&old_path, &new_path)?;
            }
        }

        let backup_path = self.backup_path(1);
        if self.base_path.exists() {
            fs::rename(&self.base_path, &backup_path).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                compress_file(&backup_path)?;
            }
        }

        self.remove_expired_backups();
        self.open()
    }

    /// Paths of existing rotated files, newest first
    pub fn backups(&self) -> Vec<PathBuf> {
        (1..=self.policy.max_backups)
            .flat_map(|i| {
                let plain = self.backup_path(i);
                [gz_path(&plain), plain]
            })
            .filter(|p| p.exists())
            .collect()
    }

    fn open(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.base_path)
            .map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;

        self.current_size = metadata.len();
        self.writer = Some(file);
        Ok(())
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");
        path.set_file_name(format!("{}.{}", filename, index));
        path
    }

    /// Delete the backup that would be shifted past the count limit
    fn remove_oldest_backup(&mut self) -> Result<()> {
        const MAX_DELETION_FAILURES: usize = 5;

        let oldest_backup = self.backup_path(self.policy.max_backups);
        let mut deletion_failed = false;

        for candidate in [gz_path(&oldest_backup), oldest_backup] {
            if !candidate.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(&candidate) {
                deletion_failed = true;
                eprintln!(
                    "[WARN] Failed to remove oldest backup {}: {} (failure #{}/{})",
                    candidate.display(),
                    e,
                    self.deletion_failure_count + 1,
                    MAX_DELETION_FAILURES
                );
            }
        }

        if deletion_failed {
            self.deletion_failure_count += 1;
            if self.deletion_failure_count >= MAX_DELETION_FAILURES {
                return Err(LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!(
                        "Rotation aborted: failed to delete old backup files {} consecutive times",
                        self.deletion_failure_count
                    ),
                ));
            }
        } else {
            self.deletion_failure_count = 0;
        }
        Ok(())
    }

    fn remove_expired_backups(&self) {
        let Some(max_age) = self.policy.max_age else {
            return;
        };
        let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
            return;
        };

        for backup in self.backups() {
            let expired = fs::metadata(&backup)
                .and_then(|m| m.modified())
                .map(|modified| modified < cutoff)
                .unwrap_or(false);
            if expired {
                if let Err(e) = fs::remove_file(&backup) {
                    eprintln!(
                        "[WARN] Failed to remove expired backup {}: {}",
                        backup.display(),
                        e
                    );
                }
            }
        }
    }

    fn rotate_or_recover(&mut self) -> io::Result<()> {
        if let Err(e) = self.rotate() {
            eprintln!(
                "[WARN] Log rotation failed: {}. Continuing with current file.",
                e
            );
            if self.writer.is_none() {
                self.open().map_err(io::Error::other)?;
            }
            // Allow the file to grow past the limit rather than retrying on every write
            self.current_size = 0;
        }
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.writer.is_none() {
            self.open().map_err(io::Error::other)?;
        }

        let incoming = buf.len() as u64;
        if self.current_size > 0 && self.current_size.saturating_add(incoming) > self.policy.max_bytes {
            self.rotate_or_recover()?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("log file is not open"))?;
        let written = writer.write(buf)?;
        self.current_size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

/// `path` with `.gz` appended
fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

fn rename_replacing(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Some platforms refuse to rename over an existing file
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).map_err(|e| {
        LoggerError::file_rotation(
            from.display().to_string(),
            format!("Failed to rotate backup files: {}", e),
        )
    })
}

/// Gzip `path` into `path.gz`, removing the original on success
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let gz_path = gz_path(path);
    let mut temp_name = gz_path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_gz_path = PathBuf::from(temp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!(
                "Failed to create temporary compressed file: {}",
                temp_gz_path.display()
            ),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = (|| -> io::Result<()> {
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            encoder.write_all(&buffer[..bytes_read])?;
        }
        encoder.finish()?.flush()
    })();

    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    // The compressed copy is complete; a leftover original is only wasted space
    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn write_lines(file: &mut RotatingFile, count: usize) {
        for i in 0..count {
            writeln!(file, "Test message number {}", i).unwrap();
        }
        file.flush().unwrap();
    }

    #[test]
    fn test_rotation_policy_from_limits() {
        let policy = RotationPolicy::from_limits(100, 3, 28, true);
        assert_eq!(policy.max_bytes, 100 * 1024 * 1024);
        assert_eq!(policy.max_backups, 3);
        assert_eq!(policy.max_age, Some(Duration::from_secs(28 * 24 * 3600)));
        assert!(policy.compress);
        assert_eq!(RotationPolicy::default().max_backups, 3);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested/logs/app.log");

        let file = RotatingFile::new(&log_path, RotationPolicy::default()).unwrap();
        assert!(log_path.exists());
        assert_eq!(file.current_size(), 0);
        assert_eq!(file.path(), log_path);
    }

    #[test]
    fn test_size_based_rotation() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("rotation.log");
        let policy = RotationPolicy::new().with_max_size(100).with_max_backups(3);

        let mut file = RotatingFile::new(&log_path, policy).unwrap();
        write_lines(&mut file, 20);

        assert!(dir.path().join("rotation.log.1").exists());
        assert!(!dir.path().join("rotation.log.4").exists());
        assert!(file.current_size() <= 100);
        assert_eq!(file.backups().len(), 3);
    }

    #[test]
    fn test_compressed_backups() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("zipped.log");
        let policy = RotationPolicy::new()
            .with_max_size(64)
            .with_max_backups(2)
            .with_compression(true);

        let mut file = RotatingFile::new(&log_path, policy).unwrap();
        write_lines(&mut file, 10);

        let first = dir.path().join("zipped.log.1.gz");
        let second = dir.path().join("zipped.log.2.gz");
        assert!(first.exists());
        assert!(second.exists());
        assert!(!dir.path().join("zipped.log.1").exists());

        let mut decoded = String::new();
        flate2::read::GzDecoder::new(File::open(first).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.contains("Test message number"));
    }

    #[test]
    fn test_expired_backups_are_removed() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("aged.log");
        let stale = dir.path().join("aged.log.1");
        fs::write(&stale, "old entries\n").unwrap();
        OpenOptions::new()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();

        let policy = RotationPolicy::new()
            .with_max_backups(3)
            .with_max_age(Duration::from_secs(60));
        let mut file = RotatingFile::new(&log_path, policy).unwrap();
        writeln!(file, "fresh").unwrap();
        file.rotate().unwrap();

        // the stale backup was shifted to .2 and then pruned by age
        assert!(!dir.path().join("aged.log.2").exists());
        assert!(dir.path().join("aged.log.1").exists());
    }

    #[test]
    fn test_zero_backups_truncates() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("single.log");
        let policy = RotationPolicy::new().with_max_size(50).with_max_backups(0);

        let mut file = RotatingFile::new(&log_path, policy).unwrap();
        write_lines(&mut file, 10);

        assert!(file.backups().is_empty());
        assert!(fs::metadata(&log_path).unwrap().len() <= 50);
    }

    #[test]
    fn test_lines_visible_without_flush() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("direct.log");

        let mut file = RotatingFile::new(&log_path, RotationPolicy::default()).unwrap();
        file.write_all(b"first line\n").unwrap();

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "first line\n");
        assert_eq!(file.current_size(), 11);
    }

    #[test]
    fn test_close_then_reopen_on_write() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("reopen.log");

        let mut file = RotatingFile::new(&log_path, RotationPolicy::default()).unwrap();
        writeln!(file, "before close").unwrap();
        file.close().unwrap();
        assert!(!file.is_open());

        writeln!(file, "after close").unwrap();
        file.flush().unwrap();
        assert!(file.is_open());

        let content = fs::read_to_string(&log_path).unwrap();
        assert_eq!(content, "before close\nafter close\n");
    }
}
