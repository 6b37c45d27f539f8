use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::fifo::FifoReader;

/// A filesystem FIFO owned by the consumer side of the channel.
///
/// Creating a `NamedPipe` makes the FIFO if it does not exist yet. A FIFO
/// that already exists is adopted as-is and left in place on drop; one created
/// here is removed on drop, unless the path was replaced in the meantime.
pub struct NamedPipe {
    path: PathBuf,
    created_inode: Option<(u64, u64)>,
    /// Whether the path should be removed on drop (only FIFOs we created).
    cleanup_on_drop: bool,
}

impl NamedPipe {
    /// Default permission mode for created FIFOs.
    pub const DEFAULT_FIFO_MODE: u32 = 0o600;

    /// Create (or adopt) a FIFO at `path` with the default mode.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_mode(path, Self::DEFAULT_FIFO_MODE)
    }

    /// Create (or adopt) a FIFO at `path` with an explicit mode.
    pub fn create_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Reuse an existing FIFO, but never replace a non-FIFO file.
        match std::fs::symlink_metadata(&path) {
            Ok(metadata) if metadata.file_type().is_fifo() => {
                debug!(?path, "adopting existing fifo");
                return Ok(Self {
                    path,
                    created_inode: None,
                    cleanup_on_drop: false,
                });
            }
            Ok(_) => {
                return Err(TransportError::Create {
                    path,
                    source: std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "existing path is not a fifo",
                    ),
                });
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(TransportError::Create { path, source: err }),
        }

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| TransportError::InvalidPath { path: path.clone() })?;

        // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
        let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
        if rc != 0 {
            return Err(TransportError::Create {
                path,
                source: std::io::Error::last_os_error(),
            });
        }

        // mkfifo applies the umask; set the requested mode explicitly.
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            TransportError::Create {
                path: path.clone(),
                source: e,
            }
        })?;
        let created_metadata =
            std::fs::symlink_metadata(&path).map_err(|e| TransportError::Create {
                path: path.clone(),
                source: e,
            })?;
        let created_inode = Some((created_metadata.dev(), created_metadata.ino()));

        info!(?path, "created fifo");

        Ok(Self {
            path,
            created_inode,
            cleanup_on_drop: true,
        })
    }

    /// Open a persistent read end on this FIFO.
    ///
    /// See [`FifoReader::open_persistent`].
    pub fn open_reader(&self) -> Result<FifoReader> {
        FifoReader::open_persistent(&self.path)
    }

    /// The path of this FIFO.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this handle created the FIFO (and will remove it on drop).
    pub fn created(&self) -> bool {
        self.cleanup_on_drop
    }
}

impl Drop for NamedPipe {
    fn drop(&mut self) {
        if self.cleanup_on_drop {
            if let Some((expected_dev, expected_ino)) = self.created_inode {
                if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
                    if metadata.file_type().is_fifo()
                        && metadata.dev() == expected_dev
                        && metadata.ino() == expected_ino
                    {
                        debug!(path = ?self.path, "removing fifo");
                        let _ = std::fs::remove_file(&self.path);
                    } else {
                        debug!(
                            path = ?self.path,
                            "fifo path identity changed; skipping cleanup"
                        );
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for NamedPipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedPipe")
            .field("path", &self.path)
            .field("created", &self.cleanup_on_drop)
            .finish()
    }
}

/// Returns true if `path` resolves to a FIFO.
pub fn is_fifo(path: impl AsRef<Path>) -> bool {
    std::fs::metadata(path)
        .map(|m| m.file_type().is_fifo())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "graphpipe-named-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_create_and_cleanup() {
        let dir = unique_dir("create");
        let fifo_path = dir.join("graph_pipe");

        let pipe = NamedPipe::create(&fifo_path).unwrap();
        assert!(pipe.created());
        assert!(is_fifo(&fifo_path));

        drop(pipe);
        assert!(!fifo_path.exists(), "fifo should be removed on drop");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_create_default_permissions() {
        let dir = unique_dir("perms");
        let fifo_path = dir.join("graph_pipe");

        let pipe = NamedPipe::create(&fifo_path).unwrap();
        let mode = std::fs::metadata(&fifo_path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        drop(pipe);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_create_rejects_existing_regular_file() {
        let dir = unique_dir("regular");
        let fifo_path = dir.join("graph_pipe");
        std::fs::write(&fifo_path, b"regular-file").unwrap();

        let result = NamedPipe::create(&fifo_path);
        assert!(matches!(result, Err(TransportError::Create { .. })));
        assert_eq!(std::fs::read(&fifo_path).unwrap(), b"regular-file");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_existing_fifo_is_adopted_and_kept() {
        let dir = unique_dir("adopt");
        let fifo_path = dir.join("graph_pipe");

        let owner = NamedPipe::create(&fifo_path).unwrap();
        let adopted = NamedPipe::create(&fifo_path).unwrap();
        assert!(!adopted.created());

        drop(adopted);
        assert!(is_fifo(&fifo_path), "adopted fifo must survive drop");

        drop(owner);
        assert!(!fifo_path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_drop_does_not_remove_replaced_path() {
        let dir = unique_dir("replaced");
        let fifo_path = dir.join("graph_pipe");

        let pipe = NamedPipe::create(&fifo_path).unwrap();
        std::fs::remove_file(&fifo_path).unwrap();
        std::fs::write(&fifo_path, b"replacement-file").unwrap();

        drop(pipe);
        assert!(
            fifo_path.exists(),
            "drop must not remove path if inode identity changed"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_is_fifo_false_for_missing_path() {
        assert!(!is_fifo("/nonexistent/graphpipe/graph_pipe"));
    }
}
