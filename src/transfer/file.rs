use std::fs::File;
use std::os::fd::{AsRawFd, RawFd};
use std::path::Path;

use crate::error::ResourceError;

/// The file served to every GET and HEAD request, opened read-only with its
/// byte length captured once.
///
/// The length is never refreshed: a transfer serves the size observed at open
/// time even if the file changes on disk underneath it. Each connection opens
/// its own `ServedFile` so the kernel-side read position is private to that
/// transfer.
#[derive(Debug)]
pub struct ServedFile {
    file: File,
    len: u64,
}

impl ServedFile {
    /// Opens `path` read-only and records its current size.
    pub fn open(path: &Path) -> Result<Self, ResourceError> {
        let file = File::open(path).map_err(|source| ResourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let meta = file.metadata().map_err(|source| ResourceError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(ResourceError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            file,
            len: meta.len(),
        })
    }

    /// Byte length captured at open time.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}
