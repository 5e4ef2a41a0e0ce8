//! Platform IO adapters
//!
//! A small tagged set of IO backends rather than a generic plugin trait:
//! [`SyncAdapter`] is the portable pread/pwrite fallback that works
//! everywhere, [`IoUringAdapter`] is the default on Linux and gives real
//! queue depth. Both open target files O_DIRECT and size them the way the
//! original tool did - reuse an existing file close to the requested size,
//! otherwise round up to a 128MiB boundary of the free space available,
//! and leave block devices untouched.

pub mod sync;

#[cfg(feature = "io_uring")]
pub mod io_uring;

use crate::Result;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

pub use sync::SyncAdapter;

#[cfg(feature = "io_uring")]
pub use self::io_uring::IoUringAdapter;

/// One submitted IO request, addressed by an opaque `user_data` tag that the
/// adapter returns unchanged in the matching [`Completion`].
pub struct IoRequest {
    pub user_data: u64,
    pub write: bool,
    pub offset: u64,
    pub buf: *mut u8,
    pub len: usize,
}

/// Result of one completed request.
pub struct Completion {
    pub user_data: u64,
    pub result: std::io::Result<usize>,
}

/// Closed set of platform IO backends, dispatched by tag.
pub enum Adapter {
    Sync(SyncAdapter),
    #[cfg(feature = "io_uring")]
    IoUring(Box<IoUringAdapter>),
}

impl Adapter {
    pub fn sync(fd: RawFd) -> Self {
        Adapter::Sync(SyncAdapter::new(fd))
    }

    #[cfg(feature = "io_uring")]
    pub fn io_uring(fd: RawFd, depth: u32) -> Result<Self> {
        Ok(Adapter::IoUring(Box::new(IoUringAdapter::new(fd, depth)?)))
    }

    /// Queue one request. Depending on the backend this may complete inline
    /// (`Sync`) or only be handed to the kernel (`IoUring`, reaped later by
    /// [`Adapter::reap`]).
    pub fn submit(&mut self, req: IoRequest) -> Result<()> {
        match self {
            Adapter::Sync(a) => a.submit(req),
            #[cfg(feature = "io_uring")]
            Adapter::IoUring(a) => a.submit(req),
        }
    }

    /// Collect completions, blocking for at least `min` if none are ready yet.
    pub fn reap(&mut self, min: usize) -> Result<Vec<Completion>> {
        match self {
            Adapter::Sync(a) => a.reap(min),
            #[cfg(feature = "io_uring")]
            Adapter::IoUring(a) => a.reap(min),
        }
    }
}

/// Open `path` O_DIRECT, sizing it per the original tool's rules: reuse a
/// large existing file as-is, otherwise grow to a 128MiB-rounded fraction of
/// free disk space; block devices are used at their native size untouched.
pub fn open_target(path: &Path, requested_len: u64, freespace_fraction: f64) -> Result<(std::fs::File, u64, bool)> {
    use anyhow::Context;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("opening target file {}", path.display()))?;

    let metadata = file.metadata().with_context(|| format!("stat {}", path.display()))?;
    let current_length = metadata.len();
    let is_block_device = {
        use std::os::unix::fs::FileTypeExt;
        metadata.file_type().is_block_device()
    };

    let (length, truncated) = if is_block_device {
        (current_length, false)
    } else {
        let free_bytes = statvfs_free_bytes(path)?;
        let mut length = requested_len;
        if length > free_bytes + current_length {
            length = ((free_bytes + current_length) as f64 * freespace_fraction) as u64;
            length -= length % page_size();
        }
        if current_length > 128 * 1024 * 1024 {
            length = current_length;
        }
        if length == 0 {
            length = (((free_bytes + current_length) as f64) * freespace_fraction) as u64;
            length /= 128 * 1024 * 1024;
            length *= 128 * 1024 * 1024;
        }
        (length, length != current_length)
    };

    if truncated {
        file.set_len(length).with_context(|| format!("truncating {} to {length} bytes", path.display()))?;
        unsafe {
            libc::fallocate(file.as_raw_fd(), 0, 0, length as i64);
        }
    }
    drop(file);

    let direct = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_DIRECT)
        .open(path)
        .with_context(|| format!("reopening {} with O_DIRECT", path.display()))?;

    Ok((direct, length, truncated))
}

fn statvfs_free_bytes(path: &Path) -> Result<u64> {
    use anyhow::Context;
    use std::ffi::CString;
    use std::mem::MaybeUninit;

    let c_path = CString::new(path.as_os_str().as_encoded_bytes())
        .with_context(|| format!("path {} contains a NUL byte", path.display()))?;
    let mut buf = MaybeUninit::<libc::statvfs>::uninit();
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), buf.as_mut_ptr()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error()).with_context(|| format!("statvfs {}", path.display()));
    }
    let stat = unsafe { buf.assume_init() };
    Ok(stat.f_bsize * stat.f_bavail)
}

pub fn page_size() -> u64 {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as u64 }
}
