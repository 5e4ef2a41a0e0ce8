//! Synchronous platform adapter using blocking pread/pwrite
//!
//! Portable fallback that works anywhere libc does. Operations complete
//! inline during `submit`, so `reap` only ever drains what's already buffered
//! - there is no real queue depth beyond 1.

use super::{Completion, IoRequest};
use crate::Result;
use anyhow::Context;
use std::collections::VecDeque;
use std::os::unix::io::RawFd;

pub struct SyncAdapter {
    fd: RawFd,
    completed: VecDeque<Completion>,
}

impl SyncAdapter {
    pub fn new(fd: RawFd) -> Self {
        SyncAdapter { fd, completed: VecDeque::new() }
    }

    #[inline(always)]
    fn do_read(&self, buf: *mut u8, len: usize, offset: u64) -> std::io::Result<usize> {
        let mut total = 0usize;
        while total < len {
            let remaining = len - total;
            let ptr = unsafe { buf.add(total) };
            let result =
                unsafe { libc::pread(self.fd, ptr as *mut libc::c_void, remaining, (offset + total as u64) as i64) };
            if result < 0 {
                return Err(std::io::Error::last_os_error());
            }
            if result == 0 {
                break;
            }
            total += result as usize;
        }
        Ok(total)
    }

    #[inline(always)]
    fn do_write(&self, buf: *const u8, len: usize, offset: u64) -> std::io::Result<usize> {
        let mut total = 0usize;
        while total < len {
            let remaining = len - total;
            let ptr = unsafe { buf.add(total) };
            let result = unsafe {
                libc::pwrite(self.fd, ptr as *const libc::c_void, remaining, (offset + total as u64) as i64)
            };
            if result < 0 {
                return Err(std::io::Error::last_os_error());
            }
            total += result as usize;
        }
        Ok(total)
    }

    pub fn submit(&mut self, req: IoRequest) -> Result<()> {
        let result = if req.write {
            self.do_write(req.buf as *const u8, req.len, req.offset)
        } else {
            self.do_read(req.buf, req.len, req.offset)
        }
        .with_context(|| format!("{} at offset {} failed", if req.write { "write" } else { "read" }, req.offset));

        match result {
            Ok(n) => self.completed.push_back(Completion { user_data: req.user_data, result: Ok(n) }),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    pub fn reap(&mut self, _min: usize) -> Result<Vec<Completion>> {
        Ok(self.completed.drain(..).collect())
    }
}
