//! Linux io_uring platform adapter
//!
//! Modern replacement for the original tool's libaio backend: requests are
//! pushed to the submission queue and reaped later from the completion
//! queue, giving real queue depth instead of the sync adapter's inline
//! blocking.

use super::{Completion, IoRequest};
use crate::Result;
use anyhow::Context;
use io_uring::{opcode, types, IoUring};
use std::os::unix::io::RawFd;

pub struct IoUringAdapter {
    ring: IoUring,
    fd: RawFd,
    pending: usize,
}

impl IoUringAdapter {
    pub fn new(fd: RawFd, depth: u32) -> Result<Self> {
        let ring = IoUring::new(depth).context("creating io_uring instance")?;
        Ok(IoUringAdapter { ring, fd, pending: 0 })
    }

    pub fn submit(&mut self, req: IoRequest) -> Result<()> {
        let entry = if req.write {
            opcode::Write::new(types::Fd(self.fd), req.buf as *const u8, req.len as u32)
                .offset(req.offset)
                .build()
                .user_data(req.user_data)
        } else {
            opcode::Read::new(types::Fd(self.fd), req.buf, req.len as u32)
                .offset(req.offset)
                .build()
                .user_data(req.user_data)
        };

        // SAFETY: `req.buf` stays valid until the matching completion is
        // reaped - the caller (worker loop) does not reuse a slot's buffer
        // until its request completes.
        unsafe {
            self.ring.submission().push(&entry).map_err(|_| anyhow::anyhow!("io_uring submission queue full"))?;
        }
        self.pending += 1;
        Ok(())
    }

    fn drain_ready(&mut self, completions: &mut Vec<Completion>) {
        for cqe in self.ring.completion() {
            let result_code = cqe.result();
            let result =
                if result_code >= 0 { Ok(result_code as usize) } else { Err(std::io::Error::from_raw_os_error(-result_code)) };
            completions.push(Completion { user_data: cqe.user_data(), result });
        }
    }

    /// `min == 0` peeks without blocking (submits queued entries, takes
    /// whatever is already in the completion queue); `min > 0` blocks until
    /// at least that many completions are available.
    pub fn reap(&mut self, min: usize) -> Result<Vec<Completion>> {
        if self.pending == 0 {
            return Ok(Vec::new());
        }

        let mut completions = Vec::new();
        if min == 0 {
            self.ring.submit().context("io_uring submit")?;
            self.drain_ready(&mut completions);
        } else {
            while completions.len() < min {
                self.ring.submit_and_wait(1).context("io_uring submit_and_wait")?;
                self.drain_ready(&mut completions);
            }
        }
        self.pending -= completions.len();
        Ok(completions)
    }
}
