// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The TiledBackend splits a rectangle into contiguous row bands, one
//! per worker, and hands them to a fixed pool of threads.  A call to
//! `compute` still blocks: it returns only once every band is back.
//!
//! Each band travels to its worker as an owned buffer and comes back in
//! the reply, so workers never touch the caller's memory and no two of
//! them ever share a row.  The band buffers are kept between calls and
//! reused.

use std::any::Any;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::backend::{check_buffer, BackendKind, ComputeBackend};
use crate::errors::{ComputeError, DisposeError};
use crate::kernel::render_rows;

/// Signature of the routine a worker runs over its band; see
/// `kernel::render_rows`.
pub type BandKernel = fn(&mut [i32], usize, usize, usize, f64, f64, f64);

struct Job {
    index: usize,
    band: Vec<i32>,
    width: usize,
    y0: usize,
    y1: usize,
    re_offset: f64,
    im_offset: f64,
    resolution: f64,
}

struct Reply {
    index: usize,
    band: Vec<i32>,
    y0: usize,
    y1: usize,
    result: Result<(), String>,
}

/// A compute backend over a fixed pool of worker threads.
pub struct TiledBackend {
    threads: usize,
    jobs: Option<Sender<Job>>,
    replies: Receiver<Reply>,
    workers: Vec<JoinHandle<()>>,
    bands: Vec<Vec<i32>>,
}

fn describe(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

fn work(kernel: BandKernel, jobs: Receiver<Job>, replies: Sender<Reply>) {
    for job in jobs.iter() {
        let Job {
            index,
            mut band,
            width,
            y0,
            y1,
            re_offset,
            im_offset,
            resolution,
        } = job;
        trace!("rows {}..{} on {:?}", y0, y1, thread::current().name());
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            kernel(&mut band, width, y0, y1, re_offset, im_offset, resolution)
        }))
        .map_err(|payload| describe(&*payload));
        let reply = Reply {
            index,
            band,
            y0,
            y1,
            result,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
}

impl TiledBackend {
    /// Start a pool of `threads` workers running the escape-time
    /// kernel.  Zero is taken to mean one.
    pub fn new(threads: usize) -> Result<TiledBackend, ComputeError> {
        TiledBackend::with_kernel(threads, render_rows)
    }

    /// Start a pool whose workers run `kernel` over their bands.
    pub fn with_kernel(threads: usize, kernel: BandKernel) -> Result<TiledBackend, ComputeError> {
        let threads = threads.max(1);
        let (job_tx, job_rx) = unbounded::<Job>();
        let (reply_tx, reply_rx) = unbounded::<Reply>();

        let mut workers = Vec::with_capacity(threads);
        for i in 0..threads {
            let jobs = job_rx.clone();
            let replies = reply_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("tile-{}", i))
                .spawn(move || work(kernel, jobs, replies))
                .map_err(|e| ComputeError::Spawn(e.to_string()))?;
            workers.push(handle);
        }
        debug!("started {} tile workers", threads);

        Ok(TiledBackend {
            threads,
            jobs: Some(job_tx),
            replies: reply_rx,
            workers,
            bands: vec![Vec::new(); threads],
        })
    }

    /// Number of workers, which is also the number of bands per call.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// The rows each band covers for a rectangle `height` rows tall.
    /// Every band gets `height / threads` rows; the last one also takes
    /// the remainder.
    pub fn band_rows(&self, height: usize) -> Vec<(usize, usize)> {
        let rows = height / self.threads;
        (0..self.threads)
            .map(|i| {
                let y0 = rows * i;
                let y1 = if i < self.threads - 1 { y0 + rows } else { height };
                (y0, y1)
            })
            .collect()
    }
}

impl ComputeBackend for TiledBackend {
    fn compute(
        &mut self,
        buffer: &mut [i32],
        width: usize,
        height: usize,
        re_offset: f64,
        im_offset: f64,
        resolution: f64,
    ) -> Result<(), ComputeError> {
        check_buffer(buffer, width, height)?;
        let jobs = match self.jobs {
            Some(ref jobs) => jobs,
            None => return Err(ComputeError::Disposed),
        };

        for (index, (y0, y1)) in self.band_rows(height).into_iter().enumerate() {
            let mut band = mem::replace(&mut self.bands[index], Vec::new());
            band.resize((y1 - y0) * width, 0);
            jobs.send(Job {
                index,
                band,
                width,
                y0,
                y1,
                re_offset,
                im_offset,
                resolution,
            })
            .map_err(|_| ComputeError::Disconnected)?;
        }

        // Every reply is collected even after a failure, so nothing from
        // this call is left in the channel for the next one.
        let mut failure = None;
        for _ in 0..self.threads {
            let reply = self
                .replies
                .recv()
                .map_err(|_| ComputeError::Disconnected)?;
            match reply.result {
                Ok(()) => {
                    buffer[reply.y0 * width..reply.y1 * width].copy_from_slice(&reply.band);
                }
                Err(reason) => {
                    error!("rows {}..{} failed: {}", reply.y0, reply.y1, reason);
                    if failure.is_none() {
                        failure = Some(ComputeError::BandFailed {
                            y0: reply.y0,
                            y1: reply.y1,
                            reason,
                        });
                    }
                }
            }
            self.bands[reply.index] = reply.band;
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn dispose(&mut self) -> Result<(), DisposeError> {
        match self.jobs.take() {
            // Dropping the sender ends every worker's job loop.
            Some(jobs) => drop(jobs),
            None => return Ok(()),
        }
        let mut result = Ok(());
        for (worker, handle) in self.workers.drain(..).enumerate() {
            if handle.join().is_err() && result.is_ok() {
                result = Err(DisposeError::WorkerPanicked { worker });
            }
        }
        debug!("stopped {} tile workers", self.threads);
        result
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Tiled(self.threads)
    }
}

impl Drop for TiledBackend {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!("tiled backend: {}", e);
        }
    }
}
