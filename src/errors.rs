// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types.  Arithmetic on valid viewports cannot fail; what can
//! fail is the machinery around it: worker bands, thread teardown, and
//! parsing commands from the outside world.

use failure::Fail;

/// Reasons a `ComputeBackend::compute` call produced no result.  None
/// of these leave a partially written buffer the caller should trust.
#[derive(Debug, Fail, PartialEq)]
pub enum ComputeError {
    /// The caller's buffer cannot hold the requested rectangle.
    #[fail(display = "buffer holds {} values, rectangle needs {}", len, needed)]
    BufferTooSmall {
        /// Length of the buffer handed in.
        len: usize,
        /// width * height of the request.
        needed: usize,
    },

    /// A row band faulted while it was being computed.
    #[fail(display = "row band {}..{} failed: {}", y0, y1, reason)]
    BandFailed {
        /// First row of the band.
        y0: usize,
        /// One past the last row of the band.
        y1: usize,
        /// Whatever the worker managed to say about it.
        reason: String,
    },

    /// A computed image does not have as many pixels as its size says.
    #[fail(display = "image holds {} pixels, {}x{} needs {}", len, width, height, needed)]
    ImageShape {
        /// Pixels handed in.
        len: usize,
        /// Width of the image.
        width: i32,
        /// Height of the image.
        height: i32,
        /// width * height.
        needed: usize,
    },

    /// A worker thread could not be started.
    #[fail(display = "could not start worker: {}", _0)]
    Spawn(String),

    /// The worker pool went away while a call was in flight.
    #[fail(display = "worker pool disconnected")]
    Disconnected,

    /// The backend was released before this call.
    #[fail(display = "compute backend has been disposed")]
    Disposed,

    /// An accelerator was requested but none was found at startup.
    #[fail(display = "no accelerator backend is available")]
    Unavailable,
}

/// Failures while releasing a backend's resources.  Callers log these;
/// they never travel back into the viewport pipeline.
#[derive(Debug, Fail, PartialEq)]
pub enum DisposeError {
    /// A worker thread could not be joined cleanly.
    #[fail(display = "worker {} panicked before shutdown", worker)]
    WorkerPanicked {
        /// Index of the worker in its pool.
        worker: usize,
    },
}

/// Errors turning text from a front-end into a `Command`.
#[derive(Debug, Fail, PartialEq)]
pub enum CommandError {
    /// The keyword is not one we know.
    #[fail(display = "unknown command: {}", _0)]
    Unknown(String),

    /// The keyword is fine, its argument is not.
    #[fail(display = "could not parse argument of: {}", _0)]
    Malformed(String),
}
