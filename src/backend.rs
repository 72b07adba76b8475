// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Compute backends turn a pixel rectangle plus the plane coordinates
//! of its upper-left pixel into a row-major buffer of escape values.
//! There are three kinds: a sequential one, a tiled one that spreads
//! row bands over a pool of workers, and an accelerator that lives
//! outside this crate and is plugged in through `BackendFactory`.

use std::fmt;
use std::str::FromStr;

use crate::errors::{CommandError, ComputeError, DisposeError};
use crate::kernel::render_rows;
use crate::planes::Size;
use crate::tiled::TiledBackend;

/// The capability every backend provides.
pub trait ComputeBackend {
    /// Fill `buffer[0..width * height]`, row-major, with escape values
    /// for the rectangle whose pixel (x, y) maps to the plane point
    /// `(re_offset + x * resolution, im_offset + y * resolution)`.
    /// Blocks until the whole rectangle is done.
    fn compute(
        &mut self,
        buffer: &mut [i32],
        width: usize,
        height: usize,
        re_offset: f64,
        im_offset: f64,
        resolution: f64,
    ) -> Result<(), ComputeError>;

    /// Release whatever the backend holds.  Must not be called while a
    /// `compute` is in flight; calling it twice is harmless.
    fn dispose(&mut self) -> Result<(), DisposeError>;

    /// What this backend is, for logs and status lines.
    fn kind(&self) -> BackendKind;
}

/// Check that a buffer can take a `width` x `height` rectangle and
/// return the number of values that will be written.
pub fn check_buffer(buffer: &[i32], width: usize, height: usize) -> Result<usize, ComputeError> {
    let needed = width * height;
    if buffer.len() < needed {
        return Err(ComputeError::BufferTooSmall {
            len: buffer.len(),
            needed,
        });
    }
    Ok(needed)
}

/// One thread, one pass.
#[derive(Debug, Default)]
pub struct SequentialBackend;

impl ComputeBackend for SequentialBackend {
    fn compute(
        &mut self,
        buffer: &mut [i32],
        width: usize,
        height: usize,
        re_offset: f64,
        im_offset: f64,
        resolution: f64,
    ) -> Result<(), ComputeError> {
        let needed = check_buffer(buffer, width, height)?;
        render_rows(
            &mut buffer[..needed],
            width,
            0,
            height,
            re_offset,
            im_offset,
            resolution,
        );
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), DisposeError> {
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
    }
}

/// The selectable backends.  The set is closed: the accelerator is
/// whatever the embedding program registered with the factory.
pub enum Backend {
    /// Single pass on the calling thread.
    Sequential(SequentialBackend),
    /// Row bands over a worker pool.
    Tiled(TiledBackend),
    /// An externally provided device backend.
    Accelerator(Box<dyn ComputeBackend>),
}

impl ComputeBackend for Backend {
    fn compute(
        &mut self,
        buffer: &mut [i32],
        width: usize,
        height: usize,
        re_offset: f64,
        im_offset: f64,
        resolution: f64,
    ) -> Result<(), ComputeError> {
        match self {
            Backend::Sequential(b) => {
                b.compute(buffer, width, height, re_offset, im_offset, resolution)
            }
            Backend::Tiled(b) => b.compute(buffer, width, height, re_offset, im_offset, resolution),
            Backend::Accelerator(b) => {
                b.compute(buffer, width, height, re_offset, im_offset, resolution)
            }
        }
    }

    fn dispose(&mut self) -> Result<(), DisposeError> {
        match self {
            Backend::Sequential(b) => b.dispose(),
            Backend::Tiled(b) => b.dispose(),
            Backend::Accelerator(b) => b.dispose(),
        }
    }

    fn kind(&self) -> BackendKind {
        match self {
            Backend::Sequential(b) => b.kind(),
            Backend::Tiled(b) => b.kind(),
            Backend::Accelerator(_) => BackendKind::Accelerator,
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Backend({})", self.kind())
    }
}

/// Which backend to build.  This is the only configuration the core
/// takes from the outside.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// `SequentialBackend`.
    Sequential,
    /// `TiledBackend` with this many workers.
    Tiled(usize),
    /// The registered accelerator, if any.
    Accelerator,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendKind::Sequential => write!(f, "sequential"),
            BackendKind::Tiled(n) => write!(f, "tiled:{}", n),
            BackendKind::Accelerator => write!(f, "accelerator"),
        }
    }
}

/// Accepts `sequential`, `tiled` (one worker per CPU), `tiled:N` and
/// `accelerator`.
impl FromStr for BackendKind {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "sequential" => Ok(BackendKind::Sequential),
            "tiled" => Ok(BackendKind::Tiled(num_cpus::get())),
            "accelerator" => Ok(BackendKind::Accelerator),
            _ if s.starts_with("tiled:") => match usize::from_str(&s["tiled:".len()..]) {
                Ok(n) if n > 0 => Ok(BackendKind::Tiled(n)),
                _ => Err(CommandError::Malformed(s.clone())),
            },
            _ => Err(CommandError::Unknown(s.clone())),
        }
    }
}

/// Builds an accelerator able to handle rectangles up to the given
/// size, or says why it cannot.
pub type AcceleratorProbe = Box<dyn Fn(Size) -> Result<Box<dyn ComputeBackend>, ComputeError>>;

/// Knows which backends exist on this machine and how to build them.
pub struct BackendFactory {
    max_size: Size,
    accelerator: Option<AcceleratorProbe>,
}

impl BackendFactory {
    /// A factory for rectangles no larger than `max_size`, with only the
    /// CPU backends available.
    pub fn new(max_size: Size) -> BackendFactory {
        BackendFactory {
            max_size,
            accelerator: None,
        }
    }

    /// Register an accelerator found by a startup probe.  Without one,
    /// `BackendKind::Accelerator` is simply not on offer.
    pub fn with_accelerator(mut self, probe: AcceleratorProbe) -> BackendFactory {
        self.accelerator = Some(probe);
        self
    }

    /// What can be selected, cheapest first.
    pub fn available_kinds(&self) -> Vec<BackendKind> {
        let mut kinds = vec![
            BackendKind::Sequential,
            BackendKind::Tiled(num_cpus::get()),
        ];
        if self.accelerator.is_some() {
            kinds.push(BackendKind::Accelerator);
        }
        kinds
    }

    /// Build a backend.
    pub fn create(&self, kind: BackendKind) -> Result<Backend, ComputeError> {
        info!("creating {} backend", kind);
        match kind {
            BackendKind::Sequential => Ok(Backend::Sequential(SequentialBackend)),
            BackendKind::Tiled(threads) => TiledBackend::new(threads).map(Backend::Tiled),
            BackendKind::Accelerator => match self.accelerator {
                Some(ref probe) => probe(self.max_size).map(Backend::Accelerator),
                None => Err(ComputeError::Unavailable),
            },
        }
    }
}
