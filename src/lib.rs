#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot explorer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which iterating `z = z² + c` from zero never runs off to
//! infinity.  Points outside it escape, some quickly and some slowly,
//! and the number of iterations it takes is what gets colored.
//!
//! This crate keeps a view onto that plane which can be panned and
//! zoomed.  The expensive part is the per-pixel iteration, so when the
//! view is panned the pixels already computed are moved rather than
//! recomputed, and only the strips that scrolled into view are handed
//! to a compute backend.  Backends are interchangeable: a sequential
//! loop, a pool of worker threads splitting the rows into bands, or an
//! accelerator supplied from outside.

#[macro_use]
extern crate log;

extern crate crossbeam;
extern crate failure;
extern crate num;
extern crate num_cpus;

pub mod backend;
pub mod color;
pub mod command;
pub mod damage;
pub mod errors;
pub mod explorer;
pub mod kernel;
pub mod planes;
pub mod tiled;
pub mod update;
pub mod viewport;

pub use backend::{Backend, BackendFactory, BackendKind, ComputeBackend};
pub use command::Command;
pub use damage::DamageEngine;
pub use errors::{CommandError, ComputeError, DisposeError};
pub use explorer::{Explorer, Settings};
pub use planes::{Point, Rect, Size};
pub use update::{Framebuffer, PixelImage, Surface, Update};
pub use viewport::{Viewport, ViewportEvent, ViewportModel};
