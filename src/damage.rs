// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The DamageEngine listens to the viewport and works out what the
//! displayed frame needs so it matches again.
//!
//! A zoom, reset, refresh or resize invalidates everything, so the
//! answer is one `Draw` of the whole view.  A pan is cheaper: most of
//! the old frame is still good, just in the wrong place.  For a move
//! by (dx, dy) the engine emits a `Copy` of the surviving overlap to its
//! new position, followed by `Draw`s of the one or two strips the move
//! exposed.  Only those strips go to the compute backend.
//!
//! The strips are laid out as if the move were down and to the right,
//! where the overlap sits in the upper left of the old frame:
//!
//! ```text
//!   +-----------------------+
//!   |        hBlock         |  h = |dy| rows
//!   +------+----------------+
//!   |      |                |
//!   |vBlock|     copy       |
//!   |      |  destination   |
//!   +------+----------------+
//!    w = |dx|
//! ```
//!
//! and are then mirrored horizontally for dx < 0 and vertically for
//! dy < 0.

use std::time::Instant;

use crate::backend::{Backend, BackendKind, ComputeBackend};
use crate::color::ColorMapper;
use crate::errors::ComputeError;
use crate::planes::{Point, Rect, Size};
use crate::update::{PixelImage, Update};
use crate::viewport::{Viewport, ViewportEvent};

/// Receives every update the engine emits, with the milliseconds it
/// took to compute.
pub type UpdateListener = Box<dyn FnMut(&Update, u64)>;

/// Turns viewport events into updates.
pub struct DamageEngine {
    backend: Backend,
    colors: ColorMapper,
    scratch: Vec<i32>,
    incremental: bool,
    stale: bool,
    listeners: Vec<UpdateListener>,
}

impl DamageEngine {
    /// An engine computing through `backend`, with a scratch buffer
    /// sized for rectangles up to `max_size`.  Incremental moves are on.
    pub fn new(backend: Backend, max_size: Size) -> DamageEngine {
        DamageEngine {
            backend,
            colors: ColorMapper,
            scratch: vec![0; max_size.area()],
            incremental: true,
            stale: false,
            listeners: Vec::new(),
        }
    }

    /// Swap in another backend and hand back the old one, which the
    /// caller should dispose.  No compute can be in flight here, since
    /// the engine only computes inside its own calls.
    pub fn set_backend(&mut self, backend: Backend) -> Backend {
        std::mem::replace(&mut self.backend, backend)
    }

    /// The backend in use.
    pub fn backend_mut(&mut self) -> &mut Backend {
        &mut self.backend
    }

    /// What kind of backend is in use.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Are moves answered with copies and strips?
    pub fn is_incremental(&self) -> bool {
        self.incremental
    }

    /// Turn incremental moves on or off.  Off, every move redraws the
    /// whole view.
    pub fn set_incremental(&mut self, incremental: bool) {
        self.incremental = incremental;
    }

    /// Register for updates.
    pub fn subscribe(&mut self, listener: UpdateListener) {
        self.listeners.push(listener);
    }

    /// Work out the update for an event without telling anyone.
    pub fn handle(
        &mut self,
        event: &ViewportEvent,
        viewport: &Viewport,
    ) -> Result<Update, ComputeError> {
        match *event {
            ViewportEvent::Moved { dx, dy } if self.incremental => {
                if self.stale {
                    warn!("previous frame was lost, redrawing instead of moving");
                    self.change_update(viewport)
                } else {
                    self.move_update(dx, dy, viewport)
                }
            }
            _ => self.change_update(viewport),
        }
    }

    /// The viewport listener: compute, time, and publish the update.
    /// A failed compute publishes nothing and makes the next event, of
    /// whatever kind, redraw the whole view.
    pub fn on_event(&mut self, event: &ViewportEvent, viewport: &Viewport) {
        let before = Instant::now();
        match self.handle(event, viewport) {
            Ok(update) => {
                let elapsed = before.elapsed().as_millis() as u64;
                self.stale = false;
                debug!(
                    "{:?}: {} regions, {} pixels computed in {} ms",
                    event,
                    update.painted().len(),
                    update.computed_pixels(),
                    elapsed
                );
                for listener in &mut self.listeners {
                    listener(&update, elapsed);
                }
            }
            Err(e) => {
                error!("{:?} dropped: {}", event, e);
                self.stale = true;
            }
        }
    }

    /// A `Draw` of the whole view.
    pub fn change_update(&mut self, viewport: &Viewport) -> Result<Update, ComputeError> {
        self.draw(Rect::at(Point::default(), viewport.view_size()), viewport)
    }

    /// The update for a move by (dx, dy), which the viewport has already
    /// applied.  Falls back to a full redraw when nothing overlaps.
    pub fn move_update(
        &mut self,
        dx: i32,
        dy: i32,
        viewport: &Viewport,
    ) -> Result<Update, ComputeError> {
        let Size { width, height } = viewport.view_size();
        let (w, h) = match (dx.checked_abs(), dy.checked_abs()) {
            (Some(w), Some(h)) if w < width && h < height => (w, h),
            _ => return self.change_update(viewport),
        };

        let mut source = Rect::new(0, 0, width - w, height - h);
        let mut h_block = Rect::new(0, 0, width, h);
        let mut v_block = Rect::new(0, h, w, height - h);

        if dx < 0 {
            source = source.flip_horizontal(width);
            v_block = v_block.flip_horizontal(width);
        }
        if dy < 0 {
            source = source.flip_vertical(height);
            h_block = h_block.flip_vertical(height);
            v_block = v_block.flip_vertical(height);
        }

        let mut updates = vec![Update::copy(source, source.origin().translate(dx, dy))];
        if !h_block.is_empty() {
            updates.push(self.draw(h_block, viewport)?);
        }
        if !v_block.is_empty() {
            updates.push(self.draw(v_block, viewport)?);
        }
        Ok(Update::Compound(updates))
    }

    /// Compute and colour one rectangle of the view.  The plane offsets
    /// come from the rectangle's own corner, so only its pixels are
    /// computed.
    pub fn draw(&mut self, r: Rect, viewport: &Viewport) -> Result<Update, ComputeError> {
        let (width, height) = (r.width.max(0) as usize, r.height.max(0) as usize);
        let needed = width * height;
        if self.scratch.len() < needed {
            debug!("growing scratch buffer to {} values", needed);
            self.scratch.resize(needed, 0);
        }

        let corner = viewport.point_at(r.origin());
        self.backend.compute(
            &mut self.scratch,
            width,
            height,
            corner.re,
            corner.im,
            viewport.resolution(),
        )?;

        let mut pixels = Vec::with_capacity(needed);
        self.colors.colorize(&self.scratch[..needed], &mut pixels);
        Ok(Update::Draw {
            image: PixelImage::new(Size::new(width as i32, height as i32), pixels)?,
            origin: r.origin(),
        })
    }
}
