// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The ViewportModel owns the mapping between the pixel plane and the
//! complex plane.  State is three numbers: the complex coordinate at
//! the middle of the view, the resolution (plane units per pixel), and
//! the size of the view in pixels.  Everything else is derived.
//!
//! At a given resolution the whole `PLANE` window would cover a
//! "full size" canvas of pixels; the view is a rectangle somewhere on
//! that canvas.  Pans are clamped so the view never leaves it, and
//! zooming out stops once the canvas is no wider than the view.
//!
//! Listeners hear about every visible change, synchronously, in the
//! order they registered.

use num::Complex;

use crate::planes::{Point, Rect, Size, PLANE};

/// Zoom step.
pub const SCALE_FACTOR: f64 = 1.2;

/// Keyboard pans move by this fraction of the view width.
pub const SHIFT_FACTOR: f64 = 0.1;

/// The view size before any front-end says otherwise.
pub const DEFAULT_VIEW_SIZE: Size = Size {
    width: 800,
    height: 700,
};

/// What changed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ViewportEvent {
    /// The view moved by this many pixels; already clamped, never (0, 0).
    Moved {
        /// Horizontal shift.  Positive moves the picture right.
        dx: i32,
        /// Vertical shift.  Positive moves the picture down.
        dy: i32,
    },
    /// Anything that invalidates the whole picture.
    Changed,
    /// The view was resized.
    Resized {
        /// Size before.
        old: Size,
        /// Size after.
        new: Size,
    },
}

/// Handle for removing a listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ListenerId(usize);

/// Something that wants to hear about viewport changes.  It gets the
/// event and the viewport as it is after the change.
pub type Listener = Box<dyn FnMut(&ViewportEvent, &Viewport)>;

/// Range and thumb of a scroll bar over the full-size canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScrollBar {
    /// Thumb position.
    pub value: i32,
    /// Thumb length.
    pub extent: i32,
    /// Start of the range.
    pub minimum: i32,
    /// End of the range.
    pub maximum: i32,
    /// Step for the arrows.
    pub unit_increment: i32,
    /// Step for clicks in the track.
    pub block_increment: i32,
}

// Half-up rounding, so -0.5 goes to 0 rather than -1.
fn round(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

// How far `value` sits outside `lower..=upper`.  When the range is
// inverted the upper bound wins.
fn excess(value: i32, lower: i32, upper: i32) -> i32 {
    value - value.max(lower).min(upper)
}

/// The viewport's state and the queries derived from it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    center: Complex<f64>,
    resolution: f64,
    view_size: Size,
}

impl Viewport {
    /// The whole window, fitted to the width of `view_size`.
    pub fn new(view_size: Size) -> Viewport {
        Viewport {
            center: PLANE.center(),
            resolution: PLANE.width() / f64::from(view_size.width),
            view_size,
        }
    }

    /// Plane coordinate at the middle of the view.
    pub fn center(&self) -> Complex<f64> {
        self.center
    }

    /// Plane units per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Size of the view in pixels.
    pub fn view_size(&self) -> Size {
        self.view_size
    }

    /// The coarsest resolution: the plane's width exactly fills the view.
    pub fn max_resolution(&self) -> f64 {
        PLANE.width() / f64::from(self.view_size.width)
    }

    /// The finest resolution: any finer and the full-size canvas would
    /// no longer fit in an `i32`.
    pub fn min_resolution(&self) -> f64 {
        PLANE.width() / f64::from(i32::max_value())
    }

    /// Size of the canvas the whole plane covers at this resolution.
    pub fn full_size(&self) -> Size {
        Size::new(
            round(PLANE.width() / self.resolution),
            round(PLANE.height() / self.resolution),
        )
    }

    /// Upper-left corner of the view on the full-size canvas.
    pub fn view_location(&self) -> Point {
        let x = (self.center.re - PLANE.left()) / self.resolution
            - f64::from(self.view_size.width) / 2.0;
        let y = (self.center.im - PLANE.top()) / self.resolution
            - f64::from(self.view_size.height) / 2.0;
        Point::new(round(x), round(y))
    }

    /// The view as a rectangle on the full-size canvas.
    pub fn view_bounds(&self) -> Rect {
        Rect::at(self.view_location(), self.view_size)
    }

    /// Real coordinate of view column `x`.
    pub fn real_offset(&self, x: i32) -> f64 {
        self.center.re - self.resolution * (f64::from(self.view_size.width) / 2.0 - f64::from(x))
    }

    /// Imaginary coordinate of view row `y`.
    pub fn imag_offset(&self, y: i32) -> f64 {
        self.center.im - self.resolution * (f64::from(self.view_size.height) / 2.0 - f64::from(y))
    }

    // The same viewport with the picture moved by a pixel delta.
    fn shifted(&self, dx: i32, dy: i32) -> Viewport {
        let mut next = *self;
        next.center.re -= self.resolution * f64::from(dx);
        next.center.im -= self.resolution * f64::from(dy);
        next
    }

    /// Plane coordinate of a view pixel.
    pub fn point_at(&self, p: Point) -> Complex<f64> {
        Complex::new(self.real_offset(p.x), self.imag_offset(p.y))
    }

    /// Horizontal scroll bar over the full-size canvas.
    pub fn horizontal_scroll_bar(&self) -> ScrollBar {
        let r = self.view_bounds();
        ScrollBar {
            value: r.x,
            extent: r.width,
            minimum: 0,
            maximum: self.full_size().width,
            unit_increment: r.width / 10,
            block_increment: r.width / 2,
        }
    }

    /// Vertical scroll bar.  Steps are taken from the view width, same
    /// as the horizontal bar.
    pub fn vertical_scroll_bar(&self) -> ScrollBar {
        let r = self.view_bounds();
        ScrollBar {
            value: r.y,
            extent: r.height,
            minimum: 0,
            maximum: self.full_size().height,
            unit_increment: r.width / 10,
            block_increment: r.width / 2,
        }
    }
}

/// The mutable model with its listeners.
pub struct ViewportModel {
    state: Viewport,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: usize,
}

impl Default for ViewportModel {
    fn default() -> Self {
        ViewportModel::new(DEFAULT_VIEW_SIZE)
    }
}

impl ViewportModel {
    /// A model showing the whole window in a view of the given size.
    pub fn new(view_size: Size) -> ViewportModel {
        ViewportModel {
            state: Viewport::new(view_size),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// The current state, for queries.
    pub fn viewport(&self) -> &Viewport {
        &self.state
    }

    /// Register a listener.  Listeners are called in registration order.
    pub fn add_listener(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Unregister a listener.  Returns whether it was there.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(i, _)| *i != id);
        self.listeners.len() != before
    }

    fn fire(&mut self, event: ViewportEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event, &self.state);
        }
    }

    /// Change the size of the view.  The resolution scales with the
    /// width, so the same stretch of plane stays across the view.
    /// The result is clamped to the resolution bounds of the new size
    /// and the view pulled back onto the canvas.
    pub fn set_view_size(&mut self, size: Size) {
        let old = self.state.view_size;
        self.state.view_size = size;
        let scaled = self.state.resolution / (f64::from(size.width) / f64::from(old.width));
        self.state.resolution = scaled
            .max(self.state.min_resolution())
            .min(self.state.max_resolution());
        self.fit();
        debug!("resized {:?} -> {:?}", old, size);
        self.fire(ViewportEvent::Resized { old, new: size });
    }

    /// Pan by a pixel delta.  The delta is clamped so the view stays on
    /// the full-size canvas; returns the delta actually applied.
    /// Listeners hear nothing if that comes to (0, 0).
    pub fn move_by(&mut self, dx: i32, dy: i32) -> (i32, i32) {
        let size = self.state.full_size();
        let r = self.state.view_bounds();

        let mut x_shift = if dx > 0 {
            r.x.min(dx)
        } else {
            (r.right() - size.width).max(dx)
        };
        let mut y_shift = if dy > 0 {
            r.y.min(dy)
        } else {
            (r.bottom() - size.height).max(dy)
        };

        // The location is rounded from the center, so an exact clamp can
        // still land a pixel past the edge.  Pull the shift back until
        // the view is on the canvas.
        for _ in 0..2 {
            let next = self.state.shifted(x_shift, y_shift).view_bounds();
            let x_excess = if size.width >= r.width {
                excess(next.x, 0, size.width - r.width)
            } else {
                0
            };
            let y_excess = if size.height >= r.height {
                excess(next.y, 0, size.height - r.height)
            } else {
                0
            };
            if x_excess == 0 && y_excess == 0 {
                break;
            }
            x_shift += x_excess;
            y_shift += y_excess;
        }

        if x_shift == 0 && y_shift == 0 {
            return (0, 0);
        }

        self.state = self.state.shifted(x_shift, y_shift);
        debug!("moved ({}, {}) asked ({}, {})", x_shift, y_shift, dx, dy);
        self.fire(ViewportEvent::Moved {
            dx: x_shift,
            dy: y_shift,
        });
        (x_shift, y_shift)
    }

    /// Put the view's upper-left corner at (x, y) on the full-size
    /// canvas, as a scroll bar would.  Positions off the canvas end up
    /// at its edge.
    pub fn set_view_location(&mut self, x: i32, y: i32) -> (i32, i32) {
        let location = self.state.view_location();
        self.move_by(location.x.saturating_sub(x), location.y.saturating_sub(y))
    }

    // Nudge the center until the view is back on the canvas.  The
    // location is rounded, so one correction may not be enough.
    fn fit(&mut self) {
        let resolution = self.state.resolution;
        for _ in 0..3 {
            let size = self.state.full_size();
            let r = self.state.view_bounds();
            let x_excess = excess(r.x, 0, size.width - r.width);
            let y_excess = excess(r.y, 0, size.height - r.height);
            if x_excess == 0 && y_excess == 0 {
                break;
            }
            self.state.center.re -= resolution * f64::from(x_excess);
            self.state.center.im -= resolution * f64::from(y_excess);
        }
    }

    fn shift(&self) -> i32 {
        (f64::from(self.state.view_size.width) * SHIFT_FACTOR) as i32
    }

    /// Show more of what is to the left.
    pub fn move_left(&mut self) -> (i32, i32) {
        let shift = self.shift();
        self.move_by(shift, 0)
    }

    /// Show more of what is to the right.
    pub fn move_right(&mut self) -> (i32, i32) {
        let shift = self.shift();
        self.move_by(-shift, 0)
    }

    /// Show more of what is above.
    pub fn move_up(&mut self) -> (i32, i32) {
        let shift = self.shift();
        self.move_by(0, shift)
    }

    /// Show more of what is below.
    pub fn move_down(&mut self) -> (i32, i32) {
        let shift = self.shift();
        self.move_by(0, -shift)
    }

    /// Zoom out one step, never past the point where the plane's width
    /// fits the view.  The center is nudged back so the view stays on
    /// the shrunken canvas.  Returns whether anything changed.
    pub fn zoom_out(&mut self) -> bool {
        let max_resolution = self.state.max_resolution();
        if self.state.resolution >= max_resolution {
            return false;
        }

        self.state.resolution = (self.state.resolution * SCALE_FACTOR).min(max_resolution);
        self.fit();

        debug!("zoomed out to {:e}", self.state.resolution);
        self.fire(ViewportEvent::Changed);
        true
    }

    /// Zoom in one step, never past `Viewport::min_resolution`.
    /// Returns whether anything changed.
    pub fn zoom_in(&mut self) -> bool {
        let min_resolution = self.state.min_resolution();
        if self.state.resolution <= min_resolution {
            return false;
        }

        self.state.resolution = (self.state.resolution / SCALE_FACTOR).max(min_resolution);

        debug!("zoomed in to {:e}", self.state.resolution);
        self.fire(ViewportEvent::Changed);
        true
    }

    /// Back to the whole window at the current view size.
    pub fn reset(&mut self) {
        self.state = Viewport::new(self.state.view_size);
        self.fire(ViewportEvent::Changed);
    }

    /// Ask everyone to redraw without changing anything, as after
    /// switching backends.
    pub fn refresh(&mut self) {
        self.fire(ViewportEvent::Changed);
    }
}
