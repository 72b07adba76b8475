// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel shared by every CPU backend.

/// Iteration budget.  A point still bounded after this many steps is
/// taken to be inside the set.
pub const MAX_ITERATIONS: i32 = 255;

/// Squared bailout radius.
pub const BAILOUT: f64 = 4.0;

/// This is our classic iterator function.  It returns the iteration
/// (1..=255) at which the orbit of the seed leaves the circle of
/// radius 2, or 0 if it never does.  The magnitude tested is the one
/// from *before* the step, so a seed already on the circle, like 2+0i,
/// escapes at 1.
///
/// Written out on the real and imaginary parts rather than through
/// `Complex` so the order of floating point operations is fixed and
/// every backend agrees bit for bit.
#[inline]
pub fn escape_time(a_seed: f64, b_seed: f64) -> i32 {
    let (mut a, mut b) = (a_seed, b_seed);
    let mut i = 1;
    while i <= MAX_ITERATIONS {
        let a_sqr = a * a;
        let b_sqr = b * b;
        b = 2.0 * a * b + b_seed;
        a = a_sqr - b_sqr + a_seed;
        if a_sqr + b_sqr >= BAILOUT {
            return i;
        }
        i += 1;
    }
    0
}

/// Fill `band` with rows `y0..y1` of a `width`-wide rectangle whose
/// pixel (x, y) sits at `re_offset + x * resolution`,
/// `im_offset + y * resolution`.  `band[0]` is pixel (0, y0).
///
/// Plane coordinates are computed from the absolute row and column,
/// never accumulated, so a band produces the same values whether it is
/// rendered alone or as part of the whole rectangle.
pub fn render_rows(
    band: &mut [i32],
    width: usize,
    y0: usize,
    y1: usize,
    re_offset: f64,
    im_offset: f64,
    resolution: f64,
) {
    if width == 0 {
        return;
    }
    for (row, pixels) in band.chunks_mut(width).take(y1 - y0).enumerate() {
        let b = im_offset + ((y0 + row) as f64) * resolution;
        for (x, pixel) in pixels.iter_mut().enumerate() {
            *pixel = escape_time(re_offset + (x as f64) * resolution, b);
        }
    }
}
