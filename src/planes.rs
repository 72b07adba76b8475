// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the two planes the viewer moves between: an integral
//! pixel plane, described by sizes, points and rectangles with an
//! origin at 0,0 in the upper left, and the fixed rectangle of the
//! complex plane in which the Mandelbrot set lives.

use num::Complex;

/// Describes the width and height of a region of the integral plane.
/// Signed, because rectangles produced while diffing a move may be
/// empty or mirrored, and Copy/Draw origins may be offset by negative
/// deltas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Size {
    /// Constructor.
    pub fn new(width: i32, height: i32) -> Size {
        Size { width, height }
    }

    /// The number of pixels covered.  Zero for degenerate sizes.
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.width as usize) * (self.height as usize)
        }
    }

    /// A size with no pixels in it.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Describes the x, y of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// Constructor.
    pub fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    /// The same point shifted by a delta.
    pub fn translate(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// An axis-aligned rectangle on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Constructor.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle of the given size anchored at a point.
    pub fn at(origin: Point, size: Size) -> Rect {
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    /// Upper-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// One past the rightmost column.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// A rectangle with no pixels in it.
    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Does the rectangle contain the pixel?
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Does `other` lie entirely within this rectangle?  Empty
    /// rectangles are contained by everything.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// The overlap of two rectangles, or an empty rectangle at the
    /// origin when there is none.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            Rect::default()
        } else {
            Rect::new(x, y, right - x, bottom - y)
        }
    }

    /// Reflect the rectangle horizontally inside a span of `width`
    /// pixels.
    pub fn flip_horizontal(&self, width: i32) -> Rect {
        Rect::new(width - self.width - self.x, self.y, self.width, self.height)
    }

    /// Reflect the rectangle vertically inside a span of `height`
    /// pixels.
    pub fn flip_vertical(&self, height: i32) -> Rect {
        Rect::new(self.x, height - self.height - self.y, self.width, self.height)
    }
}

/// Describes the left-upper corner and right-lower corner of the
/// window onto the complex plane, treating the real part of each value
/// as the x-component and the imaginary part as the y-component.  The
/// imaginary axis grows downward, same as pixel rows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// The part of the complex plane the viewer can ever show.
pub const PLANE: ComplexPlane = ComplexPlane(
    Complex { re: -2.5, im: -1.7 },
    Complex { re: 1.0, im: 1.7 },
);

impl ComplexPlane {
    /// Extent along the real axis.
    pub fn width(&self) -> f64 {
        self.1.re - self.0.re
    }

    /// Extent along the imaginary axis.
    pub fn height(&self) -> f64 {
        self.1.im - self.0.im
    }

    /// Left edge.
    pub fn left(&self) -> f64 {
        self.0.re
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.0.im
    }

    /// The middle of the window.
    pub fn center(&self) -> Complex<f64> {
        Complex::new((self.0.re + self.1.re) / 2.0, (self.0.im + self.1.im) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_window_has_expected_extent() {
        assert_eq!(PLANE.width(), 3.5);
        assert!((PLANE.height() - 3.4).abs() < 1e-12);
        assert_eq!(PLANE.center(), Complex::new(-0.75, 0.0));
    }

    #[test]
    fn flips_mirror_inside_the_span() {
        let r = Rect::new(0, 10, 30, 5);
        assert_eq!(r.flip_horizontal(100), Rect::new(70, 10, 30, 5));
        assert_eq!(r.flip_vertical(40), Rect::new(0, 25, 30, 5));
        assert_eq!(r.flip_horizontal(100).flip_horizontal(100), r);
    }

    #[test]
    fn intersections() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.intersect(&Rect::new(5, 5, 10, 10)), Rect::new(5, 5, 5, 5));
        assert!(a.intersect(&Rect::new(10, 0, 5, 5)).is_empty());
        assert!(a.contains_rect(&Rect::new(2, 2, 8, 8)));
        assert!(!a.contains_rect(&Rect::new(2, 2, 9, 8)));
        assert!(a.contains_rect(&Rect::new(50, 50, 0, 3)));
    }

    #[test]
    fn empty_sizes_have_no_area() {
        assert_eq!(Size::new(0, 5).area(), 0);
        assert_eq!(Size::new(-3, 5).area(), 0);
        assert_eq!(Size::new(3, 5).area(), 15);
        assert!(Rect::new(0, 0, 800, 0).is_empty());
    }
}
