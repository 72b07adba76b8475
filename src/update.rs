// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Updates are the instructions a presentation layer receives after
//! every visible change: paste this freshly computed image here, move
//! these pixels you already have over there, or do several of those in
//! order.  A `Surface` is anything that can carry them out; the
//! `Framebuffer` here is a plain in-memory one.

use crate::errors::ComputeError;
use crate::planes::{Point, Rect, Size};

/// A rectangle of ARGB pixels, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelImage {
    size: Size,
    pixels: Vec<u32>,
}

impl PixelImage {
    /// Wrap a pixel vector holding exactly `size.area()` pixels.
    pub fn new(size: Size, pixels: Vec<u32>) -> Result<PixelImage, ComputeError> {
        if pixels.len() != size.area() {
            return Err(ComputeError::ImageShape {
                len: pixels.len(),
                width: size.width,
                height: size.height,
                needed: size.area(),
            });
        }
        Ok(PixelImage { size, pixels })
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        self.size
    }

    /// The pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// One row of the image.
    pub fn row(&self, y: i32) -> &[u32] {
        let w = self.size.width as usize;
        let start = (y as usize) * w;
        &self.pixels[start..start + w]
    }
}

/// One step of keeping a displayed frame in sync with the viewport.
#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    /// Paste `image` with its upper-left corner at `origin`.
    Draw {
        /// The computed pixels.
        image: PixelImage,
        /// Where they go.
        origin: Point,
    },
    /// Blit the on-screen pixels of `source` onto `destination`.  Both
    /// rectangles have the same size.
    Copy {
        /// Pixels to read, in the frame as it was before the update.
        source: Rect,
        /// Where they land.
        destination: Rect,
    },
    /// Several updates, applied in order.  A copy always comes first so
    /// it reads pixels nothing has overwritten yet.
    Compound(Vec<Update>),
}

impl Update {
    /// A copy of `source` to the same-sized rectangle at `to`.
    pub fn copy(source: Rect, to: Point) -> Update {
        Update::Copy {
            source,
            destination: Rect::at(to, source.size()),
        }
    }

    /// Carry the update out on a surface.
    pub fn apply<S: Surface + ?Sized>(&self, surface: &mut S) {
        match self {
            Update::Draw { image, origin } => surface.draw_image(image, *origin),
            Update::Copy {
                source,
                destination,
            } => surface.copy_area(*source, destination.origin()),
            Update::Compound(updates) => {
                for update in updates {
                    update.apply(surface);
                }
            }
        }
    }

    /// The rectangles of the final frame this update writes, in the
    /// order it writes them.
    pub fn painted(&self) -> Vec<Rect> {
        match self {
            Update::Draw { image, origin } => vec![Rect::at(*origin, image.size())],
            Update::Copy { destination, .. } => vec![*destination],
            Update::Compound(updates) => updates.iter().flat_map(|u| u.painted()).collect(),
        }
    }

    /// Total number of pixels that had to be computed for this update.
    pub fn computed_pixels(&self) -> usize {
        match self {
            Update::Draw { image, .. } => image.size().area(),
            Update::Copy { .. } => 0,
            Update::Compound(updates) => updates.iter().map(|u| u.computed_pixels()).sum(),
        }
    }
}

/// What a presentation layer must be able to do to consume updates.
pub trait Surface {
    /// Paste an image at a point, clipped to the surface.
    fn draw_image(&mut self, image: &PixelImage, origin: Point);

    /// Move the pixels of `source` so its upper-left corner lands on
    /// `destination`, clipped to the surface.  Source and destination
    /// may overlap.
    fn copy_area(&mut self, source: Rect, destination: Point);
}

/// An in-memory ARGB surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    size: Size,
    pixels: Vec<u32>,
}

impl Framebuffer {
    /// A transparent surface.
    pub fn new(size: Size) -> Framebuffer {
        Framebuffer {
            size,
            pixels: vec![0; size.area()],
        }
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Everything on the surface.
    pub fn bounds(&self) -> Rect {
        Rect::at(Point::default(), self.size)
    }

    /// The pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable access to the pixels, row-major.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// A single pixel.
    pub fn pixel(&self, x: i32, y: i32) -> u32 {
        self.pixels[self.offset(x, y)]
    }

    /// Change the size, keeping whatever of the old content still fits.
    pub fn resize(&mut self, size: Size) {
        if size == self.size {
            return;
        }
        let mut resized = Framebuffer::new(size);
        let kept = self.bounds().intersect(&resized.bounds());
        for y in kept.y..kept.bottom() {
            let from = self.offset(0, y);
            let to = resized.offset(0, y);
            let w = kept.width as usize;
            resized.pixels[to..to + w].copy_from_slice(&self.pixels[from..from + w]);
        }
        *self = resized;
    }

    /// Packed 8-bit RGB, alpha dropped, for image encoders.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            rgb.push((p >> 16) as u8);
            rgb.push((p >> 8) as u8);
            rgb.push(*p as u8);
        }
        rgb
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        (y as usize) * (self.size.width as usize) + (x as usize)
    }
}

impl Surface for Framebuffer {
    fn draw_image(&mut self, image: &PixelImage, origin: Point) {
        let target = Rect::at(origin, image.size()).intersect(&self.bounds());
        if target.is_empty() {
            return;
        }
        let w = target.width as usize;
        let sx = (target.x - origin.x) as usize;
        for y in target.y..target.bottom() {
            let row = image.row(y - origin.y);
            let to = self.offset(target.x, y);
            self.pixels[to..to + w].copy_from_slice(&row[sx..sx + w]);
        }
    }

    fn copy_area(&mut self, source: Rect, destination: Point) {
        let dx = destination.x - source.x;
        let dy = destination.y - source.y;
        let bounds = self.bounds();
        let clipped = source.intersect(&bounds);
        let target = Rect::new(clipped.x + dx, clipped.y + dy, clipped.width, clipped.height)
            .intersect(&bounds);
        if target.is_empty() {
            return;
        }
        let w = target.width as usize;
        let rows: Vec<i32> = if dy > 0 {
            // Moving down: start at the bottom so unread rows survive.
            (target.y..target.bottom()).rev().collect()
        } else {
            (target.y..target.bottom()).collect()
        };
        for y in rows {
            let from = self.offset(target.x - dx, y - dy);
            let to = self.offset(target.x, y);
            self.pixels.copy_within(from..from + w, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    // A framebuffer in which every pixel holds its own coordinates.
    fn tagged(w: i32, h: i32) -> Framebuffer {
        let mut fb = Framebuffer::new(Size::new(w, h));
        for (y, x) in iproduct!(0..h, 0..w) {
            let o = fb.offset(x, y);
            fb.pixels_mut()[o] = (y * 1000 + x) as u32;
        }
        fb
    }

    fn tag(x: i32, y: i32) -> u32 {
        (y * 1000 + x) as u32
    }

    #[test]
    fn draw_pastes_and_clips() {
        let mut fb = Framebuffer::new(Size::new(4, 3));
        let image = PixelImage::new(Size::new(2, 2), vec![1, 2, 3, 4]).unwrap();
        fb.draw_image(&image, Point::new(3, 2));
        assert_eq!(fb.pixel(3, 2), 1);
        assert_eq!(fb.pixels().iter().filter(|p| **p != 0).count(), 1);

        fb.draw_image(&image, Point::new(-1, -1));
        assert_eq!(fb.pixel(0, 0), 4);
    }

    #[test]
    fn overlapping_copies_read_before_they_write() {
        for &(dx, dy) in &[(2, 1), (-2, -1), (2, -1), (-2, 1), (0, 2), (3, 0)] {
            let mut fb = tagged(6, 5);
            let source = Rect::new(0, 0, 6, 5).intersect(&Rect::new(-dx, -dy, 6, 5));
            let update = Update::copy(source, source.origin().translate(dx, dy));
            update.apply(&mut fb);
            for (y, x) in iproduct!(0..5, 0..6) {
                if source.contains(Point::new(x - dx, y - dy)) {
                    assert_eq!(fb.pixel(x, y), tag(x - dx, y - dy), "({}, {}) {:?}", x, y, (dx, dy));
                } else {
                    assert_eq!(fb.pixel(x, y), tag(x, y));
                }
            }
        }
    }

    #[test]
    fn compound_applies_in_order() {
        let mut fb = tagged(3, 1);
        let update = Update::Compound(vec![
            Update::copy(Rect::new(0, 0, 2, 1), Point::new(1, 0)),
            Update::Draw {
                image: PixelImage::new(Size::new(1, 1), vec![77]).unwrap(),
                origin: Point::new(0, 0),
            },
        ]);
        update.apply(&mut fb);
        assert_eq!(fb.pixels(), &[77, tag(0, 0), tag(1, 0)]);
        assert_eq!(
            update.painted(),
            vec![Rect::new(1, 0, 2, 1), Rect::new(0, 0, 1, 1)]
        );
        assert_eq!(update.computed_pixels(), 1);
    }

    #[test]
    fn images_must_match_their_size() {
        assert_eq!(
            PixelImage::new(Size::new(2, 3), vec![0; 5]),
            Err(ComputeError::ImageShape {
                len: 5,
                width: 2,
                height: 3,
                needed: 6
            })
        );
        assert!(PixelImage::new(Size::new(2, 3), vec![0; 7]).is_err());
        let image = PixelImage::new(Size::new(2, 3), vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(image.row(2), &[4, 5]);
    }

    #[test]
    fn resize_keeps_the_overlap() {
        let mut fb = tagged(4, 4);
        fb.resize(Size::new(2, 6));
        assert_eq!(fb.size(), Size::new(2, 6));
        assert_eq!(fb.pixel(1, 3), tag(1, 3));
        assert_eq!(fb.pixel(1, 5), 0);
    }

    #[test]
    fn rgb_drops_alpha() {
        let mut fb = Framebuffer::new(Size::new(1, 1));
        fb.pixels_mut()[0] = 0xFF12_3456;
        assert_eq!(fb.to_rgb(), vec![0x12, 0x34, 0x56]);
    }
}
