//! Owned RGB framebuffer the chart is rasterized into.
//!
//! The slideshow host takes a plain pixel image, so the buffer is a flat
//! `Vec<u8>` of packed 24-bit RGB rows. Implementing
//! [`embedded_graphics::draw_target::DrawTarget`] lets the chart code use
//! the embedded-graphics line, text, and style primitives directly.

use embedded_graphics::{pixelcolor::Rgb888, prelude::*, Pixel};

/// Fixed-size RGB pixel image.
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Allocate a frame filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgb888) -> Self {
        let mut frame = Frame {
            width,
            height,
            pixels: vec![0; (width * height * 3) as usize],
        };
        frame.fill(background);
        frame
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGB rows, top to bottom.
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    pub fn fill(&mut self, color: Rgb888) {
        for pixel in self.pixels.chunks_exact_mut(3) {
            pixel[0] = color.r();
            pixel[1] = color.g();
            pixel[2] = color.b();
        }
    }

    /// Set one pixel. Out-of-bounds coordinates are ignored so drawing code
    /// can run right up to the edges without its own clipping.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb888) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = ((y * self.width + x) * 3) as usize;
        self.pixels[index] = color.r();
        self.pixels[index + 1] = color.g();
        self.pixels[index + 2] = color.b();
    }

    /// Read one pixel back; `None` when out of bounds. Used by tests to
    /// check what actually got drawn.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = ((y * self.width + x) * 3) as usize;
        Some(Rgb888::new(
            self.pixels[index],
            self.pixels[index + 1],
            self.pixels[index + 2],
        ))
    }
}

impl DrawTarget for Frame {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
