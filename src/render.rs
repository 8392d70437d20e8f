use std::convert::Infallible;

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_7X13, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};

use crate::pages::Page;

pub const DEFAULT_WIDTH: u32 = 360;
pub const DEFAULT_HEIGHT: u32 = 240;

const MARGIN_X: i32 = 10;
const TITLE_Y: i32 = 5;
const RULE_Y: i32 = 35;
const BODY_TOP: i32 = 45;

/// Monochrome frame, 1 bit per pixel, MSB first, row-major. Set bit = white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// All-white frame.
    pub fn new(width: u32, height: u32) -> Self {
        let row_bytes = width.div_ceil(8) as usize;
        Self {
            width,
            height,
            data: vec![0xFF; row_bytes * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed frame buffer in the layout e-paper controllers expect.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn row_bytes(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    fn index(&self, x: u32, y: u32) -> (usize, u8) {
        let byte = y as usize * self.row_bytes() + (x / 8) as usize;
        (byte, 0x80 >> (x % 8))
    }

    /// `true` when the pixel is inked (black).
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (byte, mask) = self.index(x, y);
        self.data[byte] & mask == 0
    }

    pub fn set_black(&mut self, x: u32, y: u32, black: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (byte, mask) = self.index(x, y);
        if black {
            self.data[byte] &= !mask;
        } else {
            self.data[byte] |= mask;
        }
    }

    pub fn black_pixels(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_black(x, y))
            .count()
    }

    /// Binary PBM (P4). PBM uses 1 for black, so the bits are inverted.
    pub fn to_pbm(&self) -> Vec<u8> {
        let mut out = format!("P4\n{} {}\n", self.width, self.height).into_bytes();
        out.extend(self.data.iter().map(|b| !b));
        out
    }
}

impl OriginDimensions for Bitmap {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Bitmap {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_black(point.x as u32, point.y as u32, color.is_on());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Body font and line pitch. Falls back to the small font when the page is long.
fn body_layout(line_count: usize, height: u32) -> (&'static MonoFont<'static>, i32) {
    let available = (height as i32 - BODY_TOP).max(0);
    let regular_pitch = 18;
    if line_count as i32 * regular_pitch <= available {
        return (&FONT_7X13, regular_pitch);
    }
    let compact_pitch = (available / line_count.max(1) as i32).clamp(10, 13);
    (&FONT_6X10, compact_pitch)
}

pub fn render_page(page: &Page, opts: &RenderOptions) -> Bitmap {
    let mut bitmap = Bitmap::new(opts.width, opts.height);
    let ink = BinaryColor::On;

    let title_style = MonoTextStyle::new(&FONT_10X20, ink);
    let title_at = Point::new(MARGIN_X, TITLE_Y);
    let _ =
        Text::with_baseline(&page.title, title_at, title_style, Baseline::Top).draw(&mut bitmap);
    let _ = Line::new(
        Point::new(MARGIN_X, RULE_Y),
        Point::new(opts.width as i32 - MARGIN_X, RULE_Y),
    )
    .into_styled(PrimitiveStyle::with_stroke(ink, 1))
    .draw(&mut bitmap);

    let (font, pitch) = body_layout(page.lines.len(), opts.height);
    let body_style = MonoTextStyle::new(font, ink);
    let mut y = BODY_TOP;
    for line in &page.lines {
        if !line.is_empty() {
            let _ = Text::with_baseline(line, Point::new(MARGIN_X, y), body_style, Baseline::Top)
                .draw(&mut bitmap);
        }
        y += pitch;
    }
    bitmap
}

pub fn render_pages(pages: &[Page], opts: &RenderOptions) -> Vec<Bitmap> {
    pages.iter().map(|p| render_page(p, opts)).collect()
}
