//! Monochrome bitmaps as produced by the rasterizer and consumed by `BITMAP`.
//!
//! Data is 1 bit per pixel, row-major, MSB-first, with every row padded to a
//! whole byte. What a set bit means depends on [`Polarity`].

use image::{GrayImage, Luma};
use log::debug;

use crate::error::Error;

/// Mapping between a bit value and "ink present".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Bit 0 is an ink pixel. This is what PBM (`P4`) files and `pdftoppm -mono` emit.
    ZeroIsBlack,
    /// Bit 1 is an ink pixel. The convention the `BITMAP` command expects.
    OneIsBlack,
}

impl Polarity {
    fn flipped(self) -> Self {
        match self {
            Self::ZeroIsBlack => Self::OneIsBlack,
            Self::OneIsBlack => Self::ZeroIsBlack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
    polarity: Polarity,
}

/// Number of bytes in one padded row of a bitmap `width` pixels wide.
pub fn row_bytes(width: u32) -> usize {
    (width as usize + 7) / 8
}

/// Byte length of a `width` x `height` bitmap, `None` if it overflows `usize`.
fn data_len(width: u32, height: u32) -> Option<usize> {
    row_bytes(width).checked_mul(height as usize)
}

/// Complement every byte, flipping polarity.
///
/// Complement is its own inverse, so packing twice returns the input.
pub fn pack(data: &[u8]) -> Vec<u8> {
    data.iter().map(|b| !b).collect()
}

impl Bitmap {
    /// Wrap already packed rows.
    ///
    /// `data` must hold exactly `row_bytes(width) * height` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>, polarity: Polarity) -> Result<Self, Error> {
        let expected = data_len(width, height).ok_or_else(|| {
            Error::Rasterization(format!("bitmap {}x{} is too large", width, height))
        })?;
        if data.len() != expected {
            return Err(Error::Rasterization(format!(
                "bitmap {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Bitmap {
            width,
            height,
            data,
            polarity,
        })
    }

    /// Decode a binary PBM (`P4`) image.
    ///
    /// Header tokens may be separated by any whitespace and interleaved with
    /// `#` comments. Bytes past the last row are ignored.
    pub fn from_pbm(buf: &[u8]) -> Result<Self, Error> {
        let mut pos = 0;
        let magic = next_token(buf, &mut pos)
            .ok_or_else(|| Error::Rasterization("empty image output".to_string()))?;
        if magic != b"P4" {
            return Err(Error::Rasterization("unrecognised image format".to_string()));
        }
        let width = parse_dimension(buf, &mut pos, "width")?;
        let height = parse_dimension(buf, &mut pos, "height")?;
        // exactly one whitespace byte separates the header from the raster
        pos += 1;

        let expected = data_len(width, height).ok_or_else(|| {
            Error::Rasterization(format!("image {}x{} is too large", width, height))
        })?;
        let raster = buf.get(pos..).unwrap_or(&[]);
        if raster.len() < expected {
            return Err(Error::Rasterization(format!(
                "truncated bitmap: expected {} bytes, got {}",
                expected,
                raster.len()
            )));
        }
        debug!("Decoded PBM {}x{} ({} bytes)", width, height, expected);

        Bitmap::new(
            width,
            height,
            raster[..expected].to_vec(),
            Polarity::ZeroIsBlack,
        )
    }

    /// Threshold a grayscale image: luma below 128 is ink.
    ///
    /// The result uses rasterizer polarity, like a decoded PBM.
    pub fn from_gray(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        let bpr = row_bytes(w);
        let mut data = vec![0u8; bpr * h as usize];

        for y in 0..h as usize {
            for x in 0..w as usize {
                if img.get_pixel(x as u32, y as u32).0[0] >= 128 {
                    data[y * bpr + x / 8] |= 1 << (7 - (x % 8));
                }
            }
        }
        // pad bits stay 0 in P4 output; match that
        Bitmap {
            width: w,
            height: h,
            data,
            polarity: Polarity::ZeroIsBlack,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn row_bytes(&self) -> usize {
        row_bytes(self.width)
    }

    /// Convert into the opposite polarity by complementing every byte.
    pub fn pack(self) -> Self {
        Bitmap {
            data: pack(&self.data),
            polarity: self.polarity.flipped(),
            ..self
        }
    }

    /// Return the bitmap in `BITMAP` polarity, packing only if needed.
    pub fn into_printer_polarity(self) -> Self {
        match self.polarity {
            Polarity::OneIsBlack => self,
            Polarity::ZeroIsBlack => self.pack(),
        }
    }

    /// Whether the pixel at `(x, y)` is an ink pixel.
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        let idx = y as usize * self.row_bytes() + (x / 8) as usize;
        let bit = self.data[idx] & (1 << (7 - (x % 8))) != 0;
        match self.polarity {
            Polarity::OneIsBlack => bit,
            Polarity::ZeroIsBlack => !bit,
        }
    }

    /// Render onto a white canvas of `canvas_w` x `canvas_h` at `(x, y)`.
    ///
    /// Used for previews; pixels falling outside the canvas are dropped.
    pub fn to_gray_canvas(&self, canvas_w: u32, canvas_h: u32, x: u32, y: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(canvas_w, canvas_h, Luma([255]));
        for py in 0..self.height {
            for px in 0..self.width {
                let (cx, cy) = (x + px, y + py);
                if cx < canvas_w && cy < canvas_h && self.is_black(px, py) {
                    img.put_pixel(cx, cy, Luma([0]));
                }
            }
        }
        img
    }
}

fn next_token<'a>(buf: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    loop {
        while *pos < buf.len() && buf[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < buf.len() && buf[*pos] == b'#' {
            while *pos < buf.len() && buf[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }
    let start = *pos;
    while *pos < buf.len() && !buf[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    if start == *pos {
        None
    } else {
        Some(&buf[start..*pos])
    }
}

fn parse_dimension(buf: &[u8], pos: &mut usize, name: &str) -> Result<u32, Error> {
    let token = next_token(buf, pos)
        .ok_or_else(|| Error::Rasterization(format!("missing image {}", name)))?;
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| Error::Rasterization(format!("invalid image {}", name)))
}
