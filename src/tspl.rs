//! TSPL command script generation.
//!
//! A label script is a sequence of CRLF-terminated lines in a single-byte
//! encoding: printer setup directives, `CLS`, one `BITMAP` line carrying the
//! raw bitmap bytes, and `PRINT`.
//!
//! ```text
//! SIZE 100mm,1200mm
//! GAP 0.120,0.000
//! ...
//! CLS
//! BITMAP 396,596,1,8,0,<8 raw bytes>
//! PRINT 1,1
//! ```
//!
//! The second `SIZE` field carries the label height in dots even though it
//! is suffixed `mm`. Printers accept this as-is, so it is kept.

use log::debug;

use crate::{
    bitmap::{Bitmap, Polarity},
    error::Error,
    target::PrintTarget,
};

const CRLF: &[u8] = b"\r\n";

/// Printer setup written ahead of the bitmap.
///
/// The defaults reproduce the stock script; only a few knobs are exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintSettings {
    speed: u8,
    density: u8,
    copies: u32,
}

impl Default for PrintSettings {
    fn default() -> Self {
        PrintSettings {
            speed: 5,
            density: 8,
            copies: 1,
        }
    }
}

impl PrintSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print speed in inches per second (`SPEED n`).
    pub fn speed(self, speed: u8) -> Self {
        PrintSettings { speed, ..self }
    }

    /// Print darkness, 0..=15 (`DENSITY n`).
    pub fn density(self, density: u8) -> Self {
        PrintSettings { density, ..self }
    }

    /// Copies of the label to print (`PRINT 1,n`).
    pub fn copies(self, copies: u32) -> Self {
        PrintSettings { copies, ..self }
    }

    /// Reject out-of-range directive values.
    pub fn validate(&self) -> Result<(), Error> {
        if self.density > 15 {
            return Err(Error::InvalidConfig(format!(
                "density must be 0..=15, got {}",
                self.density
            )));
        }
        if self.speed == 0 {
            return Err(Error::InvalidConfig("speed must be positive".to_string()));
        }
        if self.copies == 0 {
            return Err(Error::InvalidConfig("copies must be positive".to_string()));
        }
        Ok(())
    }

    fn setup_lines(&self, target: &PrintTarget) -> Vec<String> {
        vec![
            // width in mm, length in dots
            format!("SIZE {:.0}mm,{}mm", target.width_mm(), target.height_px()),
            "GAP 0.120,0.000".to_string(),
            format!("SPEED {}", self.speed),
            format!("DENSITY {}", self.density),
            "DIRECTION 0,0".to_string(),
            "REFERENCE 0,0".to_string(),
            "OFFSET 0.000".to_string(),
            "SHIFT 0".to_string(),
            "SET PEEL OFF".to_string(),
            "SET CUTTER OFF".to_string(),
            "SET PARTIAL_CUTTER OFF".to_string(),
            "SET TEAR ON".to_string(),
            "CLS".to_string(),
        ]
    }
}

/// Where a bitmap lands on the label, centred in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

impl Placement {
    /// Centre `bitmap` in the label's pixel box.
    ///
    /// Truncating division puts any odd leftover pixel on the right/bottom.
    /// Fails only when an offset would be negative.
    pub fn center(bitmap: &Bitmap, target: &PrintTarget) -> Result<Self, Error> {
        let x = (target.width_px() - bitmap.width() as i64) / 2;
        let y = (target.height_px() - bitmap.height() as i64) / 2;
        // truncation makes a one pixel overshoot land at 0
        if x < 0 || y < 0 {
            return Err(Error::FitConsistency(format!(
                "{}x{} bitmap cannot be centred on a {}x{} label",
                bitmap.width(),
                bitmap.height(),
                target.width_px(),
                target.height_px()
            )));
        }
        Ok(Placement {
            x: x as u32,
            y: y as u32,
        })
    }
}

/// A finished command script, ready to be written to the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelScript {
    bytes: Vec<u8>,
}

impl LabelScript {
    /// Assemble the script for `bitmap` on a `target` label.
    ///
    /// `bitmap` is converted to printer polarity if it still has rasterizer
    /// polarity. Fails if the bitmap is larger than the label.
    pub fn build(bitmap: Bitmap, target: &PrintTarget, settings: &PrintSettings) -> Result<Self, Error> {
        target.validate()?;
        settings.validate()?;

        let bitmap = bitmap.into_printer_polarity();
        debug_assert_eq!(bitmap.polarity(), Polarity::OneIsBlack);
        let placement = Placement::center(&bitmap, target)?;

        let mut buf: Vec<u8> = Vec::new();
        for line in settings.setup_lines(target) {
            push_line(&mut buf, line.as_bytes());
        }

        let header = format!(
            "BITMAP {},{},{},{},0,",
            placement.x,
            placement.y,
            bitmap.row_bytes(),
            bitmap.height()
        );
        buf.extend_from_slice(header.as_bytes());
        // raw payload, one byte per Latin-1 character, no escaping
        push_line(&mut buf, bitmap.data());

        push_line(&mut buf, format!("PRINT 1,{}", settings.copies).as_bytes());

        debug!(
            "Built script: {} bytes, bitmap {}x{} at {},{}",
            buf.len(),
            bitmap.width(),
            bitmap.height(),
            placement.x,
            placement.y
        );
        Ok(LabelScript { bytes: buf })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn push_line(buf: &mut Vec<u8>, line: &[u8]) {
    buf.extend_from_slice(line);
    buf.extend_from_slice(CRLF);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_100x150() -> PrintTarget {
        PrintTarget::new()
            .label_width_mm(100.0)
            .label_height_mm(150.0)
            .dpi(203.2)
    }

    fn bitmap(width: u32, height: u32, fill: u8) -> Bitmap {
        let len = crate::bitmap::row_bytes(width) * height as usize;
        Bitmap::new(width, height, vec![fill; len], Polarity::ZeroIsBlack).unwrap()
    }

    #[test]
    fn trivial_bitmap_script_is_byte_exact() {
        let script =
            LabelScript::build(bitmap(8, 8, 0x00), &target_100x150(), &PrintSettings::default())
                .unwrap();

        let mut expected = b"SIZE 100mm,1200mm\r\n\
GAP 0.120,0.000\r\n\
SPEED 5\r\n\
DENSITY 8\r\n\
DIRECTION 0,0\r\n\
REFERENCE 0,0\r\n\
OFFSET 0.000\r\n\
SHIFT 0\r\n\
SET PEEL OFF\r\n\
SET CUTTER OFF\r\n\
SET PARTIAL_CUTTER OFF\r\n\
SET TEAR ON\r\n\
CLS\r\n\
BITMAP 396,596,1,8,0,"
            .to_vec();
        expected.extend_from_slice(&[0xFF; 8]);
        expected.extend_from_slice(b"\r\nPRINT 1,1\r\n");

        assert_eq!(script.as_bytes(), expected.as_slice());
    }

    #[test]
    fn payload_is_raw_even_with_line_break_bytes() {
        // complement of 0xF2/0xF5 is CR/LF
        let raw = Bitmap::new(16, 1, vec![0xF2, 0xF5], Polarity::ZeroIsBlack).unwrap();
        let script = LabelScript::build(raw, &target_100x150(), &PrintSettings::default()).unwrap();

        let bytes = script.as_bytes();
        let header = b"BITMAP 392,599,2,1,0,";
        let start = bytes
            .windows(header.len())
            .position(|w| w == header)
            .unwrap()
            + header.len();
        assert_eq!(&bytes[start..start + 2], b"\r\n");
        assert_eq!(&bytes[start + 2..], b"\r\nPRINT 1,1\r\n");
    }

    #[test]
    fn packed_bitmap_is_not_inverted_again() {
        let packed = bitmap(8, 1, 0x0F).pack();
        let script = LabelScript::build(packed, &target_100x150(), &PrintSettings::default()).unwrap();
        let bytes = script.as_bytes();
        let tail = b"\xF0\r\nPRINT 1,1\r\n";
        assert!(bytes.ends_with(tail));
    }

    #[test]
    fn size_line_uses_whole_millimetres() {
        let target = PrintTarget::new().label_width_mm(51.0).label_height_mm(25.4);
        let script = LabelScript::build(bitmap(8, 8, 0), &target, &PrintSettings::default()).unwrap();
        assert!(script.as_bytes().starts_with(b"SIZE 51mm,203mm\r\n"));

        let target = PrintTarget::new().label_width_mm(50.8);
        let err = LabelScript::build(bitmap(8, 8, 0), &target, &PrintSettings::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn settings_override_directives() {
        let settings = PrintSettings::new().speed(3).density(12).copies(4);
        let script = LabelScript::build(bitmap(8, 8, 0), &target_100x150(), &settings).unwrap();
        let text = String::from_utf8_lossy(script.as_bytes()).into_owned();
        assert!(text.contains("\r\nSPEED 3\r\n"));
        assert!(text.contains("\r\nDENSITY 12\r\n"));
        assert!(text.ends_with("\r\nPRINT 1,4\r\n"));
    }

    #[test]
    fn rejects_invalid_settings() {
        for settings in [
            PrintSettings::new().density(16),
            PrintSettings::new().speed(0),
            PrintSettings::new().copies(0),
        ]
        .iter()
        {
            let err = LabelScript::build(bitmap(8, 8, 0), &target_100x150(), settings).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)));
        }
    }

    #[test]
    fn centering_is_symmetric() {
        let target = target_100x150();
        for width in [1u32, 7, 8, 399, 799, 800].iter() {
            let placement = Placement::center(&bitmap(*width, 3, 0), &target).unwrap();
            let right = target.width_px() - *width as i64 - placement.x as i64;
            assert!((right - placement.x as i64).abs() <= 1);
        }
    }

    #[test]
    fn one_pixel_overshoot_is_placed_at_the_edge() {
        let target = target_100x150();
        let placement = Placement::center(&bitmap(801, 10, 0), &target).unwrap();
        assert_eq!(placement, Placement { x: 0, y: 595 });

        let raw = Bitmap::new(801, 8, vec![0; 101 * 8], Polarity::OneIsBlack).unwrap();
        let script = LabelScript::build(raw, &target, &PrintSettings::default()).unwrap();
        let bytes = script.as_bytes();
        assert!(bytes
            .windows(b"BITMAP 0,596,101,8,0,".len())
            .any(|w| w == b"BITMAP 0,596,101,8,0,"));
    }

    #[test]
    fn oversized_bitmap_is_rejected() {
        let target = target_100x150();
        let err = Placement::center(&bitmap(802, 10, 0), &target).unwrap_err();
        assert!(matches!(err, Error::FitConsistency(_)));

        let err =
            LabelScript::build(bitmap(8, 1202, 0), &target, &PrintSettings::default()).unwrap_err();
        assert!(matches!(err, Error::FitConsistency(_)));
    }
}
