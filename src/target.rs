use log::debug;

use crate::{error::Error, DEFAULT_DPI, DEFAULT_LABEL_HEIGHT_MM, DEFAULT_LABEL_WIDTH_MM, MM_PER_INCH};

/// Physical label size and printer resolution.
///
/// The pixel box the bitmap has to fit into is derived from these values,
/// see [`PrintTarget::width_px`] and [`PrintTarget::height_px`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintTarget {
    label_width_mm: f64,
    label_height_mm: f64,
    dpi: f64,
}

impl Default for PrintTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintTarget {
    /// Initialize with the default 102 mm x 76 mm label at 203.2 dpi (8 dots/mm).
    ///
    /// # Example
    ///
    /// ```
    /// use tspl_label::PrintTarget;
    ///
    /// let target = PrintTarget::new()
    ///     .label_width_mm(100.0)
    ///     .label_height_mm(150.0);
    /// assert_eq!(target.width_px(), 800);
    /// assert_eq!(target.height_px(), 1200);
    /// ```
    pub fn new() -> PrintTarget {
        PrintTarget {
            label_width_mm: DEFAULT_LABEL_WIDTH_MM,
            label_height_mm: DEFAULT_LABEL_HEIGHT_MM,
            dpi: DEFAULT_DPI,
        }
    }

    pub fn label_width_mm(self, label_width_mm: f64) -> Self {
        PrintTarget {
            label_width_mm,
            ..self
        }
    }

    pub fn label_height_mm(self, label_height_mm: f64) -> Self {
        PrintTarget {
            label_height_mm,
            ..self
        }
    }

    pub fn dpi(self, dpi: f64) -> Self {
        PrintTarget { dpi, ..self }
    }

    pub fn width_mm(&self) -> f64 {
        self.label_width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.label_height_mm
    }

    pub fn resolution(&self) -> f64 {
        self.dpi
    }

    /// Label width in printer dots, `round(mm / 25.4 * dpi)`.
    pub fn width_px(&self) -> i64 {
        mm_to_px(self.label_width_mm, self.dpi)
    }

    /// Label height in printer dots, `round(mm / 25.4 * dpi)`.
    pub fn height_px(&self) -> i64 {
        mm_to_px(self.label_height_mm, self.dpi)
    }

    /// Label pixel box as `u32` dimensions, once validated.
    pub fn pixel_box(&self) -> Result<(u32, u32), Error> {
        self.validate()?;
        Ok((self.width_px() as u32, self.height_px() as u32))
    }

    /// Reject non-positive or non-finite values, a fractional width and
    /// pixel boxes that are empty or don't fit `u32`.
    ///
    /// The width goes into the `SIZE` directive, which takes whole millimetres.
    pub fn validate(&self) -> Result<(), Error> {
        let fields = [
            ("label width", self.label_width_mm),
            ("label height", self.label_height_mm),
            ("dpi", self.dpi),
        ];
        for (name, value) in fields.iter() {
            if !value.is_finite() || *value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.label_width_mm.fract() != 0.0 {
            return Err(Error::InvalidConfig(format!(
                "label width must be whole millimetres, got {}",
                self.label_width_mm
            )));
        }

        let (w, h) = (self.width_px(), self.height_px());
        if w <= 0 || h <= 0 {
            return Err(Error::InvalidConfig(format!(
                "label pixel box {}x{} is empty",
                w, h
            )));
        }
        if u32::try_from(w).is_err() || u32::try_from(h).is_err() {
            return Err(Error::InvalidConfig(format!(
                "label pixel box {}x{} is too large",
                w, h
            )));
        }
        debug!(
            "Print target {}mm x {}mm @ {} dpi -> {}x{} dots",
            self.label_width_mm, self.label_height_mm, self.dpi, w, h
        );
        Ok(())
    }
}

fn mm_to_px(mm: f64, dpi: f64) -> i64 {
    (mm / MM_PER_INCH * dpi).round() as i64
}
