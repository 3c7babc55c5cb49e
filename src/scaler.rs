//! Fitting a document into the label's pixel box.
//!
//! The document's aspect ratio is only known after rendering it once, so
//! scaling is a two-pass protocol: render at natural size, work out the
//! largest size that fits, then render again at exactly that size.

use std::path::Path;

use log::debug;

use crate::{bitmap::Bitmap, error::Error, rasterizer::Rasterize, target::PrintTarget};

/// Pixel size to request from the rasterizer on the second pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledFit {
    width_px: u32,
    height_px: u32,
}

impl ScaledFit {
    /// Largest aspect-preserving size for a `natural_w` x `natural_h`
    /// render inside a `target_w` x `target_h` box.
    ///
    /// The binding width is requested one pixel short, because the
    /// rasterizer's scale-to-width mode can overshoot by one pixel.
    pub fn compute(natural_w: u32, natural_h: u32, target_w: i64, target_h: i64) -> Result<Self, Error> {
        if target_w <= 0 || target_h <= 0 {
            return Err(Error::InvalidConfig(format!(
                "target pixel box {}x{} is empty",
                target_w, target_h
            )));
        }
        if natural_w == 0 || natural_h == 0 {
            return Err(Error::Rasterization(format!(
                "rasterizer returned an empty {}x{} image",
                natural_w, natural_h
            )));
        }

        let aspect = natural_w as f64 / natural_h as f64;
        let max_aspect = target_w as f64 / target_h as f64;

        let (fit_w, fit_h) = if aspect < max_aspect {
            // taller than the box: height binds
            ((target_h as f64 * aspect).floor() as i64 - 1, target_h)
        } else {
            let fit_w = target_w - 1;
            (fit_w, (fit_w as f64 / aspect).floor() as i64)
        };
        debug!(
            "Fit {}x{} (aspect {:.3}) into {}x{} (aspect {:.3}): request {}x{}",
            natural_w, natural_h, aspect, target_w, target_h, max_aspect, fit_w, fit_h
        );

        if fit_w < 1 || fit_h < 1 {
            return Err(Error::FitConsistency(format!(
                "{}x{} document scales to a degenerate {}x{} request",
                natural_w, natural_h, fit_w, fit_h
            )));
        }
        let too_large = |_| {
            Error::InvalidConfig(format!(
                "{}x{} request exceeds the rasterizer's size range",
                fit_w, fit_h
            ))
        };
        Ok(ScaledFit {
            width_px: u32::try_from(fit_w).map_err(too_large)?,
            height_px: u32::try_from(fit_h).map_err(too_large)?,
        })
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }
}

/// Check a scaled render against the label's pixel box.
///
/// Width may exceed the box by the one pixel the rasterizer is known to
/// overshoot; height may not exceed it at all.
pub fn check_fit(bitmap: &Bitmap, target_w: i64, target_h: i64) -> Result<(), Error> {
    let (w, h) = (bitmap.width() as i64, bitmap.height() as i64);
    if w > target_w + 1 || h > target_h {
        return Err(Error::FitConsistency(format!(
            "rasterizer returned {}x{} for a {}x{} label",
            w, h, target_w, target_h
        )));
    }
    Ok(())
}

/// Render `document` at the largest size fitting `target`.
///
/// Calls the rasterizer exactly twice: once at natural size to learn the
/// aspect ratio, once with both dimensions given explicitly.
pub fn rasterize_scaled<R>(rasterizer: &R, document: &Path, target: &PrintTarget) -> Result<Bitmap, Error>
where
    R: Rasterize + ?Sized,
{
    target.validate()?;
    let (target_w, target_h) = (target.width_px(), target.height_px());

    let natural = rasterizer.rasterize(document, None)?;
    let fit = ScaledFit::compute(natural.width(), natural.height(), target_w, target_h)?;

    let scaled = rasterizer.rasterize(document, Some(fit))?;
    debug!(
        "Requested {}x{}, got {}x{}",
        fit.width_px(),
        fit.height_px(),
        scaled.width(),
        scaled.height()
    );
    check_fit(&scaled, target_w, target_h)?;
    Ok(scaled)
}
