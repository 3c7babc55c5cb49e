//! Turning documents into monochrome bitmaps.
//!
//! The rasterizer is an external collaborator. [`Rasterize`] is the seam the
//! pipeline talks to, so tests can swap in a fake and callers can plug in
//! other renderers. Implementations return bitmaps in rasterizer polarity
//! ([`Polarity::ZeroIsBlack`](crate::Polarity::ZeroIsBlack)).

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use image::imageops::{self, FilterType};
use log::debug;

use crate::{bitmap::Bitmap, error::Error, scaler::ScaledFit};

pub trait Rasterize {
    /// Render `document` as a monochrome bitmap.
    ///
    /// With `scale_to` set, the output should be exactly that size (give or
    /// take the renderer's own rounding). Without it, the document is
    /// rendered at its natural size.
    fn rasterize(&self, document: &Path, scale_to: Option<ScaledFit>) -> Result<Bitmap, Error>;
}

/// Renders the first page of a PDF with poppler's `pdftoppm`.
///
/// Runs `pdftoppm -mono -singlefile [-scale-to-x W -scale-to-y H] <document>`
/// and reads the PBM image it writes to stdout.
///
/// `pdftoppm -scale-to-x` has been seen to overshoot the requested width by
/// one pixel. [`ScaledFit::compute`] compensates for exactly that; replacing
/// this renderer means re-checking that allowance.
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    program: PathBuf,
}

impl Default for Pdftoppm {
    fn default() -> Self {
        Pdftoppm {
            program: PathBuf::from("pdftoppm"),
        }
    }
}

impl Pdftoppm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `pdftoppm` binary instead of looking it up in `PATH`.
    pub fn program(self, program: impl Into<PathBuf>) -> Self {
        Pdftoppm {
            program: program.into(),
        }
    }

    fn args(document: &Path, scale_to: Option<ScaledFit>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-mono".into(), "-singlefile".into()];
        if let Some(fit) = scale_to {
            args.push("-scale-to-x".into());
            args.push(fit.width_px().to_string().into());
            args.push("-scale-to-y".into());
            args.push(fit.height_px().to_string().into());
        }
        args.push(document.as_os_str().to_owned());
        args
    }
}

impl Rasterize for Pdftoppm {
    fn rasterize(&self, document: &Path, scale_to: Option<ScaledFit>) -> Result<Bitmap, Error> {
        let args = Self::args(document, scale_to);
        debug!("Running {:?} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|err| {
                Error::Rasterization(format!("failed to run {:?}: {}", self.program, err))
            })?;

        if !output.status.success() {
            return Err(Error::Rasterization(format!(
                "{:?} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        debug!("pdftoppm wrote {} bytes", output.stdout.len());

        let bitmap = Bitmap::from_pbm(&output.stdout)?;
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(Error::Rasterization(format!(
                "rasterizer returned an empty {}x{} image",
                bitmap.width(),
                bitmap.height()
            )));
        }
        Ok(bitmap)
    }
}

/// Loads a raster image file (PNG, JPEG, ...) instead of rendering a PDF.
///
/// The image is converted to grayscale, resized to the exact requested size
/// and thresholded at 50% luma.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFile;

impl Rasterize for ImageFile {
    fn rasterize(&self, document: &Path, scale_to: Option<ScaledFit>) -> Result<Bitmap, Error> {
        let gray = image::open(document)?.to_luma8();
        debug!(
            "Loaded {:?} ({}x{})",
            document,
            gray.width(),
            gray.height()
        );

        let gray = match scale_to {
            Some(fit) => imageops::resize(
                &gray,
                fit.width_px(),
                fit.height_px(),
                FilterType::Triangle,
            ),
            None => gray,
        };
        if gray.width() == 0 || gray.height() == 0 {
            return Err(Error::Rasterization(format!(
                "{:?} is an empty image",
                document
            )));
        }
        Ok(Bitmap::from_gray(&gray))
    }
}
