//! PDF to TSPL label converter
//!
//! This crate renders a document page into a monochrome bitmap, fits it onto
//! a thermal label and wraps it in a TSPL command script that can be sent
//! to a networked label printer.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tspl_label::{convert, Pdftoppm, PrintSettings, PrintTarget, Printer};
//!
//! let target = PrintTarget::new().label_width_mm(100.0).label_height_mm(150.0);
//! let script = convert(&Pdftoppm::new(), Path::new("label.pdf"), &target, &PrintSettings::default()).unwrap();
//! let printer = Printer::new("192.168.1.50:9100").unwrap();
//! printer.print(&script).unwrap();
//! ```

mod bitmap;
mod error;
mod label;
mod printer;
mod rasterizer;
mod scaler;
mod target;
mod tspl;

pub use crate::{
    bitmap::{pack, row_bytes, Bitmap, Polarity},
    error::Error,
    label::{convert, preview},
    printer::{write_to_file, Printer},
    rasterizer::{ImageFile, Pdftoppm, Rasterize},
    scaler::{check_fit, rasterize_scaled, ScaledFit},
    target::PrintTarget,
    tspl::{LabelScript, Placement, PrintSettings},
};

/// Millimetres per inch, used to turn label sizes into printer dots.
pub const MM_PER_INCH: f64 = 25.4;

/// Default label width in millimetres.
pub const DEFAULT_LABEL_WIDTH_MM: f64 = 102.0;

/// Default label height in millimetres.
pub const DEFAULT_LABEL_HEIGHT_MM: f64 = 76.0;

/// Default printer resolution: 8 dots per millimetre.
pub const DEFAULT_DPI: f64 = 203.2;
