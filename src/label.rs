use std::path::Path;

use image::GrayImage;
use log::debug;

use crate::{
    bitmap::Bitmap,
    error::Error,
    rasterizer::Rasterize,
    scaler::rasterize_scaled,
    target::PrintTarget,
    tspl::{LabelScript, Placement, PrintSettings},
};

/// Convert the first page of `document` into a label script.
///
/// Validates `target` and `settings`, renders twice to fit the label (see
/// [`rasterize_scaled`]), packs the bitmap and wraps it in the setup
/// directives. Either a complete script comes back or nothing does.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use tspl_label::{convert, Pdftoppm, PrintSettings, PrintTarget, Printer};
///
/// let target = PrintTarget::new().label_width_mm(100.0).label_height_mm(150.0);
/// let script = convert(&Pdftoppm::new(), Path::new("label.pdf"), &target, &PrintSettings::default())?;
/// Printer::new("192.168.1.50:9100")?.print(&script)?;
/// # Ok::<(), tspl_label::Error>(())
/// ```
pub fn convert<R>(
    rasterizer: &R,
    document: &Path,
    target: &PrintTarget,
    settings: &PrintSettings,
) -> Result<LabelScript, Error>
where
    R: Rasterize + ?Sized,
{
    target.validate()?;
    settings.validate()?;
    debug!("Converting {:?}", document);

    let bitmap = rasterize_scaled(rasterizer, document, target)?.pack();
    LabelScript::build(bitmap, target, settings)
}

/// Draw a packed bitmap onto a label-sized grayscale canvas, centred the way
/// the printer will place it.
pub fn preview(bitmap: &Bitmap, target: &PrintTarget) -> Result<GrayImage, Error> {
    let (width, height) = target.pixel_box()?;
    let placement = Placement::center(bitmap, target)?;
    Ok(bitmap.to_gray_canvas(width, height, placement.x, placement.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::bitmap::Polarity;

    #[test]
    fn preview_is_label_sized_and_centred() {
        let target = PrintTarget::new().label_width_mm(4.0).label_height_mm(2.0);
        assert_eq!((target.width_px(), target.height_px()), (32, 16));

        let bitmap = Bitmap::new(8, 2, vec![0xFF, 0x00], Polarity::OneIsBlack).unwrap();
        let img = preview(&bitmap, &target).unwrap();
        assert_eq!(img.dimensions(), (32, 16));
        assert_eq!(img.get_pixel(12, 7).0[0], 0);
        assert_eq!(img.get_pixel(19, 7).0[0], 0);
        assert_eq!(img.get_pixel(12, 8).0[0], 255);
        assert_eq!(img.get_pixel(11, 7).0[0], 255);
    }
}
