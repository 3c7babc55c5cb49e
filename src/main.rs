//
// cargo run -- label.pdf --printer 192.168.1.50:9100 -x 100 -y 150
//
use std::path::PathBuf;

use clap::Parser;
use log::info;
use tspl_label::{
    preview, rasterize_scaled, write_to_file, Error, ImageFile, LabelScript, Pdftoppm,
    PrintSettings, PrintTarget, Printer, Rasterize, DEFAULT_DPI, DEFAULT_LABEL_HEIGHT_MM,
    DEFAULT_LABEL_WIDTH_MM,
};

/// Convert a PDF to TSPL to send to a label printer.
#[derive(Parser, Debug)]
#[command(name = "pdf2tspl", version)]
struct Args {
    /// The PDF to convert (or a PNG/JPEG with --image).
    document: PathBuf,

    /// The network device to write the TSPL to, as <host>:<port>.
    #[arg(long, env = "TSPL_PRINTER", required_unless_present = "output")]
    printer: Option<String>,

    /// Write the TSPL to this file instead of the printer ("-" for stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The width of the label, in millimetres.
    #[arg(short = 'x', long, default_value_t = DEFAULT_LABEL_WIDTH_MM as u32)]
    width: u32,

    /// The height of the label, in millimetres.
    #[arg(short = 'y', long, default_value_t = DEFAULT_LABEL_HEIGHT_MM as u32)]
    height: u32,

    /// Resolution of the printer. Defaults to 8 dots per mm (203.2 dpi).
    #[arg(short, long, default_value_t = DEFAULT_DPI)]
    dpi: f64,

    /// Print speed.
    #[arg(long, default_value_t = 5)]
    speed: u8,

    /// Print density, 0-15.
    #[arg(long, default_value_t = 8)]
    density: u8,

    /// Number of copies.
    #[arg(long, default_value_t = 1)]
    copies: u32,

    /// Also save the label as it will be printed to this PNG file.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Treat the document as a raster image instead of a PDF.
    #[arg(long)]
    image: bool,
}

fn run(args: Args) -> Result<(), Error> {
    let target = PrintTarget::new()
        .label_width_mm(f64::from(args.width))
        .label_height_mm(f64::from(args.height))
        .dpi(args.dpi);
    target.validate()?;
    let settings = PrintSettings::new()
        .speed(args.speed)
        .density(args.density)
        .copies(args.copies);

    // resolve the printer before doing any work
    let printer = match (&args.output, &args.printer) {
        (None, Some(address)) => Some(Printer::new(address)?),
        _ => None,
    };

    let rasterizer: Box<dyn Rasterize> = if args.image {
        Box::new(ImageFile)
    } else {
        Box::new(Pdftoppm::new())
    };

    let bitmap = rasterize_scaled(rasterizer.as_ref(), &args.document, &target)?.pack();
    if let Some(path) = &args.preview {
        preview(&bitmap, &target)?.save(path)?;
        info!("Saved preview to {:?}", path);
    }
    let script = LabelScript::build(bitmap, &target, &settings)?;

    match (&args.output, printer) {
        (Some(path), _) => write_to_file(&script, path),
        (None, Some(printer)) => printer.print(&script),
        (None, None) => Err(Error::InvalidConfig(
            "either --printer or --output is required".to_string(),
        )),
    }
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "{} - {}", record.level(), record.args())
        })
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("pdf2tspl: {}", err);
        std::process::exit(1);
    }
}
