//! blockview entry point.

use clap::Parser;

use blockview::config::{parse_fraction, Settings};
use blockview::device::{Device, FramebufferDevice, TerminalDevice};
use blockview::error::Result;
use blockview::signals::SignalFlags;
use blockview::ui::{self, UiContext};
use blockview::viewer::{Fit, Viewer, ViewMode, WindowId};

/// PDF viewer with automatic zoom to the blocks of text.
#[derive(Parser, Debug)]
#[command(name = "blockview", version, about = "pdf viewer with autozoom to text")]
struct Args {
    /// The PDF file to show.
    file: Option<String>,

    /// View mode: a(uto), t(ext area), b(ounding box), p(age).
    #[arg(short = 'm', value_name = "mode")]
    mode: Option<char>,

    /// Fit direction: n(one), h(orizontal), v(ertical), b(oth).
    #[arg(short = 'f', value_name = "dir")]
    fit: Option<char>,

    /// Minimal width in points (the maximal zoom).
    #[arg(short = 'w', value_name = "width")]
    min_width: Option<f64>,

    /// Minimal text-to-text distance in points.
    #[arg(short = 't', value_name = "distance")]
    distance: Option<f64>,

    /// Block ordering: q(uick), t(wo-step), c(har).
    #[arg(short = 'o', value_name = "ord")]
    order: Option<char>,

    /// Output device path (a framebuffer node, or "terminal").
    #[arg(short = 'd', value_name = "device")]
    device: Option<String>,

    /// Screen aspect, as W:H, W/H or a float.
    #[arg(short = 's', value_name = "aspect")]
    aspect: Option<String>,

    /// Skip the tutorial on startup.
    #[arg(short = 'p')]
    no_tutorial: bool,

    /// Do not pre-initialize the labels.
    #[arg(short = 'e')]
    no_init_labels: bool,

    /// External command fifo.
    #[arg(short = 'z', value_name = "fifo")]
    command_fifo: Option<String>,

    /// Reserved.
    #[arg(short = 'l', hide = true, value_name = "arg")]
    reserved_l: Option<String>,

    /// Reserved.
    #[arg(short = 'c', hide = true, value_name = "arg")]
    reserved_c: Option<String>,

    /// Reserved.
    #[arg(short = 'C', hide = true, value_name = "arg")]
    reserved_upper_c: Option<String>,

    /// Show a built-in synthetic document (no PDF backend required).
    #[arg(long)]
    sim: bool,
}

fn settings_from(args: &Args) -> Settings {
    let mut settings = Settings::load();
    if let Some(m) = args.mode.and_then(ViewMode::from_letter) {
        settings.mode = m;
    }
    if let Some(f) = args.fit.and_then(Fit::from_letter) {
        settings.fit = f;
    }
    if let Some(w) = args.min_width {
        settings.min_width = w;
    }
    if let Some(t) = args.distance {
        settings.distance = t;
    }
    if let Some(o) = args.order {
        settings.parse(&format!("order {o}"));
    }
    if let Some(d) = &args.device {
        settings.device = Some(d.clone());
    }
    if let Some(a) = args.aspect.as_deref().and_then(parse_fraction) {
        settings.aspect = a;
    }
    if args.no_tutorial {
        settings.tutorial = false;
    }
    if args.no_init_labels {
        settings.init_labels = false;
    }
    settings
}

fn run<B: blockview::backend::DocumentBackend>(
    doc: B,
    settings: &Settings,
    command_fifo: Option<&str>,
) -> Result<()> {
    let flags = SignalFlags::new();
    flags.register()?;

    match settings.device.as_deref() {
        Some(path) if path.starts_with("/dev/fb") => {
            let device = FramebufferDevice::open(
                Some(path),
                command_fifo,
                settings.font_size,
                flags.clone(),
            )?;
            run_on(doc, settings, device, flags)
        }
        _ => {
            let device = TerminalDevice::open(command_fifo, settings.font_size, flags.clone())?;
            run_on(doc, settings, device, flags)
        }
    }
}

fn run_on<B: blockview::backend::DocumentBackend, D: Device>(
    doc: B,
    settings: &Settings,
    mut device: D,
    flags: SignalFlags,
) -> Result<()> {
    let view = settings.view(device.screen_width(), device.screen_height());
    let mut viewer = Viewer::open(doc, view)?;

    let mut ui = UiContext::new(flags);
    ui.margin = settings.margin;
    ui.init_labels = settings.init_labels;

    let first = if settings.tutorial {
        WindowId::Tutorial
    } else {
        WindowId::Document
    };
    ui::run(&mut viewer, &mut device, &mut ui, first);
    Ok(())
}

fn open_and_run(args: &Args, settings: &Settings) -> Result<()> {
    let fifo = args.command_fifo.as_deref();

    if args.sim {
        let doc = blockview::backend::sim::SimDocument::uniform(5, |n| {
            let mut page = blockview::backend::sim::SimPage::new(612.0, 792.0);
            for line in 0..30 {
                let y = 80.0 + line as f64 * 16.0;
                page = page
                    .text_line(50.0, y, "sample text in the left column xx")
                    .text_line(320.0, y, "and more text on the right side x");
            }
            page.line(296.0, 760.0, &format!("{}", n + 1), 8.0, 12.0, "Sim-Regular")
        });
        return run(doc, settings, fifo);
    }

    let Some(file) = &args.file else {
        return Err(blockview::error::Error::DocumentOpen {
            path: String::new(),
            reason: "file name missing".to_string(),
        });
    };

    #[cfg(feature = "mupdf")]
    {
        let doc = blockview::backend::mupdf::MupdfDocument::open(file)?;
        run(doc, settings, fifo)
    }
    #[cfg(not(feature = "mupdf"))]
    {
        let _ = file;
        Err(blockview::error::Error::NoBackend)
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let settings = settings_from(&args);

    if let Err(e) = open_and_run(&args, &settings) {
        eprintln!("blockview: {e}");
        std::process::exit(1);
    }
}
