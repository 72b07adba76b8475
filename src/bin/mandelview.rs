extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate image;
#[macro_use]
extern crate log;
extern crate mandelview;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use mandelview::command::{parse_pair, parse_script};
use mandelview::{BackendKind, Explorer, Framebuffer, Settings, Size};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const BACKEND: &str = "backend";
const THREADS: &str = "threads";
const COMMANDS: &str = "commands";
const NO_INCREMENTAL: &str = "no-incremental";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get() * 4;

    App::new("mandelview")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Pan and zoom the Mandelbrot set, headless")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x700")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse view size"))
                .help("Size of the view"),
        )
        .arg(
            Arg::with_name(BACKEND)
                .required(false)
                .long(BACKEND)
                .short("b")
                .takes_value(true)
                .default_value("tiled")
                .validator(|s| {
                    BackendKind::from_str(&s)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .help("Compute backend: sequential, tiled, tiled:N or accelerator"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of workers for the tiled backend"),
        )
        .arg(
            Arg::with_name(COMMANDS)
                .required(false)
                .long(COMMANDS)
                .short("c")
                .takes_value(true)
                .validator(|s| parse_script(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Commands to run after the first frame, separated by ';'"),
        )
        .arg(
            Arg::with_name(NO_INCREMENTAL)
                .long(NO_INCREMENTAL)
                .help("Redraw the whole view on every move"),
        )
        .get_matches()
}

fn write_image(outfile: &str, framebuffer: &Framebuffer) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let size = framebuffer.size();
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(
        &*framebuffer.to_rgb(),
        size.width as u32,
        size.height as u32,
        ColorType::RGB(8),
    )?;
    Ok(())
}

fn backend_kind(matches: &ArgMatches) -> Result<BackendKind, failure::Error> {
    let name = matches.value_of(BACKEND).unwrap_or("tiled");
    let kind = BackendKind::from_str(name)?;
    match (kind, matches.value_of(THREADS)) {
        (BackendKind::Tiled(_), Some(threads)) if !name.contains(':') => {
            Ok(BackendKind::Tiled(usize::from_str(threads)?))
        }
        _ => Ok(kind),
    }
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let (width, height) = parse_pair::<u16>(matches.value_of(SIZE).unwrap_or("800x700"), 'x')
        .ok_or_else(|| failure::err_msg("Error parsing view size"))?;
    if width == 0 || height == 0 {
        return Err(failure::err_msg("View size must not be empty"));
    }
    let view_size = Size::new(i32::from(width), i32::from(height));
    let commands = parse_script(matches.value_of(COMMANDS).unwrap_or(""))?;

    let settings = Settings {
        view_size,
        max_size: view_size,
        backend: backend_kind(matches)?,
        incremental: !matches.is_present(NO_INCREMENTAL),
    };

    let mut explorer = Explorer::new(settings)?;
    explorer.present();
    for command in &commands {
        explorer.apply(command)?;
        let applied = explorer.present();
        info!(
            "{}: {} updates, last took {} ms",
            command,
            applied,
            explorer.last_elapsed().unwrap_or(0)
        );
    }

    info!("{} at {}", explorer.title(), explorer.position_label());
    let written = write_image(matches.value_of(OUTPUT).unwrap_or(""), &explorer.framebuffer());
    explorer.dispose();
    Ok(written?)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
