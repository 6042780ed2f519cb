extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;
extern crate g1a;

use clap::{Arg, ArgMatches, App, ErrorKind};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use g1a::assembler;
use g1a::assembler::ast::Program;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const EXIT_USAGE: i32 = 1;
const EXIT_BAD_FLAG: i32 = 2;
const EXIT_MISSING_INPUT: i32 = 3;
const EXIT_ASSEMBLY: i32 = 4;
const EXIT_IO: i32 = 5;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tShow listing: {}\n\tData: {}\n\tOutfile: {}\n\tInfile: {}",
        match args.occurrences_of("verbose") {
            0 => log::LevelFilter::Error.to_string(),
            1 => log::LevelFilter::Warn.to_string(),
            2 => log::LevelFilter::Info.to_string(),
            3 | _ => log::LevelFilter::Debug.to_string(),
        },
        args.is_present("print-debug"),
        args.value_of("data").unwrap_or("None"),
        args.value_of("OUTPUT").unwrap_or("None"),
        args.value_of("INPUT").unwrap_or("None")
    );

    // Both positionals are required, clap has already rejected their absence.
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());
    let opath = Path::new(args.value_of("OUTPUT").unwrap_or_default());

    if let Some(data) = args.value_of("data") {
        warn!("data segments are not supported yet, ignoring `{}`", data);
    }

    if !ipath.exists() {
        error!("fatal: input file `{}` does not exist", ipath.display());
        std::process::exit(EXIT_MISSING_INPUT);
    }

    // The whole source is read up front; the lexer works on the raw bytes.
    let source = match fs::read(&ipath) {
        Err(err) => {
            error!("fatal: unable to read input file `{}`: {}", ipath.display(), err);
            std::process::exit(EXIT_IO);
        },
        Ok(source) => source,
    };

    let program = match assembler::parse(&source) {
        Err(err) => {
            error!("fatal: {}:{}", ipath.display(), err);
            std::process::exit(EXIT_ASSEMBLY);
        },
        Ok(program) => program,
    };

    if args.is_present("print-debug") {
        print_listing(&program);
    }

    let image = match assembler::encode(&program) {
        Err(err) => {
            error!("fatal: unable to encode `{}`: {}", ipath.display(), err);
            std::process::exit(EXIT_IO);
        },
        Ok(image) => image,
    };

    // The output file is only touched once the image is complete.
    let mut ofile = match File::create(&opath) {
        Err(err) => {
            error!("fatal: unable to open output file `{}`: {}", opath.display(), err);
            std::process::exit(EXIT_IO);
        },
        Ok(file) => file,
    };

    if let Err(err) = ofile.write_all(&image) {
        error!("fatal: unable to write to output file `{}`: {}", opath.display(), err);
        std::process::exit(EXIT_IO);
    }

    info!("wrote {} instruction(s), {} byte(s) to `{}`", program.instructions.len(), image.len(), opath.display());
}

fn print_listing(program: &Program) {
    let meta = &program.meta;
    println!("memory={} width={} height={} tickrate={} start={} tick={}",
        meta.memory, meta.width, meta.height, meta.tickrate, program.start_label, program.tick_label);

    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (idx, ins) in program.instructions.iter().enumerate() {
        let bytes: Vec<String> = ins.assemble().iter().map(|b| format!("{:02X}", b)).collect();
        grid.add(Cell::from(format!("0x{:04X}:", idx)));
        grid.add(Cell::from(format!("{}", ins)));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(bytes.join(" ")));
    }

    println!("{}", grid.fit_into_columns(4));
}

fn process_arguments() -> ArgMatches<'static> {
    let app = App::new(option_env!("CARGO_PKG_NAME").unwrap_or("g1a"))
        .version(option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"))
        .author(option_env!("CARGO_PKG_AUTHORS").unwrap_or(""))
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap_or(""))
        .arg(Arg::with_name("INPUT")
            .help("Sets the source file to assemble")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("OUTPUT")
            .help("Sets the bytecode file to write")
            .required(true)
            .multiple(false)
            .index(2))
        .arg(Arg::with_name("data")
            .short("d")
            .long("data")
            .value_name("DATA")
            .takes_value(true)
            .help("data segment file (reserved, currently ignored)"))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("print-debug")
            .short("s")
            .long("show")
            .takes_value(false)
            .help("prints the assembled listing to STDOUT"));

    match app.get_matches_safe() {
        Ok(matches) => matches,
        Err(err) => match err.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => err.exit(),
            ErrorKind::MissingRequiredArgument => {
                eprintln!("{}", err.message);
                std::process::exit(EXIT_USAGE);
            },
            _ => {
                eprintln!("{}", err.message);
                std::process::exit(EXIT_BAD_FLAG);
            },
        },
    }
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        .chain(std::io::stdout())
        .apply().ok();
}
