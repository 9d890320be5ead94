use std::{fs, process};

use clap::{crate_description, crate_name, crate_version, Arg, ArgMatches, Command};
use log::{debug, info};
use minipy::{
    check_source, compile_to_wasm, compile_to_wat, display_error, errors::errors::Error,
    run_source,
};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

fn init_logging(level: LevelFilter) {
    let logger = TermLogger::init(
        level,
        ConfigBuilder::new()
            .set_location_level(LevelFilter::Error)
            .set_time_level(LevelFilter::Off)
            .set_thread_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    if logger.is_err() {
        eprintln!("Failed to initialise logging");
    }
}

fn execute(matches: &ArgMatches, source: &str, file_name: &str) -> Result<(), Error> {
    if matches.is_present("check") {
        check_source(source, file_name)?;
        info!("{} type checks", file_name);
        return Ok(());
    }

    let emit_wat = matches.is_present("wat");
    let output = matches.value_of("output");

    if emit_wat {
        println!("{}", compile_to_wat(source, file_name)?);
    }

    if let Some(output) = output {
        let binary = compile_to_wasm(source, file_name)?;
        if let Err(error) = fs::write(output, &binary) {
            eprintln!("Failed to write {}: {}", output, error);
            process::exit(1);
        }
        info!("wrote {} bytes to {}", binary.len(), output);
    }

    if emit_wat || output.is_some() {
        return Ok(());
    }

    let result = run_source(source, file_name, true)?;
    if let Some(value) = result.value {
        println!("{}", value);
    }

    Ok(())
}

fn main() {
    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .arg(Arg::new("file").required(true).help("Source file to compile"))
        .arg(
            Arg::new("wat")
                .long("wat")
                .takes_value(false)
                .help("Print the generated WebAssembly text instead of running it"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .takes_value(false)
                .help("Only type check the program"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .value_name("OUT.wasm")
                .help("Write the compiled binary module to a file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .takes_value(true)
                .possible_values(["off", "error", "warn", "info", "debug", "trace"])
                .default_value("warn")
                .help("Verbosity of the log written to stderr"),
        )
        .get_matches();

    let level = matches
        .value_of("log-level")
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);
    init_logging(level);

    let file_path = matches.value_of("file").unwrap_or_default();
    let file_name = file_path.rsplit('/').next().unwrap_or(file_path);

    let source = match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", file_path, error);
            process::exit(1)
        }
    };
    debug!("read {} bytes from {}", source.len(), file_path);

    if let Err(error) = execute(&matches, &source, file_name) {
        display_error(&error, &source, file_name);
        process::exit(1);
    }
}
