//! # pueo_chanmap_cli
//!
//! Part of the pueo_chanmap crate family.
//!
//! Command line front end for looking up PUEO channels and waveform timebases.
//!
//! ## Use
//!
//! ```bash
//! pueo_chanmap_cli -c geometry.yml new
//! pueo_chanmap_cli index --ring top --phi 10 --pol V
//! pueo_chanmap_cli address --index 136
//! pueo_chanmap_cli table
//! pueo_chanmap_cli times --samples 1024 --dt 0.333
//! pueo_chanmap_cli direction --sector 6 --heading 90
//! ```
//!
//! Without `-c` the standard PUEO geometry with the bundled channel map is used. Pass
//! `--log <file>` to write the log to a file instead of the terminal.
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libpueo_chanmap::address_book::ChannelAddressBook;
use libpueo_chanmap::config::GeometryConfig;
use libpueo_chanmap::hardware_id::ChannelIndex;
use libpueo_chanmap::timebase::Timebase;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn cli() -> Command {
    Command::new("pueo_chanmap_cli")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the geometry configuration yaml file"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Write the log to this file"),
        )
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .subcommand(
            Command::new("index")
                .about("Find the channel index of an antenna polarization")
                .arg(
                    Arg::new("ring")
                        .long("ring")
                        .required(true)
                        .help("Ring keyword (top, upper_middle, lower_middle, bottom, nadir, lf)"),
                )
                .arg(
                    Arg::new("phi")
                        .long("phi")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("pol")
                        .long("pol")
                        .required(true)
                        .help("Polarization (H or V)"),
                ),
        )
        .subcommand(
            Command::new("address")
                .about("Find the antenna polarization of a channel index")
                .arg(
                    Arg::new("index")
                        .long("index")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(Command::new("table").about("Print the full channel table as CSV"))
        .subcommand(
            Command::new("times")
                .about("Print the sample times of a waveform")
                .arg(
                    Arg::new("samples")
                        .long("samples")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("dt")
                        .long("dt")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("t0")
                        .long("t0")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("direction")
                .about("Print the direction wrt north a phi sector looks")
                .arg(
                    Arg::new("sector")
                        .long("sector")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("heading")
                        .long("heading")
                        .default_value("0")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                ),
        )
}

fn setup_file_logger(path: &Path) -> CliResult {
    let file_sink = Arc::new(
        spdlog::sink::FileSink::builder()
            .path(path.to_path_buf())
            .formatter(Box::new(spdlog::formatter::PatternFormatter::new(
                spdlog::formatter::pattern!(
                    "[{date_short} {time_short}] - [thread: {tid}] - [{^{level}}] - {payload}{eol}"
                ),
            )))
            .truncate(true)
            .build()?,
    );
    let logger = Arc::new(
        spdlog::Logger::builder()
            .flush_level_filter(spdlog::LevelFilter::All)
            .sink(file_sink)
            .build()?,
    );
    spdlog::set_default_logger(logger);
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<GeometryConfig, Box<dyn std::error::Error>> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            spdlog::info!("Loading config from {}...", path.to_string_lossy());
            GeometryConfig::read_config_file(path)?
        }
        None => GeometryConfig::default(),
    };
    if config.has_custom_map() {
        spdlog::info!("Using the channel map named in the config.");
    } else {
        spdlog::info!("Using the bundled channel map.");
    }
    Ok(config)
}

fn make_template_config(matches: &ArgMatches) -> CliResult {
    let path = matches
        .get_one::<PathBuf>("config")
        .ok_or("new requires a config path (-c)")?;
    spdlog::info!("Making a template config at {}...", path.to_string_lossy());
    GeometryConfig::default().write_config_file(path)?;
    spdlog::info!("Done.");
    Ok(())
}

fn print_index(book: &ChannelAddressBook, matches: &ArgMatches) -> CliResult {
    let ring = matches.get_one::<String>("ring").ok_or("missing ring")?;
    let phi = *matches.get_one::<usize>("phi").ok_or("missing phi")?;
    let pol = matches.get_one::<String>("pol").ok_or("missing pol")?;
    let index = book.lookup(ring, phi, pol)?;
    let digitizer = book.digitizer_for(index)?;
    println!(
        "{} -> channel {index} (SURF {} chan {})",
        book.address_for(index)?,
        digitizer.surf,
        digitizer.chan
    );
    Ok(())
}

fn print_address(book: &ChannelAddressBook, matches: &ArgMatches) -> CliResult {
    let index = ChannelIndex(*matches.get_one::<usize>("index").ok_or("missing index")?);
    let address = book.address_for(index)?;
    let digitizer = book.digitizer_for(index)?;
    println!(
        "channel {index} -> {address} (ring: {}, phi: {}, pol: {}, antenna: {}, SURF {} chan {})",
        address.ring,
        address.phi,
        address.pol,
        book.antenna_number(&address)?,
        digitizer.surf,
        digitizer.chan
    );
    Ok(())
}

fn print_table(book: &ChannelAddressBook) -> CliResult {
    println!("index,surf,chan,ring,phi,pol,antenna,name");
    for (index, address) in book.iter() {
        let digitizer = book.digitizer_for(index)?;
        println!(
            "{index},{},{},{},{},{},{},{address}",
            digitizer.surf,
            digitizer.chan,
            address.ring.keyword(),
            address.phi,
            address.pol,
            book.antenna_number(&address)?
        );
    }
    Ok(())
}

fn print_times(matches: &ArgMatches) -> CliResult {
    let samples = *matches.get_one::<i64>("samples").ok_or("missing samples")?;
    let dt = *matches.get_one::<f64>("dt").ok_or("missing dt")?;
    let mut timebase = Timebase::new(samples, dt)?;
    if let Some(t0) = matches.get_one::<f64>("t0") {
        timebase = timebase.with_offset(*t0)?;
    }
    for t in timebase.times() {
        println!("{t}");
    }
    Ok(())
}

fn print_direction(book: &ChannelAddressBook, matches: &ArgMatches) -> CliResult {
    let sector = *matches.get_one::<usize>("sector").ok_or("missing sector")?;
    let heading = *matches.get_one::<f64>("heading").ok_or("missing heading")?;
    println!("{}", book.direction_wrt_north(sector, heading)?);
    Ok(())
}

fn run(matches: &ArgMatches) -> CliResult {
    match matches.subcommand() {
        Some(("new", sub)) => make_template_config(sub),
        Some(("times", sub)) => print_times(sub),
        Some((name, sub)) => {
            let config = load_config(sub)?;
            let book = ChannelAddressBook::new(&config)?;
            match name {
                "index" => print_index(&book, sub),
                "address" => print_address(&book, sub),
                "table" => print_table(&book),
                "direction" => print_direction(&book, sub),
                _ => Err(format!("Unrecognized command {name}").into()),
            }
        }
        None => Ok(()),
    }
}

fn main() {
    let matches = cli().get_matches();

    // Global args are visible from the subcommand regardless of where they were given
    let active = matches.subcommand().map_or(&matches, |(_, sub)| sub);
    if let Some(log_path) = active.get_one::<PathBuf>("log") {
        if let Err(e) = setup_file_logger(log_path) {
            eprintln!("Could not create log file: {e}");
        }
    }

    if let Err(e) = run(&matches) {
        spdlog::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_negative_arguments_reach_the_library() {
        let matches = cli()
            .try_get_matches_from(["pueo_chanmap_cli", "times", "--samples", "-3", "--dt", "0.1"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(print_times(sub).is_err());
    }

    #[test]
    fn test_no_config_uses_bundled_map() {
        let matches = cli()
            .try_get_matches_from(["pueo_chanmap_cli", "table"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let config = load_config(sub).unwrap();
        assert!(!config.has_custom_map());
        assert_eq!(config.chans_per_surf, GeometryConfig::default().chans_per_surf);
    }
}
