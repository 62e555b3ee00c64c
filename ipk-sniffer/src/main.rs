#![warn(clippy::all)]

#[macro_use]
extern crate log;

use clap::error::ErrorKind;
use clap::{crate_version, CommandFactory, Parser};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libsniffer::{FilterSpec, PortDirection, PortFilter, ProtocolKind, Reporter};
use libsniffer_live::{create_engine_live, list_interfaces};
use libsniffer_tools::Config;

/// Live network packet sniffer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Interface to capture on (without a value: list interfaces and exit)
    #[arg(short, long, value_name = "INTERFACE", num_args = 0..=1)]
    interface: Option<Option<String>>,

    /// Show TCP segments
    #[arg(short, long)]
    tcp: bool,

    /// Show UDP datagrams
    #[arg(short, long)]
    udp: bool,

    /// Filter TCP/UDP by port (source or destination, see `filter.port_mode`)
    #[arg(short = 'p', value_name = "PORT")]
    port: Option<u16>,

    /// Filter TCP/UDP by source port
    #[arg(long, value_name = "PORT")]
    port_source: Option<u16>,

    /// Filter TCP/UDP by destination port
    #[arg(long, value_name = "PORT")]
    port_destination: Option<u16>,

    /// Show ARP frames
    #[arg(long)]
    arp: bool,

    /// Show ICMPv4 packets
    #[arg(long)]
    icmp4: bool,

    /// Show ICMPv6 echo request/reply (and other non-NDP, non-MLD messages)
    #[arg(long)]
    icmp6: bool,

    /// Show NDP packets (ICMPv6 types 133 to 137)
    #[arg(long)]
    ndp: bool,

    /// Show MLD packets
    #[arg(long)]
    mld: bool,

    /// Show IGMP packets
    #[arg(long)]
    igmp: bool,

    /// Number of packets to display, 0 for no limit (default: 1)
    #[arg(short = 'n', value_name = "NUM")]
    num: Option<u32>,

    /// Configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<String>,

    /// Append a hex dump of each displayed frame
    #[arg(short = 'x', long)]
    hexdump: bool,

    /// Be verbose
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn protocols(&self) -> Vec<ProtocolKind> {
        [
            (self.tcp, ProtocolKind::Tcp),
            (self.udp, ProtocolKind::Udp),
            (self.arp, ProtocolKind::Arp),
            (self.icmp4, ProtocolKind::Icmp4),
            (self.icmp6, ProtocolKind::Icmp6),
            (self.ndp, ProtocolKind::Ndp),
            (self.mld, ProtocolKind::Mld),
            (self.igmp, ProtocolKind::Igmp),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }

    fn has_filters(&self) -> bool {
        !self.protocols().is_empty()
            || self.port.is_some()
            || self.port_source.is_some()
            || self.port_destination.is_some()
    }
}

fn load_config(config: &mut Config, filename: &str) -> Result<(), io::Error> {
    debug!("Loading configuration {filename}");
    let path = Path::new(&filename);
    let file = File::open(path)?;
    config.load_config(file)
}

fn usage_error(kind: ErrorKind, msg: impl std::fmt::Display) -> ! {
    Args::command().error(kind, msg).exit()
}

fn build_filter(args: &Args, config: &Config) -> FilterSpec {
    let port_mode = config
        .get("filter.port_mode")
        .map_or(Ok(PortDirection::Either), PortDirection::of_string)
        .unwrap_or_else(|e| usage_error(ErrorKind::InvalidValue, e));
    let ports = [
        (args.port, port_mode),
        (args.port_source, PortDirection::Source),
        (args.port_destination, PortDirection::Destination),
    ]
    .into_iter()
    .filter_map(|(port, direction)| port.map(|p| PortFilter::new(p, direction)))
    .collect();
    FilterSpec::new(args.protocols(), ports)
        .unwrap_or_else(|e| usage_error(ErrorKind::ArgumentConflict, e))
}

fn init_logging(verbose: bool, log_file: Option<&str>) {
    let level = if verbose { Level::INFO } else { Level::WARN };
    let env_filter = EnvFilter::try_from_env("IPK_SNIFFER_LOG")
        .unwrap_or_else(|_| EnvFilter::from_default_env().add_directive(level.into()));
    match log_file {
        Some(log_file) => {
            let path = Path::new(log_file);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().unwrap_or(path.as_os_str());
            let file_appender = RollingFileAppender::new(Rotation::NEVER, dir, file_name);
            tracing_subscriber::fmt()
                .with_writer(file_appender)
                .with_env_filter(env_filter)
                .with_ansi(false)
                .compact()
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_env_filter(env_filter)
                .compact()
                .init();
        }
    }
}

fn print_interfaces() -> ExitCode {
    match list_interfaces() {
        Ok(names) => {
            for name in names {
                println!("{name}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ipk-sniffer: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // load config
    let mut config = Config::default();
    if let Some(filename) = args.config.as_ref() {
        if let Err(e) = load_config(&mut config, filename) {
            eprintln!("ipk-sniffer: could not load configuration {filename}: {e}");
            return ExitCode::FAILURE;
        }
    }
    // override config options from command-line arguments
    if let Some(num) = args.num {
        config.set("max_packets", i64::from(num));
    } else if config.get_usize("max_packets").is_none() {
        config.set("max_packets", 1);
    }
    if args.hexdump {
        config.set("output.hexdump", true);
    }

    init_logging(args.verbose, config.get("log_file"));
    info!("ipk-sniffer {}", crate_version!());

    let interface_name = match args.interface {
        Some(Some(ref name)) => name.as_str(),
        _ if args.has_filters() => usage_error(
            ErrorKind::MissingRequiredArgument,
            "filters require an interface (-i/--interface)",
        ),
        _ => return print_interfaces(),
    };
    let filter = build_filter(&args, &config);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        warn!("Could not install signal handler: {e}");
    }

    let hexdump = config.get_bool("output.hexdump").unwrap_or(false);
    let reporter = Reporter::new(io::stdout().lock(), hexdump);
    let mut engine = match create_engine_live(interface_name, filter, reporter, &config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ipk-sniffer: {e}");
            return ExitCode::FAILURE;
        }
    };

    match engine.run(running) {
        Ok(summary) => {
            info!(
                "ipk-sniffer: done ({} frames, {} displayed), exiting",
                summary.frames, summary.accepted
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ipk-sniffer: {e}");
            ExitCode::FAILURE
        }
    }
}
