use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use corsairmi_exporter::{
    locate::{self, SCAN_COUNT},
    render::{self, Format, DEFAULT_PREFIX},
    telemetry, PowerSupply,
};

#[derive(Parser, Debug)]
#[command(
    name = "corsairmi-exporter",
    version,
    about = "Print Corsair RMi/HXi power supply telemetry as metrics"
)]
struct Cli {
    /// hidraw device node, e.g. /dev/hidraw5 (default: first match of /dev/hidraw0..)
    device: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Prometheus)]
    format: OutputFormat,

    /// Metric name prefix
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Number of /dev/hidrawN nodes to try when no device is given
    #[arg(long, default_value_t = SCAN_COUNT)]
    scan_count: usize,

    /// List power supplies found through sysfs and exit
    #[arg(long, action = ArgAction::SetTrue)]
    list: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Prometheus,
    Text,
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Format {
        match f {
            OutputFormat::Prometheus => Format::Prometheus,
            OutputFormat::Text => Format::Text,
        }
    }
}

fn setup_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn list() -> Result<()> {
    let paths = locate::list().context("reading /sys/class/hidraw")?;
    if paths.is_empty() {
        println!("No power supplies found");
    } else {
        println!("Found power supplies:");
        for (idx, path) in paths.iter().enumerate() {
            println!("{}: {}", idx, path.display());
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let mut psu = match &cli.device {
        Some(path) => PowerSupply::open(path)
            .with_context(|| format!("opening {}", path.display()))?,
        None => locate::scan(cli.scan_count)?,
    };
    info!("reading {:?}", psu.model());

    let readings = telemetry::poll(&mut psu).context("polling power supply")?;
    // close the device before writing output
    drop(psu);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    render::render(&mut out, cli.format.into(), &cli.prefix, &readings)
        .and_then(|()| out.flush())
        .context("writing metrics")?;
    debug!("wrote {} readings", readings.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);
    if cli.list {
        list()
    } else {
        run(&cli)
    }
}
