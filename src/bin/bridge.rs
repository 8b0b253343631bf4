//! snmpbridge binary
//!
//! Spawned by the SNMP master as a pass_persist helper: commands arrive on
//! stdin, answers leave on stdout, and all logging goes to stderr or a log
//! file so the control channel stays clean.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use snmpbridge::config::CODE_STATUS;
use snmpbridge::dict::{load_dictionary, SnmpAttrs};
use snmpbridge::transport::UdpTransport;
use snmpbridge::{Config, Session};

/// snmpbridge pass_persist helper
#[derive(Parser, Debug)]
#[command(name = "snmpbridge")]
#[command(about = "SNMP pass_persist bridge to a RADIUS-style attribute backend")]
#[command(version)]
struct Args {
    /// Backend server address (host or host:port)
    server: String,

    /// Shared secret (or use --secret-file)
    secret: Option<String>,

    /// Read the shared secret from a file instead of the command line
    #[arg(short = 'S', long)]
    secret_file: Option<PathBuf>,

    /// Attribute dictionary file
    #[arg(short = 'f', long)]
    dictionary: PathBuf,

    /// Request type sent to the backend
    #[arg(long, value_enum, default_value = "status")]
    request_type: RequestType,

    /// If timeout, retry sending the packet this many times
    #[arg(short, long, default_value = "5")]
    retries: u32,

    /// Seconds to wait for a reply before retrying (may be fractional)
    #[arg(short, long, default_value = "3.0")]
    timeout: f64,

    /// Log to this file instead of stderr (stdout belongs to the master)
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Increase debug output (-x, -xx)
    #[arg(short = 'x', action = clap::ArgAction::Count)]
    debug: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RequestType {
    Status,
    Auth,
    Acct,
}

impl RequestType {
    fn code(self) -> u8 {
        match self {
            RequestType::Status => CODE_STATUS,
            RequestType::Auth => 1,
            RequestType::Acct => 4,
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("snmpbridge: failed to set up logging: {e}");
        std::process::exit(1);
    }

    std::process::exit(match run(args) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{e}");
            1
        }
    });
}

fn run(args: Args) -> snmpbridge::Result<()> {
    tracing::info!("snmpbridge v{}", snmpbridge::VERSION);

    // Default backend port applies when the address names only a host.
    let server = if args.server.contains(':') {
        args.server.clone()
    } else {
        format!("{}:18121", args.server)
    };

    let secret = resolve_secret(&args)?;
    let retries = args.retries.clamp(1, 1000);
    let timeout = Duration::from_secs_f64(args.timeout.max(0.1));

    let config = Config::builder()
        .server(&server)
        .secret(secret)
        .request_code(args.request_type.code())
        .retries(retries)
        .timeout(timeout)
        .build();

    let dict = Arc::new(load_dictionary(&args.dictionary)?);
    let attrs = SnmpAttrs::resolve(&dict)?;

    // Termination signals only set the flag; the loop observes it at its
    // suspension points.
    let stop = Arc::new(AtomicBool::new(false));
    let stop_signal = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        stop_signal.store(true, Ordering::Relaxed);
    })
    .map_err(|e| snmpbridge::BridgeError::Config(format!("failed installing signal handler: {e}")))?;

    let transport = UdpTransport::connect(
        &config.server,
        Arc::clone(&dict),
        config.secret.clone(),
        config.request_code,
        Arc::clone(&stop),
    )?;

    tracing::debug!("Starting pass_persist read loop");

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let mut session = Session::new(dict, attrs, transport, stdin, stdout, &config, stop);
    let result = session.run();

    tracing::debug!("Read loop done");
    result
}

/// Pick the shared secret from the command line or a secret file
fn resolve_secret(args: &Args) -> snmpbridge::Result<String> {
    if let Some(path) = &args.secret_file {
        let raw = std::fs::read_to_string(path)?;
        let secret = raw.trim_end().to_string();
        if secret.len() < 2 {
            return Err(snmpbridge::BridgeError::Config(format!(
                "secret in {} is too short",
                path.display()
            )));
        }
        return Ok(secret);
    }
    if let Some(secret) = &args.secret {
        return Ok(secret.clone());
    }
    Err(snmpbridge::BridgeError::Config(
        "no shared secret given (argument or --secret-file)".to_string(),
    ))
}

/// Initialize tracing to stderr or the requested log file
fn init_logging(args: &Args) -> std::io::Result<()> {
    let default_filter = match args.debug {
        0 => "info",
        1 => "info,snmpbridge=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let writer = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(())
}
