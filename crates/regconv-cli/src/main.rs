/// regconv command-line tool: classify content types, inspect envelopes,
/// and decode registry-framed Avro payloads from the shell.
///
/// # Command overview
///
/// ```text
/// regconv <COMMAND> [OPTIONS]
///
/// Commands:
///   classify   Report how a content type is treated (wrapped / versioned / supported)
///   inspect    Print the envelope of a payload file (schema id, body length, hex head)
///   decode     Decode a payload file against a registry manifest, print JSON
///   wrap       Prepend a 4-byte schema id to a raw Avro body
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log resolution details to stderr (debug level)
///   --format <FMT>   Format suffix to classify against (default: avro)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                       |
/// |------|-----------------------------------------------|
/// | 0    | Success                                       |
/// | 1    | Error (I/O failure, bad manifest, decode etc.) |
///
/// All error details and logs go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_classify;
mod cmd_decode;
mod cmd_inspect;
mod cmd_wrap;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Registry-aware Avro message converter.
#[derive(Parser)]
#[command(name = "regconv", version, about = "Registry-aware Avro message converter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log resolution details (schema id, subject, version) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Format suffix the classifier matches (`+avro` by default).
    #[arg(long, global = true, default_value = "avro")]
    format: String,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Report how a content type is classified.
    Classify(ClassifyArgs),
    /// Print the envelope of a payload file.
    Inspect(InspectArgs),
    /// Decode a payload file against a registry manifest.
    Decode(DecodeArgs),
    /// Prepend a schema id prefix to a raw Avro body.
    Wrap(WrapArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `regconv classify`.
#[derive(clap::Args)]
pub struct ClassifyArgs {
    /// Content type to classify, e.g. `application/vnd.orders.*+avro`.
    pub content_type: String,
}

/// Arguments for `regconv inspect`.
///
/// Splits the payload the way the converter would for the given content
/// type and prints what it found, without touching a registry.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Payload file to inspect.
    pub file: PathBuf,

    /// Content type the payload was published with.
    #[arg(long)]
    pub content_type: String,

    /// Number of body bytes to show in the hex dump.
    #[arg(long, default_value_t = 32)]
    pub head: usize,
}

/// Arguments for `regconv decode`.
///
/// ```text
/// ┌─────────────────┬───────────────────────────────────────────────────┐
/// │ Flag            │ Effect                                            │
/// ├─────────────────┼───────────────────────────────────────────────────┤
/// │ --content-type  │ Content type the payload was published with       │
/// │ --registry      │ JSON manifest loaded into an in-memory registry   │
/// │ --target-schema │ Reader schema (.avsc) to evolve the record into   │
/// │ -o / --output   │ Write JSON to this file instead of stdout         │
/// └─────────────────┴───────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Payload file to decode.
    pub file: PathBuf,

    /// Content type the payload was published with.
    #[arg(long)]
    pub content_type: String,

    /// Registry manifest: `{"schemas": [{"id", "subject", "version", "schema"}]}`.
    #[arg(long)]
    pub registry: PathBuf,

    /// Reader schema to decode into. Defaults to the writer schema.
    #[arg(long)]
    pub target_schema: Option<PathBuf>,

    /// Write the decoded JSON to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `regconv wrap`.
#[derive(clap::Args)]
pub struct WrapArgs {
    /// Raw Avro body (no prefix).
    pub file: PathBuf,

    /// Schema id to prepend, big-endian.
    #[arg(long)]
    pub schema_id: i32,

    /// Output file for the wrapped payload.
    #[arg(short, long)]
    pub output: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Classify(args) => cmd_classify::run(&args, &cli.format),
        Commands::Inspect(args) => cmd_inspect::run(&args, &cli.format),
        Commands::Decode(args) => cmd_decode::run(&args, &cli.format),
        Commands::Wrap(args) => cmd_wrap::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
