use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hostscan")]
#[command(about = "Scan host hardware and OS metrics, store and serve the results")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding stored results
    #[arg(long, global = true)]
    pub results_dir: Option<PathBuf>,

    /// Show debug logging and scan diagnostics
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan this host and print or export the results
    Scan(ScanArgs),

    /// List the available scan operations
    Apis,

    /// Inspect results stored on this machine
    #[command(subcommand)]
    Results(ResultsCommand),

    /// Run the remote scan service
    Serve(ServeArgs),

    /// Talk to a remote scan service
    Remote(RemoteArgs),
}

#[derive(Parser)]
pub struct ScanArgs {
    /// Section to scan: full, system, cpu, memory, gpu, disk, network, process, uptime
    #[arg(long, default_value = "full")]
    pub kind: String,

    /// Write the scan as JSON to FILE
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write a Markdown report to FILE
    #[arg(long, value_name = "FILE")]
    pub markdown: Option<PathBuf>,

    /// Store the scan in the results directory
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Name for the stored result
    #[arg(long, default_value = "device_scan")]
    pub name: String,

    /// Print compact JSON instead of pretty JSON
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(Subcommand)]
pub enum ResultsCommand {
    /// List stored results, newest filename first
    List {
        /// Maximum number of results to show
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print a stored result
    Show {
        /// Full id, id prefix (8+ chars) or filename
        id: String,
    },

    /// Print the digest of a stored result
    Summary {
        id: String,

        /// Output as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Delete a stored result
    Delete { id: String },

    /// Count and size of stored results
    Stats,
}

#[derive(Parser)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Parser)]
pub struct RemoteArgs {
    /// Remote service host
    #[arg(long)]
    pub host: Option<String>,

    /// Remote service port
    #[arg(long)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: RemoteCommand,
}

#[derive(Subcommand)]
pub enum RemoteCommand {
    /// Check service health
    Health,

    /// Run a scan on the remote host
    Scan {
        /// Name for the stored result
        #[arg(long, default_value = "device_scan")]
        name: String,

        /// Section to scan (full/system/cpu/memory/gpu/disk/network/process/uptime)
        #[arg(long = "type", default_value = "full")]
        scan_type: String,
    },

    /// List remote results
    List {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print a remote result
    Get { id: String },

    /// Print the digest of a remote result
    Summary { id: String },

    /// Download a remote result to a local file
    Save {
        id: String,

        /// Output file
        #[arg(long, default_value = "result.json")]
        output: PathBuf,
    },

    /// Delete a remote result
    Delete { id: String },

    /// List the scan operations offered by the remote service
    Apis,

    /// Remote result statistics
    Stats,
}
