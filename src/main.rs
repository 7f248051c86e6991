use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hostscan::api::{Envelope, ErrorBody, Statistics};
use hostscan::cli::{Cli, Command, RemoteArgs, RemoteCommand, ResultsCommand, ScanArgs, ServeArgs};
use hostscan::client::RemoteClient;
use hostscan::config::Config;
use hostscan::error::{Error, ErrorKind, Result};
use hostscan::report::{self, json, markdown, table};
use hostscan::scan::{self, HostSource, ScanScope};
use hostscan::server::{self, AppState};
use hostscan::store::{record, ResultStore};

// stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hostscan={default_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Io => 1,
        ErrorKind::NotFound => 3,
        ErrorKind::Validation => 4,
        ErrorKind::Transport => 5,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let config = match Config::load(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(exit_code(e.kind()));
        }
    };
    debug!(?config, "loaded config");

    let remote = matches!(cli.command, Command::Remote(_));
    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if remote {
                // remote callers get the same envelope the service speaks
                let body: Envelope<()> = Envelope::Error(ErrorBody::from_error(&e));
                match json::render(&body, false) {
                    Ok(text) => println!("{text}"),
                    Err(_) => eprintln!("error: {e}"),
                }
            } else {
                eprintln!("error: {e}");
            }
            ExitCode::from(exit_code(e.kind()))
        }
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Scan(args) => run_scan(args, config).await,
        Command::Apis => {
            print!("{}", table::render_catalog(&scan::catalog()));
            Ok(())
        }
        Command::Results(command) => run_results(command, config),
        Command::Serve(args) => run_serve(args, config).await,
        Command::Remote(args) => run_remote(args, config).await,
    }
}

async fn run_scan(args: ScanArgs, config: &Config) -> Result<()> {
    let scope: ScanScope = args.kind.parse()?;
    record::validate_name(&args.name)?;

    let result = tokio::task::spawn_blocking(move || scan::run(scope))
        .await
        .map_err(|e| Error::Task(e.to_string()))?;
    report::print_scan_info(&result, config.verbose);

    let payload = result.into_payload();

    if let Some(path) = &args.json {
        write_file(path, &json::render(&payload, args.compact)?)?;
        println!("JSON written to {}", path.display());
    }

    if let Some(path) = &args.markdown {
        let text = markdown::render(&payload, &scan::catalog(), record::now());
        write_file(path, &text)?;
        println!("Markdown report written to {}", path.display());
    }

    if args.json.is_none() && args.markdown.is_none() {
        println!("{}", json::render(&payload, args.compact)?);
    }

    if args.save {
        let store = ResultStore::open(&config.results_dir)?;
        let saved = store.save(payload, &args.name)?;
        eprintln!("saved {} as {}", saved.id, saved.storage_key);
    }

    Ok(())
}

fn run_results(command: ResultsCommand, config: &Config) -> Result<()> {
    let store = ResultStore::open(&config.results_dir)?;

    match command {
        ResultsCommand::List { limit, json: as_json } => {
            let results = store.list(limit)?;
            if as_json {
                println!("{}", json::render(&results, false)?);
            } else {
                print!("{}", table::render_results(&results));
            }
        }
        ResultsCommand::Show { id } => {
            let record = store.resolve(&id)?;
            println!("{}", json::render(&record, false)?);
        }
        ResultsCommand::Summary { id, json: as_json } => {
            let digest = store.summarize(&id)?;
            if as_json {
                println!("{}", json::render(&digest, false)?);
            } else {
                print!("{}", table::render_digest(&digest));
            }
        }
        ResultsCommand::Delete { id } => {
            let removed = store.delete(&id)?;
            println!("deleted {} ({})", removed.id, removed.storage_key);
        }
        ResultsCommand::Stats => {
            let stats = Statistics::from(store.stats()?);
            print!("{}", table::render_stats(&stats));
        }
    }

    Ok(())
}

async fn run_serve(args: ServeArgs, config: &Config) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let store = ResultStore::open(&config.results_dir)?;
    let state = AppState::new(store, HostSource, server_config.port);
    server::serve(&server_config, state).await
}

async fn run_remote(args: RemoteArgs, config: &Config) -> Result<()> {
    let mut remote_config = config.remote.clone();
    if let Some(host) = args.host {
        remote_config.host = host;
    }
    if let Some(port) = args.port {
        remote_config.port = port;
    }

    let client = RemoteClient::new(&remote_config)?;
    debug!(url = %client.base_url(), "using remote service");

    match args.command {
        RemoteCommand::Health => {
            let health = client.health().await?;
            println!("{}", json::render(&health, false)?);
        }
        RemoteCommand::Scan { name, scan_type } => {
            let created = client.scan(&name, &scan_type).await?;
            println!("{}", json::render(&Envelope::Success(created), false)?);
        }
        RemoteCommand::List { limit } => {
            let list = client.list(limit).await?;
            print!("{}", table::render_results(&list.results));
        }
        RemoteCommand::Get { id } => {
            let record = client.get_result(&id).await?;
            println!("{}", json::render(&record, false)?);
        }
        RemoteCommand::Summary { id } => {
            let digest = client.summary(&id).await?;
            print!("{}", table::render_digest(&digest));
        }
        RemoteCommand::Save { id, output } => {
            let record = client.save_result_locally(&id, &output).await?;
            info!(id = %record.id, "downloaded result");
            println!("saved {} to {}", record.storage_key, output.display());
        }
        RemoteCommand::Delete { id } => {
            let deleted = client.delete(&id).await?;
            println!("{}", deleted.message);
        }
        RemoteCommand::Apis => {
            let catalog = client.apis().await?;
            print!("{}", table::render_catalog(&catalog.apis));
        }
        RemoteCommand::Stats => {
            let stats = client.statistics().await?;
            print!("{}", table::render_stats(&stats));
        }
    }

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| Error::io("writing", path, e))
}
