//! CLI command implementations
//!
//! `run` wires configuration, logging, and a ZooKeeper session into a
//! [`MutationPipeline`]; `execute` dispatches one command against any
//! [`StoreClient`], which is how the commands are tested.

use crate::backup::BackupStore;
use crate::codec::MessageCodec;
use crate::observability::{log_event, Event, Logger};
use crate::pipeline::{render_listing, Console, MutationPipeline};
use crate::store::{Namespace, StoreClient, ZkStore};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_local_input, write_local_output, TerminalConsole};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let logger = Logger::for_verbosity(cli.verbose);

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    config.apply_flags(&cli.servers);
    config.validate()?;

    let service = cli
        .service
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(CliError::missing_service)?;

    let servers = config.servers.join(",");
    log_event(
        &logger,
        Event::ConfigLoaded,
        &[("servers", servers.as_str()), ("service", service.as_str())],
    );

    let store = ZkStore::connect(&config.servers, config.session_timeout(), &logger)
        .map_err(CliError::connect_failed)?;
    let pipeline = build_pipeline(store, &config, &service, logger)?;

    let mut console = TerminalConsole::stdio();
    execute(&pipeline, cli.command, &mut console)
}

/// Assemble a pipeline for `service` over `store`
pub fn build_pipeline<S: StoreClient>(
    store: S,
    config: &Config,
    service: &str,
    logger: Logger,
) -> CliResult<MutationPipeline<S>> {
    let codec = MessageCodec::mesos()?;
    let backups = BackupStore::new(config.backup_config(), logger.clone());
    Ok(MutationPipeline::new(
        store,
        Namespace::new(&config.namespace_prefix, service),
        codec,
        backups,
        logger,
    ))
}

/// Run one command
///
/// An absent node on `get`, and a declined confirmation, both succeed.
pub fn execute<S: StoreClient>(
    pipeline: &MutationPipeline<S>,
    command: Command,
    console: &mut dyn Console,
) -> CliResult<()> {
    match command {
        Command::List { recursive, path } => {
            let entries = pipeline.list(path.as_deref().unwrap_or(""), recursive)?;
            console.print(&render_listing(&entries))?;
        }
        Command::Get {
            format,
            path,
            localfile,
        } => match pipeline.get(&path, format.into())? {
            None => {
                console.println(&format!(
                    "Node {} does not exist.",
                    pipeline.namespace().resolve(&path)
                ))?;
            }
            Some(snapshot) => match localfile {
                Some(file) => {
                    write_local_output(&file, &snapshot.export)?;
                    console.println(&format!(
                        "Wrote {} bytes from {} to {}.",
                        snapshot.export.len(),
                        snapshot.path,
                        file.display()
                    ))?;
                    if snapshot.lossy {
                        console.println(&format!(
                            "Warning: {} has fields this tool does not model. The file omits them and cannot be written back.",
                            snapshot.path
                        ))?;
                    }
                }
                None => console.emit(&snapshot.export)?,
            },
        },
        Command::Set {
            force,
            format,
            path,
            localfile,
        } => {
            let local = read_local_input(localfile.as_deref())?;
            pipeline.put(&path, &local, format.into(), force, console)?;
        }
        Command::Delete { force, path } => {
            pipeline.delete(&path, force, console)?;
        }
    }
    Ok(())
}
