use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::documents::{parse_document, EvolutionChainDocument};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, TableKind};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings, SourceKind};
use crate::domain::evolution::{resolve, to_tree};
use crate::domain::{MoveRecord, PokemonRecord, TypeRecord};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let config = cli.config.as_deref();
    match &cli.command {
        Some(Commands::Ingest {
            kind,
            from,
            to,
            mirror,
            output,
        }) => _ingest(config, *kind, *from, *to, mirror.as_deref(), output.as_deref()),
        Some(Commands::Chain { file, species }) => _chain(file, species.as_deref()),
        Some(Commands::Record { id, kind, mirror }) => {
            _record(config, *id, *kind, mirror.as_deref())
        }
        Some(Commands::Config { command }) => _config(config, command),
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Ok(()),
    }
}

fn load_settings(config: Option<&Path>, mirror: Option<&Path>) -> CliResult<Settings> {
    let mut settings = Settings::load(config).map_err(InfraError::from)?;
    if let Some(dir) = mirror {
        settings.source = SourceKind::Mirror;
        settings.mirror_dir = Some(dir.to_path_buf());
    }
    Ok(settings)
}

/// Table file of `kind` in `settings`.
fn table_path(settings: &mut Settings, kind: TableKind) -> &mut PathBuf {
    match kind {
        TableKind::Pokemon => &mut settings.output,
        TableKind::Moves => &mut settings.move_output,
        TableKind::Types => &mut settings.type_output,
    }
}

#[instrument]
fn _ingest(
    config: Option<&Path>,
    kind: TableKind,
    from: Option<u32>,
    to: Option<u32>,
    mirror: Option<&Path>,
    output_file: Option<&Path>,
) -> CliResult<()> {
    let mut settings = load_settings(config, mirror)?;
    if let Some(first) = from {
        settings.first_id = first;
    }
    if let Some(last) = to {
        settings.last_id = last;
    }
    if let Some(file) = output_file {
        *table_path(&mut settings, kind) = file.to_path_buf();
    }
    settings
        .validate()
        .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    let path = table_path(&mut settings, kind).clone();
    debug!("ingesting {:?} into {}", kind, path.display());

    let container = ServiceContainer::new(settings)?;
    let service = container.ingest_service();
    let report = match kind {
        TableKind::Pokemon => {
            let ids = container.settings.first_id..=container.settings.last_id;
            let mut store = container.open_store::<PokemonRecord>(&path)?;
            service.populate(&mut store, ids)
        }
        TableKind::Moves => {
            let mut store = container.open_store::<MoveRecord>(&path)?;
            service.populate_moves(&mut store)
        }
        TableKind::Types => {
            let mut store = container.open_store::<TypeRecord>(&path)?;
            service.populate_types(&mut store)
        }
    }
    .map_err(InfraError::from)?;

    output::header(&format!("Ingested into {}", path.display()));
    output::tally(report.added, "added", false);
    output::tally(report.failed, "failed", true);
    output::tally(report.total, "total", false);
    Ok(())
}

#[instrument]
fn _chain(file: &Path, species: Option<&str>) -> CliResult<()> {
    let fs = RealFileSystem;
    let body = fs
        .read_to_string(file)
        .map_err(|e| InfraError::io(format!("read {}", file.display()), e))?;
    let url = file.display().to_string();
    let doc: EvolutionChainDocument = parse_document(&url, &body).map_err(InfraError::from)?;
    let root = doc.chain.to_node();

    let tree = to_tree(&root).map_err(|e| InfraError::from(ApplicationError::from(e)))?;
    output::info(&tree);

    if let Some(name) = species {
        match resolve(&root, name) {
            Ok(Some(info)) => output::stage(name, info.stage, info.is_fully_evolved),
            Ok(None) => output::warning(&format!("{} not found in chain", name)),
            Err(e) => return Err(InfraError::from(ApplicationError::from(e)).into()),
        }
    }
    Ok(())
}

#[instrument]
fn _record(config: Option<&Path>, id: u32, kind: TableKind, mirror: Option<&Path>) -> CliResult<()> {
    let settings = load_settings(config, mirror)?;
    let container = ServiceContainer::new(settings)?;
    let service = container.ingest_service();
    let json = match kind {
        TableKind::Pokemon => to_json(&service.fetch_record(id).map_err(InfraError::from)?),
        TableKind::Moves => to_json(&service.fetch_move(id).map_err(InfraError::from)?),
        TableKind::Types => to_json(&service.fetch_type(id).map_err(InfraError::from)?),
    }?;
    output::info(&json);
    Ok(())
}

fn to_json(record: &impl serde::Serialize) -> CliResult<String> {
    serde_json::to_string_pretty(record).map_err(|e| {
        InfraError::io("serialize record", io::Error::new(io::ErrorKind::Other, e)).into()
    })
}

fn _config(config: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config).map_err(InfraError::from)?;
            let toml = settings.to_toml().map_err(InfraError::from)?;
            output::info(&toml);
            Ok(())
        }
        ConfigCommands::Path => {
            let show = |label: &str, path: &Path| {
                let marker = if path.exists() { "" } else { " (not found)" };
                output::field(label, &format!("{}{}", path.display(), marker));
            };
            match global_config_path() {
                Some(path) => show("Global", &path),
                None => output::warning("no config directory for this platform"),
            }
            let local = config.map(Path::to_path_buf).unwrap_or_else(local_config_path);
            show("Local", &local);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path: PathBuf = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no config directory for this platform".into()))?
            } else {
                config.map(Path::to_path_buf).unwrap_or_else(local_config_path)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config file already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .and_then(|_| fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
