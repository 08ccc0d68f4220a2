use clap::{Parser, Subcommand};
use filters::{
    DashboardFilter, DashboardId, FilterDefinition, FilterError, FilterId, FilterResource,
    RemoteError,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod config;
mod telemetry;

use config::Config;
use telemetry::TelemetryError;

#[derive(Parser)]
#[command(name = "filterctl", about = "Manage native filters of dashboards")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short, default_value = "filterctl.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print every native filter of a dashboard
    List {
        #[arg(long)]
        dashboard: DashboardId,
    },
    /// Print one filter. With --known-config, an equivalent stored config is
    /// printed using the known text.
    Get {
        #[arg(long)]
        dashboard: DashboardId,
        #[arg(long)]
        id: String,
        #[arg(long)]
        known_config: Option<PathBuf>,
    },
    /// Add a filter under a new id
    Create {
        #[arg(long)]
        dashboard: DashboardId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        config_file: PathBuf,
    },
    /// Replace a filter, optionally moving it from another dashboard
    Update {
        #[arg(long)]
        dashboard: DashboardId,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        config_file: PathBuf,
        #[arg(long)]
        from_dashboard: Option<DashboardId>,
    },
    /// Remove a filter
    Delete {
        #[arg(long)]
        dashboard: DashboardId,
        #[arg(long)]
        id: String,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("{0}")]
    Telemetry(#[from] TelemetryError),
    #[error("could not create client: {0}")]
    Client(#[from] RemoteError),
    #[error("{0}")]
    Filter(#[from] FilterError),
    #[error("could not read {}: {}", .path.display(), .source)]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("dashboard {dashboard_id} has no filter with id {filter_id}")]
    NotFound {
        dashboard_id: DashboardId,
        filter_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry = telemetry::init_logging(config.logging.as_ref());

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "filterctl failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: CliCommand, config: Config) -> Result<(), CliError> {
    telemetry::init_metrics(config.metrics.as_ref())?;
    let resource = filters::from_config(&config.filters)?;

    match command {
        CliCommand::List { dashboard } => {
            print_json(&resource.list(dashboard).await?)?;
        }
        CliCommand::Get {
            dashboard,
            id,
            known_config,
        } => {
            let filter = get(&resource, dashboard, id.into(), known_config.as_deref()).await?;
            print_json(&filter)?;
        }
        CliCommand::Create {
            dashboard,
            name,
            config_file,
        } => {
            let definition = FilterDefinition::new(name, read_file(&config_file)?);
            print_json(&resource.create(dashboard, definition).await?)?;
        }
        CliCommand::Update {
            dashboard,
            id,
            name,
            config_file,
            from_dashboard,
        } => {
            let definition = FilterDefinition::new(name, read_file(&config_file)?);
            let state = DashboardFilter {
                id: id.into(),
                dashboard_id: from_dashboard.unwrap_or(dashboard),
                name: definition.name.clone(),
                config: definition.config.clone(),
            };
            print_json(&resource.update(&state, dashboard, definition).await?)?;
        }
        CliCommand::Delete { dashboard, id } => {
            let state = DashboardFilter {
                id: id.into(),
                dashboard_id: dashboard,
                name: String::new(),
                config: String::new(),
            };
            resource.delete(&state).await?;
        }
    }

    Ok(())
}

async fn get(
    resource: &FilterResource,
    dashboard_id: DashboardId,
    filter_id: FilterId,
    known_config: Option<&Path>,
) -> Result<DashboardFilter, CliError> {
    let found = match known_config {
        Some(path) => {
            let state = DashboardFilter {
                id: filter_id.clone(),
                dashboard_id,
                name: String::new(),
                config: read_file(path)?,
            };
            resource.read(&state).await?
        }
        None => resource.engine().get_by_id(dashboard_id, &filter_id).await?,
    };

    found.ok_or_else(|| CliError::NotFound {
        dashboard_id,
        filter_id: filter_id.to_string(),
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
