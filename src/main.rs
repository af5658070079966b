use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use openstack_inventory::progress::{self, ProgressGauge};
use openstack_inventory::resource::{
    get_all_resource_keys, ImageListOpts, NetworkListOpts, ProjectListOpts, SubnetListOpts, VmListOpts, VolumeListOpts,
};
use openstack_inventory::{AuthConfig, ListFilter, ResourceKind, Session};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Version injected at compile time via OSINV_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("OSINV_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Read-only OpenStack inventory
#[derive(Parser, Debug)]
#[command(name = "osinv", version, about, long_about = None)]
struct Args {
    /// Identity endpoint (overrides the secret file's url)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Secret file with the authentication values
    #[arg(long, global = true)]
    secret: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every resource of a kind
    List {
        kind: ResourceKind,
        /// Name constraint, for kinds that accept one
        #[arg(long)]
        name: Option<String>,
    },
    /// Get one resource by ID
    Get { kind: ResourceKind, id: String },
    /// Print the supported resource kinds
    Kinds,
    /// Read transfer progress lines from stdin and report bytes transferred
    TrackProgress { resource_id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("osinv {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("osinv").join("osinv.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".osinv").join("osinv.log");
    }
    PathBuf::from("osinv.log")
}

fn load_config(args: &Args) -> Result<AuthConfig> {
    let path = match &args.secret {
        Some(path) => path.clone(),
        None => AuthConfig::default_path().context("No config directory; use --secret")?,
    };
    let mut config =
        AuthConfig::load(&path).with_context(|| format!("Failed to load secret {}", path.display()))?;

    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if config.url.is_empty() {
        anyhow::bail!("No identity endpoint configured. Set url in the secret file or use --url");
    }
    Ok(config)
}

/// Build the list filter for the `--name` flag
fn name_filter(kind: ResourceKind, name: Option<String>) -> Result<ListFilter> {
    let Some(name) = name else {
        return Ok(ListFilter::All);
    };
    let filter = match kind {
        ResourceKind::Project => ListFilter::Project(ProjectListOpts {
            name,
            ..Default::default()
        }),
        ResourceKind::Vm => ListFilter::Vm(VmListOpts {
            name,
            ..Default::default()
        }),
        ResourceKind::Image => ListFilter::Image(ImageListOpts {
            name,
            ..Default::default()
        }),
        ResourceKind::Volume => ListFilter::Volume(VolumeListOpts {
            name,
            ..Default::default()
        }),
        ResourceKind::Network => ListFilter::Network(NetworkListOpts {
            name,
            ..Default::default()
        }),
        ResourceKind::Subnet => ListFilter::Subnet(SubnetListOpts {
            name,
            ..Default::default()
        }),
        other => anyhow::bail!("{} listings cannot be filtered by name", other),
    };
    Ok(filter)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    match &args.command {
        Command::Kinds => {
            for key in get_all_resource_keys() {
                println!("{}", key);
            }
        },
        Command::TrackProgress { resource_id } => {
            let gauge = ProgressGauge::new();
            let stdin = BufReader::new(tokio::io::stdin());
            let last = progress::track_progress(stdin, resource_id, &gauge).await?;
            println!("{}", serde_json::to_string_pretty(&last)?);
            if let Some(percent) = last.as_ref().and_then(|progress| progress.percent()) {
                eprintln!("{}: {:.1}% transferred", resource_id, percent);
            }
        },
        Command::List { kind, name } => {
            let filter = name_filter(*kind, name.clone())?;
            let config = load_config(&args)?;
            let session = Session::connect(&config).await.context("Failed to connect")?;
            let resources = session.list(*kind, &filter).await?;
            tracing::info!("Listed {} {} resources", resources.len(), kind);
            println!("{}", serde_json::to_string_pretty(&resources)?);
        },
        Command::Get { kind, id } => {
            let config = load_config(&args)?;
            let session = Session::connect(&config).await.context("Failed to connect")?;
            let resource = session.get(*kind, id).await?;
            println!("{}", serde_json::to_string_pretty(&resource)?);
        },
    }

    Ok(())
}
