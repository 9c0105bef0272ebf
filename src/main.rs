/// Version injected at compile time via FSX_ONTAP_TOPOLOGY_VERSION env var
/// (set by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("FSX_ONTAP_TOPOLOGY_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fsx_ontap_topology::cloud::{
    ContextFileLookup, NetworkDescription, NetworkLookup, DEFAULT_CONTEXT_FILE,
};
use fsx_ontap_topology::config::Config;
use fsx_ontap_topology::topology::DEFAULT_STACK_NAME;
use fsx_ontap_topology::{synthesize, SynthOptions, TopologyInputs};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Synthesize the FSx for ONTAP deployment template
#[derive(Parser, Debug)]
#[command(name = "fsx-ontap-topology", version, about, long_about = None)]
struct Args {
    /// Existing VPC hosting the file system
    #[arg(long)]
    vpc_id: Option<String>,

    /// DNS server of the self-managed Active Directory (repeatable or comma separated)
    #[arg(long = "dns-ip", value_delimiter = ',')]
    dns_ips: Vec<String>,

    /// Secrets Manager secret holding the AD service account bundle
    #[arg(long)]
    service_account_secret_name: Option<String>,

    /// Network context cache
    #[arg(long)]
    context: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stack name, used in construct paths and resource names
    #[arg(long)]
    stack_name: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write the template here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail when the VPC has fewer than two isolated subnets
    #[arg(long)]
    strict: bool,

    /// Resolve the VPC through the EC2 API and refresh the context cache
    #[cfg(feature = "aws")]
    #[arg(long)]
    lookup: bool,

    /// AWS region for --lookup
    #[cfg(feature = "aws")]
    #[arg(long)]
    region: Option<String>,

    /// Remember the effective inputs in the config file
    #[arg(long)]
    save_config: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
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

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

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

    tracing::info!("fsx-ontap-topology {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir
            .join("fsx-ontap-topology")
            .join("fsx-ontap-topology.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".fsx-ontap-topology").join("fsx-ontap-topology.log");
    }
    PathBuf::from("fsx-ontap-topology.log")
}

/// Inputs from CLI, then config file, then environment
fn resolve_inputs(args: &Args, config: &Config) -> Result<TopologyInputs> {
    let vpc_id = args
        .vpc_id
        .clone()
        .or_else(|| config.effective_vpc_id())
        .context("No VPC configured. Set vpcID in the config file, FSX_ONTAP_VPC_ID or use --vpc-id")?;

    let dns_ips = if args.dns_ips.is_empty() {
        config.effective_dns_ips()
    } else {
        args.dns_ips.clone()
    };

    let service_account_secret_name = args
        .service_account_secret_name
        .clone()
        .or_else(|| config.effective_service_account_secret_name())
        .context(
            "No service account secret configured. Set FSX_ONTAP_SERVICE_ACCOUNT_SECRET or use --service-account-secret-name",
        )?;

    Ok(TopologyInputs {
        vpc_id,
        dns_ips,
        service_account_secret_name,
    })
}

#[cfg(feature = "aws")]
fn live_lookup(
    args: &Args,
    context: &ContextFileLookup,
    vpc_id: &str,
) -> Result<Option<NetworkDescription>> {
    if !args.lookup {
        return Ok(None);
    }
    let network = fsx_ontap_topology::cloud::Ec2Lookup::new(args.region.clone())
        .lookup(vpc_id)
        .with_context(|| format!("Failed to look up VPC {}", vpc_id))?;
    context.store(&network)?;
    Ok(Some(network))
}

#[cfg(not(feature = "aws"))]
fn live_lookup(
    _args: &Args,
    _context: &ContextFileLookup,
    _vpc_id: &str,
) -> Result<Option<NetworkDescription>> {
    Ok(None)
}

fn resolve_network(
    args: &Args,
    context: &ContextFileLookup,
    vpc_id: &str,
) -> Result<NetworkDescription> {
    if let Some(network) = live_lookup(args, context, vpc_id)? {
        return Ok(network);
    }

    context
        .lookup(vpc_id)
        .with_context(|| format!("Failed to resolve VPC {} from {:?}", vpc_id, context.path()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let config_path = args.config.clone().or_else(Config::config_path);
    let config = config_path
        .as_deref()
        .map(Config::load_from)
        .unwrap_or_default();

    let inputs = resolve_inputs(&args, &config)?;
    tracing::info!(
        "Using VPC: {}, {} DNS address(es)",
        inputs.vpc_id,
        inputs.dns_ips.len()
    );

    let context_file = args
        .context
        .clone()
        .or_else(|| config.context_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTEXT_FILE));
    let network = resolve_network(&args, &ContextFileLookup::new(context_file), &inputs.vpc_id)?;

    let options = SynthOptions {
        stack_name: args
            .stack_name
            .clone()
            .or_else(|| config.stack_name.clone())
            .unwrap_or_else(|| DEFAULT_STACK_NAME.to_string()),
        strict: args.strict || config.strict,
    };

    let template =
        synthesize(&inputs, &network, &options).context("Failed to synthesize template")?;

    let rendered = match args.format {
        OutputFormat::Json => template.to_json()?,
        OutputFormat::Yaml => template.to_yaml()?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Template written to {:?}", path);
        }
        None => println!("{rendered}"),
    }

    if args.save_config {
        if let Some(path) = &config_path {
            let saved = Config {
                vpc_id: Some(inputs.vpc_id),
                dns_ips: Some(inputs.dns_ips),
                service_account_secret_name: Some(inputs.service_account_secret_name),
                stack_name: Some(options.stack_name),
                ..config
            };
            saved.save_to(path)?;
        }
    }

    Ok(())
}
