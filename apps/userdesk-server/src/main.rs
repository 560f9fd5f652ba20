use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio_util::sync::CancellationToken;

use api_ingress::{ApiIngress, ApiIngressConfig, RestModule};
use runtime::{AppConfig, CliArgs};
use users_info::{UsersInfo, UsersInfoConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Userdesk Server - user management backend
#[derive(Parser)]
#[command(name = "userdesk-server")]
#[command(about = "Userdesk Server - user management backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Start with an empty user store
    #[arg(long)]
    no_seed: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        no_seed: cli.no_seed,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Userdesk Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(&config),
    }
}

struct ModuleConfigs {
    users_info: UsersInfoConfig,
    api_ingress: ApiIngressConfig,
}

fn module_configs(config: &AppConfig) -> Result<ModuleConfigs> {
    let users_info: UsersInfoConfig = config.module_config("users_info")?;
    url::Url::parse(&users_info.random_user_base_url).with_context(|| {
        format!(
            "invalid users_info.random_user_base_url '{}'",
            users_info.random_user_base_url
        )
    })?;
    let api_ingress: ApiIngressConfig = config.module_config("api_ingress")?;
    Ok(ModuleConfigs {
        users_info,
        api_ingress,
    })
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    let ModuleConfigs {
        mut users_info,
        api_ingress,
    } = module_configs(&config)?;
    if args.no_seed {
        users_info.seed_on_start = false;
    }

    let bind_addr = api_ingress.effective_bind_addr(&config.server.host, config.server.port);

    let users = UsersInfo::new(users_info)?;
    let seeded = users.seed().await;
    tracing::info!(seeded, "user store ready");

    let ingress = ApiIngress::new(api_ingress).with_module(RestModule {
        name: "users_info",
        router: users.router(),
        openapi: users.openapi(),
    });

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let mut server = tokio::spawn({
        let cancel = cancel.clone();
        async move { ingress.serve(&bind_addr, cancel).await }
    });

    tokio::select! {
        res = &mut server => return res?,
        _ = cancel.cancelled() => {}
    }

    // server.timeout_sec bounds the drain of in-flight requests; 0 waits.
    match config.server.timeout_sec {
        0 => server.await?,
        secs => match tokio::time::timeout(Duration::from_secs(secs), server).await {
            Ok(res) => res?,
            Err(_) => {
                tracing::warn!(timeout_sec = secs, "shutdown deadline exceeded, exiting");
                Ok(())
            }
        },
    }
}

async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
    cancel.cancel();
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    module_configs(config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
