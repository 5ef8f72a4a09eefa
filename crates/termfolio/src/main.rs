use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use termfolio::config::{self, Overrides, DEFAULT_CONFIG_FILE};
use termfolio::{Palette, Server};

#[derive(Parser)]
#[command(name = "termfolio", version, about = "Terminal portfolio over web sockets and TCP")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Address to listen on
    #[arg(long, env = "TERMFOLIO_HOST")]
    host: Option<String>,

    /// Web-socket listener port
    #[arg(long, env = "TERMFOLIO_WS_PORT")]
    ws_port: Option<u16>,

    /// Raw terminal listener port (0 disables it)
    #[arg(long, env = "TERMFOLIO_TCP_PORT")]
    tcp_port: Option<u16>,

    /// Color palette
    #[arg(long, value_enum)]
    theme: Option<Palette>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, env = "TERMFOLIO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (file, origin) = match config::load(&args.config) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("termfolio: {err}");
            return ExitCode::FAILURE;
        }
    };
    let overrides = Overrides {
        host: args.host,
        ws_port: args.ws_port,
        tcp_port: args.tcp_port,
        theme: args.theme,
        log_level: args.log_level,
        log_file: args.log_file,
    };
    let settings = match config::resolve(&file, &overrides) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("termfolio: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(settings.log_level, settings.log_file.as_deref()) {
        eprintln!("termfolio: could not set up logging: {err}");
        return ExitCode::FAILURE;
    }
    log::info!("termfolio {} starting", env!("CARGO_PKG_VERSION"));
    log::info!("{origin}");
    log::debug!("config: {file:?}");

    let server = match Server::bind(&settings).await {
        Ok(server) => server,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("could not listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
        log::info!("ctrl-c received");
    };
    match server.run(shutdown).await {
        Ok(()) => {
            log::info!("stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: LevelFilter, file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    match file {
        Some(path) => WriteLogger::init(level, log_config, File::create(path)?)?,
        None => TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto)?,
    }
    Ok(())
}
