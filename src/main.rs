use std::path::PathBuf;
use std::process::{Command, ExitCode};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use oclink::config::Config;
use oclink::handler;
use oclink::resolver::{self, UrlStyle};

/// Translate ownCloud share URLs to local file paths and back.
///
/// A URL argument (owncloud+https://..., https://...) is resolved to the
/// local path of the synchronized file; a path argument is resolved to a
/// share URL. Prints the result, or runs a command on it with --run.
#[derive(Parser, Debug)]
#[command(name = "oclink", version)]
struct Cli {
    /// URL to turn into a local path, or local path to turn into a URL
    url_or_path: Option<String>,

    /// Output URL style for the path-to-URL direction
    #[arg(long, value_enum, default_value_t = StyleArg::Webdav)]
    style: StyleArg,

    /// Run CMD with the result as its first argument instead of printing it
    #[arg(long, value_name = "CMD")]
    run: Option<String>,

    /// Read this ownCloud configuration file instead of the default one
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Register this binary as the session URL handler for owncloud+ URLs
    #[arg(long)]
    register_url_handler: bool,

    /// Remove the URL handler registration again
    #[arg(long)]
    unregister_url_handler: bool,

    /// Output debug messages
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Webdav,
    Webclient,
}

impl From<StyleArg> for UrlStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Webdav => UrlStyle::Webdav,
            StyleArg::Webclient => UrlStyle::WebClient,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.unregister_url_handler {
        handler::unregister(None)?;
    }
    if cli.register_url_handler {
        handler::register(None)?;
    }

    let Some(input) = cli.url_or_path else {
        return Ok(ExitCode::SUCCESS);
    };

    let config = Config::load(cli.config.as_deref());

    match resolver::resolve_either(&config, &input, cli.style.into()) {
        Some(resolved) => match cli.run {
            Some(command) => {
                let status = Command::new(&command)
                    .arg(&resolved)
                    .status()
                    .with_context(|| format!("failed to run {command}"))?;
                Ok(if status.success() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            None => {
                println!("{resolved}");
                Ok(ExitCode::SUCCESS)
            }
        },
        None => {
            eprintln!("no match for {input}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
