use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use songcat::{Error, cli, config, error, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeOptions),

    /// Rank a catalog against one of its tracks (offline)
    Similar(SimilarOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind, overrides SERVER_ADDRESS
    #[clap(long)]
    addr: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SimilarOptions {
    /// Catalog file path or http(s) URL
    #[clap(long)]
    catalog: String,

    /// Track id (or spotify:track: URI) of the reference song
    #[clap(long)]
    track_id: String,

    /// Number of songs to show
    #[clap(long, default_value_t = 10)]
    limit: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load .env file. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => {
            let config = match config::Config::from_env() {
                Ok(config) => config,
                Err(e) => error!("Invalid configuration. Err: {}", e),
            };
            if let Err(e) = cli::serve(config, opt.addr).await {
                error!("Server stopped. Err: {}", e);
            }
        }
        Command::Similar(opt) => match cli::similar(&opt.catalog, &opt.track_id, opt.limit).await {
            Ok(()) => {}
            Err(Error::NoCompatibleCandidates) => warning!("No similar song found."),
            Err(e) => error!("{}", e),
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
