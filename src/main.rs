use clap::{Parser, Subcommand};
use simple_press::{config, maintenance, render, server};
use simple_press::{server::AppState, store::Store};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "simple-press")]
#[command(about = "Minimal article publisher with static page snapshots")]
#[command(long_about = "\
Minimal article publisher with static page snapshots

Articles and comments live in a SQLite database inside the data root;
every article also has a directory holding its uploaded media file and a
static index.html snapshot, rewritten on every new comment.

Data root layout:

  data/
  ├── articles.db              # The store (articles + comments)
  ├── config.toml              # Site config (optional)
  ├── style.css                # Installed at startup, referenced by all pages
  ├── 1/
  │   ├── index.html           # Static snapshot of article 1
  │   └── board.png            # Its uploaded media, if any
  └── 2/
      └── index.html

The server exposes the listing page at /, takes new articles as multipart
POSTs to /, and comments as POSTs to /comment?id=N. Snapshots and media
are served straight off disk.

Run 'simple-press gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Data root: database, stylesheet, one directory per article
    #[arg(long, default_value = "data", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the publishing server
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Regenerate every article snapshot from the store
    Rebuild,
    /// Validate the data root against the store without changing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port } => {
            std::fs::create_dir_all(&cli.root)?;
            let mut settings = config::load_settings(&cli.root)?;
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }

            let store = Store::open(&cli.root.join("articles.db")).await?;
            render::install_stylesheet(&cli.root)?;

            let addr = SocketAddr::new(settings.host.parse::<IpAddr>()?, settings.port);
            let state = Arc::new(AppState::new(store, settings, cli.root.clone()));
            server::serve(state, addr).await?;
        }
        Command::Rebuild => {
            std::fs::create_dir_all(&cli.root)?;
            let store = Store::open(&cli.root.join("articles.db")).await?;
            render::install_stylesheet(&cli.root)?;
            let count = maintenance::rebuild_all(&store, &cli.root).await?;
            println!("Regenerated {count} snapshots in {}", cli.root.display());
        }
        Command::Check => {
            let store = Store::open(&cli.root.join("articles.db")).await?;
            println!("==> Checking {}", cli.root.display());
            let problems = maintenance::check(&store, &cli.root).await?;
            if problems.is_empty() {
                println!("==> Data root is consistent");
            } else {
                for problem in &problems {
                    println!("{problem}");
                }
                return Err(format!("{} problem(s) found", problems.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
