//! # `tidy`
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tidy cleanup` | Interactive MongoDB database cleanup |
//! | `tidy view <FILES>...` | Print the combined text of the given files |
//! | `tidy view --folder <DIR>` | Print the combined text of every file under a folder |
//! | `tidy serve` | Start the browser file viewer |
//!
//! ## Examples
//!
//! ```bash
//! # Inspect and drop databases (prompts for the connection string)
//! tidy cleanup
//!
//! # Concatenate a folder into file_contents.txt and an HTML page
//! tidy view --folder ./notes --out file_contents.txt --html view.html
//!
//! # Browser viewer on the configured address
//! tidy serve --config ./config/tidy.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use store_tidy::config;
use store_tidy::progress::ProgressMode;
use store_tidy::view::{Selection, ViewOutput};
use store_tidy::{cleanup, logging, prompt, server, session, view};

/// Interactive MongoDB cleanup and a folder/upload text viewer.
#[derive(Parser)]
#[command(name = "tidy", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/tidy.toml`. A missing file means built-in
    /// defaults.
    #[arg(long, global = true, default_value = "./config/tidy.toml")]
    config: PathBuf,

    /// Log debug diagnostics to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively inspect and drop MongoDB databases.
    ///
    /// Prompts for the connection string, lists databases, and drops a
    /// database only after `yes` and the exact database name are entered.
    Cleanup,

    /// Show the combined text of selected files or a folder.
    View {
        /// Files to read directly. Each is decoded once as UTF-8.
        #[arg(conflicts_with = "folder")]
        files: Vec<PathBuf>,

        /// Folder to walk recursively instead of explicit files.
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Write the combined text here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write an HTML page with copy and download controls.
        #[arg(long)]
        html: Option<PathBuf>,

        /// Progress on stderr. Defaults to `human` on a TTY, `off` otherwise.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Start the browser file viewer on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Cleanup => {
            let mut prompter = prompt::stdio();
            cleanup::print_banner(&mut prompter)?;

            let catalog = match session::connect_mongo(&cfg.store, &mut prompter).await {
                Ok(catalog) => catalog,
                Err(e) if e.is_fatal() => {
                    println!("{}", e);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            cleanup::run_cleanup(&catalog, &mut prompter, &cfg.store.reserved).await?;
        }
        Commands::View {
            files,
            folder,
            out,
            html,
            progress,
        } => {
            let selection = match folder {
                Some(root) => Selection::Folder(root),
                None => Selection::Files(files),
            };
            let output = ViewOutput { text: out, html };
            let progress = progress.unwrap_or_else(ProgressMode::default_for_tty);
            view::run_view(&cfg, &selection, &output, progress)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
