use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docs_lint::images::{self, OptimizeOptions};
use docs_lint::og::{self, GenerateOptions};
use docs_lint::{LintContext, LintOptions, find_root, install_pre_push_hook, load_config, print_check_list};
use std::path::PathBuf;
use std::process::ExitCode;

/// Lint a markdown documentation tree.
///
/// Without a subcommand, runs every enabled check and exits non-zero when an
/// error-severity check finds issues.
#[derive(Parser)]
#[command(name = "docs-lint", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Project root (default: nearest ancestor with docs-lint.yaml or .git)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Run a single check by id
    #[arg(long, value_name = "ID")]
    check: Option<String>,

    /// List available checks and exit
    #[arg(long)]
    list: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Install a git pre-push hook that runs docs-lint
    #[arg(long)]
    install_hook: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Audit or convert raster images in the assets directory
    Images {
        #[command(subcommand)]
        action: ImagesCommand,
    },
    /// Social preview cards
    Og {
        #[command(subcommand)]
        action: OgCommand,
    },
}

#[derive(Subcommand)]
enum ImagesCommand {
    /// Report heavy and non-WebP images
    Check,
    /// Convert PNG/JPG/GIF to WebP and update markdown references
    Optimize {
        /// Show what would change without modifying files
        #[arg(long)]
        dry_run: bool,
        /// Keep original files after conversion
        #[arg(long)]
        keep_originals: bool,
        /// Downscale wider images to this width in px
        #[arg(long, default_value_t = images::DEFAULT_MAX_WIDTH)]
        max_width: u32,
    },
}

#[derive(Subcommand)]
enum OgCommand {
    /// Generate a card for every navigation page
    Generate {
        /// Only pages changed since the previous commit
        #[arg(long)]
        diff: bool,
        /// Show what would be generated
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn resolve_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.root {
        Some(root) => Ok(root.clone()),
        None => {
            let cwd = std::env::current_dir().context("reading current directory")?;
            Ok(find_root(&cwd))
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    if cli.list {
        print_check_list();
        return Ok(false);
    }

    let root = resolve_root(&cli)?;
    log::debug!("root: {}", root.display());

    if cli.install_hook {
        let path = install_pre_push_hook(&root)?;
        println!("\u{2713} Installed pre-push hook at {}", path.display());
        return Ok(false);
    }

    match cli.command {
        None => docs_lint::run(
            &root,
            &LintOptions {
                only: cli.check,
                json: cli.json,
            },
        ),
        Some(Command::Images { action }) => {
            let config = load_config(&root).config;
            let assets_dir = root.join(&config.assets_dir);
            match action {
                ImagesCommand::Check => {
                    images::check_unoptimized(&assets_dir);
                }
                ImagesCommand::Optimize {
                    dry_run,
                    keep_originals,
                    max_width,
                } => {
                    let options = OptimizeOptions {
                        dry_run,
                        keep_originals,
                        max_width,
                    };
                    images::optimize(&assets_dir, &root.join(&config.docs_dir), &options)?;
                }
            }
            Ok(false)
        }
        Some(Command::Og {
            action: OgCommand::Generate { diff, dry_run },
        }) => {
            let ctx = LintContext::new(&root, load_config(&root).config);
            og::generate(
                &ctx,
                &GenerateOptions {
                    dry_run,
                    diff_only: diff,
                },
            )?;
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
