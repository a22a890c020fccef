use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use spdlog::{info, warn};

use postkit::logger::configure_logger;
use postkit::new_post::PostOutput;

use crate::config::open_config;
use crate::lint::lint_cmd;
use crate::list::list_cmd;
use crate::post::post_cmd;
use crate::summary::summary_cmd;

mod config;
mod lint;
mod list;
mod post;
mod summary;

const CFG_FILE_NAME: &str = "postkit.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long = "config", global = true)]
    config_path: Option<String>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check front-matter, more markers, urls and code fences of posts
    Lint(LintArgs),
    /// Create a new post
    New(PostArgs),
    /// List posts, newest first
    List(ListArgs),
    /// Print the HTML summary of a post, as shown in post lists
    Summary(SummaryArgs),
}

#[derive(Parser, Debug)]
struct LintArgs {
    /// Post files or directories. Defaults to the configured content directory
    paths: Vec<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    /// One line per issue, followed by a summary line
    Text,
    /// The whole report as JSON
    Json,
}

#[derive(Parser, Debug)]
struct PostArgs {
    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// Name of the author. If empty, the configured author or the OS user real name is used
    #[arg(short, long)]
    author: Option<String>,

    /// Post generation options
    #[arg(short, long, value_enum, default_value_t = PostOutput::Stdout)]
    output: PostOutput,

    /// Use TOML front-matter instead of the configured format
    #[arg(long)]
    toml: bool,

    /// Directory to create the post in. Defaults to the configured content directory
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Include drafts
    #[arg(long)]
    drafts: bool,

    /// Also print tag and category counts
    #[arg(long)]
    tags: bool,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    /// Post file
    path: PathBuf,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    let (config, config_path) = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run postkit --help");
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Err(err) = configure_logger(config.log.as_ref(), args.verbose) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    match config_path {
        Some(path) => info!("Configuration read from {}", path.display()),
        None => info!("No configuration found, using defaults"),
    }

    match args.command {
        Command::Lint(args) => lint_cmd(&config, args),
        Command::New(args) => post_cmd(&config, args),
        Command::List(args) => list_cmd(&config, args),
        Command::Summary(args) => summary_cmd(args),
    }
}
