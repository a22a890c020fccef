use std::process::ExitCode;

use anyhow::{Context, Result};

use postkit::config::Config;
use postkit::lint::Linter;
use postkit::post_list::expand_paths;

use crate::{LintArgs, ReportFormat};

pub fn lint_cmd(config: &Config, args: LintArgs) -> Result<ExitCode> {
    let paths = if args.paths.is_empty() {
        vec![config.paths.content_dir.clone()]
    } else {
        args.paths
    };

    let files = expand_paths(&paths, &config.defaults.bundle_file)
        .context("Unable to list posts")?;

    let linter = Linter::new(&config.lint, config.defaults.author.clone());
    let report = linter.lint_posts(&files);

    match args.format {
        ReportFormat::Text => println!("{}", report),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
