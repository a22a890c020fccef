use std::process::ExitCode;

use anyhow::{Context, Result};
use spdlog::warn;

use postkit::post::Post;
use postkit::post_render::render_summary;

use crate::SummaryArgs;

pub fn summary_cmd(args: SummaryArgs) -> Result<ExitCode> {
    let post = Post::from_file(&args.path)
        .with_context(|| format!("Unable to open {}", args.path.display()))?;

    if post.summary().is_none() {
        warn!("{} has no <!--more--> marker, rendering the whole post", args.path.display());
    }

    let html = render_summary(&post).context("Unable to render the summary")?;
    println!("{}", html);

    Ok(ExitCode::SUCCESS)
}
