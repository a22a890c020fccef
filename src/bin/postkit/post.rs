use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;

use postkit::config::Config;
use postkit::front_matter::FrontMatterFormat;
use postkit::new_post::NewPost;
use postkit::util::os_helper::resolve_author;

use crate::PostArgs;

pub fn post_cmd(config: &Config, args: PostArgs) -> Result<ExitCode> {
    let author = resolve_author(args.author.as_deref(), config.defaults.author.as_deref());
    let format = if args.toml {
        FrontMatterFormat::Toml
    } else {
        config.defaults.format
    };

    let new_post = NewPost {
        title: args.title,
        author,
        date: Local::now().fixed_offset(),
        format,
        more_link: config.defaults.more_link.clone(),
    };

    let content_dir = args.out_dir.unwrap_or_else(|| config.paths.content_dir.clone());
    let created = new_post.write(&content_dir, args.output, &config.defaults.bundle_file)
        .context("Unable to create the post")?;

    if let Some(path) = created {
        println!("Created post {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}
