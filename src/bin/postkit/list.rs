use std::process::ExitCode;

use anyhow::{Context, Result};
use spdlog::warn;

use postkit::config::Config;
use postkit::post::Post;
use postkit::post_list::list_post_files;
use postkit::taxonomy::Taxonomy;
use postkit::text_utils::format_date_time;

use crate::ListArgs;

fn print_counts(name: &str, counts: Vec<(String, usize)>) {
    println!();
    println!("{} ({})", name, counts.len());
    for (item, count) in counts {
        println!("  {:>4}  {}", count, item);
    }
}

pub fn list_cmd(config: &Config, args: ListArgs) -> Result<ExitCode> {
    let content_dir = &config.paths.content_dir;
    let files = list_post_files(content_dir, &config.defaults.bundle_file)
        .with_context(|| format!("Unable to list posts in {}", content_dir.display()))?;

    let mut posts = vec![];
    for file in files {
        match Post::from_file(&file) {
            Ok(post) => posts.push(post),
            Err(e) => warn!("Skipping post: {}", e),
        }
    }
    posts.retain(|post| args.drafts || !post.front_matter.is_draft());

    // Newest first, undated posts last
    posts.sort_by_cached_key(|post| std::cmp::Reverse(post.front_matter.published().ok()));

    for post in posts.iter() {
        let date = match post.front_matter.published() {
            Ok(date_time) => format_date_time(&date_time).0,
            Err(_) => "----------".to_string(),
        };
        let draft = if post.front_matter.is_draft() { " [draft]" } else { "" };
        println!("{}  {:<40}  {}{}",
                 date,
                 post.link(),
                 post.front_matter.title.as_deref().unwrap_or(""),
                 draft);
    }

    if args.tags {
        let taxonomy = Taxonomy::from_posts(&posts);
        print_counts("Tags", taxonomy.sorted_tags());
        print_counts("Categories", taxonomy.sorted_categories());
    }

    Ok(ExitCode::SUCCESS)
}
