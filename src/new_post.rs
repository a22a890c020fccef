use std::fmt::Write as _;
use std::fs::{create_dir_all, OpenOptions};
use std::io;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use clap::ValueEnum;
use spdlog::info;

use crate::front_matter::{FrontMatter, FrontMatterError, FrontMatterFormat};
use crate::text_utils::slugify;

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum PostOutput {
    /// Writes the new post content to the stdout
    Stdout,
    /// Writes the new post to `<slug>.md` (posts without images)
    File,
    /// Writes the new post to `<slug>/index.md` (page bundle, posts with images)
    Dir,
}

pub struct NewPost {
    pub title: String,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub format: FrontMatterFormat,
    pub more_link: String,
}

impl NewPost {
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    pub fn url(&self) -> String {
        format!("/{}/", self.slug())
    }

    pub fn front_matter(&self) -> FrontMatter {
        FrontMatter {
            title: Some(self.title.clone()),
            date: Some(self.date.to_rfc3339_opts(SecondsFormat::Secs, false)),
            draft: Some(true),
            tags: Some(vec![]),
            categories: Some(vec![]),
            author: Some(self.author.clone()),
            description: Some(String::new()),
            more_link: Some(self.more_link.clone()),
            url: Some(self.url()),
            ..Default::default()
        }
    }

    pub fn render(&self) -> Result<String, FrontMatterError> {
        let header = self.front_matter().render(self.format)?;
        Ok(format!("{}\n{}", header, render_body()))
    }

    /// Where the post goes for `output`, `None` for stdout.
    pub fn target(&self, content_dir: &Path, output: PostOutput, bundle_file: &str) -> Option<PathBuf> {
        match output {
            PostOutput::Stdout => None,
            PostOutput::File => Some(content_dir.join(format!("{}.md", self.slug()))),
            PostOutput::Dir => Some(content_dir.join(self.slug()).join(bundle_file)),
        }
    }

    /// Writes the post to a new file. Existing posts are never overwritten.
    pub fn write(&self, content_dir: &Path, output: PostOutput, bundle_file: &str) -> io::Result<Option<PathBuf>> {
        if self.slug().is_empty() {
            return Err(io::Error::new(ErrorKind::InvalidInput, "Title must contain letters or digits"));
        }

        let content = self.render()
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;

        let Some(path) = self.target(content_dir, output, bundle_file) else {
            println!("{}", content);
            return Ok(None);
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)
            .map_err(|e| io::Error::new(e.kind(), format!("Unable to create {}: {}", path.display(), e)))?;
        file.write_all(content.as_bytes())?;

        info!("Created post {}", path.display());
        Ok(Some(path))
    }
}

fn render_body() -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "<!--more-->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "And this is the rest of your post");

    buf
}
