use std::fmt::Formatter;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use fmt::Display;
use lazy_static::lazy_static;
use regex::Regex;

use crate::code_fence;
use crate::front_matter::{self, FrontMatter, FrontMatterError, FrontMatterFormat};

lazy_static! {
    // Also matches spaced forms, which site generators do not split on
    static ref MORE_REGEX: Regex = Regex::new(r"<!--[ \t]*more[ \t]*-->").unwrap();
}

pub const MORE_MARKER: &str = "<!--more-->";

pub const BUNDLE_FILE: &str = "index.md";

pub struct Post {
    pub file_path: PathBuf,
    pub format: FrontMatterFormat,
    pub front_matter: FrontMatter,
    pub block: String,
    /// 1-based line of the first front-matter line
    pub block_line: usize,
    pub body: String,
    /// 1-based line of the first body line
    pub body_line: usize,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "file={}, format={}, url={}, title={}",
               self.file_path.display(),
               self.format,
               self.front_matter.url.as_deref().unwrap_or(""),
               self.front_matter.title.as_deref().unwrap_or(""),
        )
    }
}

/// Example of post
/// ---
/// title: "Kubernetes Backup and Disaster Recovery"
/// date: 2023-05-01T10:00:00+08:00
/// url: "/kubernetes-backup-dr/"
/// ---
///
/// Summary paragraph.
///
/// <!--more-->
impl Post {
    pub fn from_file(file_path: &Path) -> io::Result<Post> {
        let raw = fs::read_to_string(file_path)?;

        Self::from_string(file_path, &raw).map_err(|e| {
            io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", e, file_path.display()))
        })
    }

    pub fn from_string(file_path: &Path, raw: &str) -> Result<Post, FrontMatterError> {
        let (front_matter, raw) = front_matter::parse(raw)?;

        Ok(Post {
            file_path: file_path.to_path_buf(),
            format: raw.format,
            front_matter,
            block: raw.block.to_string(),
            block_line: raw.block_line,
            body: raw.body.to_string(),
            body_line: raw.body_line,
        })
    }

    // Byte offset, body line and exactness of every more marker outside code blocks
    fn more_marker_positions(&self) -> Vec<(usize, usize, bool)> {
        let fences = code_fence::scan(&self.body);

        MORE_REGEX.find_iter(&self.body)
            .map(|m| {
                let line = self.body[..m.start()].matches('\n').count() + 1;
                (m.start(), line, m.as_str() == MORE_MARKER)
            })
            .filter(|(_, line, _)| !fences.iter().any(|f| f.contains(*line)))
            .collect()
    }

    /// File lines of every `<!--more-->` marker.
    pub fn more_markers(&self) -> Vec<usize> {
        self.more_marker_positions()
            .into_iter()
            .filter(|(_, _, exact)| *exact)
            .map(|(_, line, _)| self.file_line(line))
            .collect()
    }

    /// File lines of markers written with spaces, like `<!-- more -->`.
    pub fn spaced_more_markers(&self) -> Vec<usize> {
        self.more_marker_positions()
            .into_iter()
            .filter(|(_, _, exact)| !*exact)
            .map(|(_, line, _)| self.file_line(line))
            .collect()
    }

    /// The body before the first `<!--more-->` marker, if the post has one.
    pub fn summary(&self) -> Option<&str> {
        self.more_marker_positions()
            .into_iter()
            .find(|(_, _, exact)| *exact)
            .map(|(start, _, _)| &self.body[..start])
    }

    /// Converts a body line into a file line.
    pub fn file_line(&self, body_line: usize) -> usize {
        body_line + self.body_line - 1
    }

    /// File line where `key` is declared in the front-matter.
    pub fn key_line(&self, key: &str) -> Option<usize> {
        self.block.lines()
            .position(|line| {
                let Some(rest) = line.strip_prefix(key) else {
                    return false;
                };
                let rest = rest.trim_start();
                rest.starts_with(':') || rest.starts_with('=')
            })
            .map(|idx| idx + self.block_line)
    }

    /// The name the post is published under: last segment of `url`, or the file name.
    pub fn link(&self) -> String {
        let from_url = self.front_matter.url.as_deref()
            .and_then(|url| url.split('/').filter(|s| !s.trim().is_empty()).last());

        match from_url {
            Some(link) => link.trim().to_string(),
            None => link_from_path(&self.file_path).unwrap_or_default(),
        }
    }
}

fn link_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if file_name == BUNDLE_FILE {
        // Page bundle, the directory carries the name
        let dir = path.parent()?.file_name()?;
        return Some(dir.to_str()?.to_string());
    }
    Some(path.file_stem()?.to_str()?.to_string())
}

#[cfg(test)]
mod tests {
    use crate::test_data::{POST_DATA_TOML, POST_DATA_YAML};

    use super::*;

    #[test]
    fn test_from_string() {
        let file_name = PathBuf::from("blog/content/post/kubernetes-backup-dr.md");
        let post = Post::from_string(&file_name, POST_DATA_YAML).unwrap();
        println!("{}", post);
        assert_eq!(post.format, FrontMatterFormat::Yaml);
        assert_eq!(post.body_line, 12);
        assert!(post.body.contains("## Installing Velero"));
    }

    #[test]
    fn test_summary() {
        let file_name = PathBuf::from("blog/content/post/kubernetes-backup-dr.md");
        let post = Post::from_string(&file_name, POST_DATA_YAML).unwrap();
        assert_eq!(post.summary(), Some(r##"
Backing up a cluster is more than copying etcd.

This post walks through *Velero*, etcd snapshots and volume snapshots.

"##));
        assert_eq!(post.more_markers(), vec![17]);
    }

    #[test]
    fn test_no_summary() {
        let file_name = PathBuf::from("blog/content/post/ebpf.md");
        let post = Post::from_string(&file_name, POST_DATA_TOML).unwrap();
        assert_eq!(post.summary(), None);
        assert!(post.more_markers().is_empty());
    }

    #[test]
    fn test_more_markers() {
        let raw = "---\ntitle: x\n---\nA\n<!--more-->\nB\n<!--more-->\n";
        let post = Post::from_string(Path::new("x.md"), raw).unwrap();
        assert_eq!(post.more_markers(), vec![5, 7]);
        assert_eq!(post.summary(), Some("A\n"));
    }

    #[test]
    fn test_spaced_more_marker_does_not_split() {
        let raw = "---\ntitle: x\n---\nA\n<!-- more -->\nB\n<!--more-->\nC <!--\nmore-->\n";
        let post = Post::from_string(Path::new("x.md"), raw).unwrap();
        assert_eq!(post.more_markers(), vec![7]);
        assert_eq!(post.spaced_more_markers(), vec![5]);
        assert_eq!(post.summary(), Some("A\n<!-- more -->\nB\n"));
    }

    #[test]
    fn test_more_marker_in_code_block_is_ignored() {
        let raw = "---\ntitle: x\n---\nUse the marker:\n\n```html\n<!--more-->\n```\n\nText\n<!--more-->\nRest\n";
        let post = Post::from_string(Path::new("x.md"), raw).unwrap();
        assert_eq!(post.more_markers(), vec![11]);
        assert!(post.summary().unwrap().ends_with("Text\n"));
    }

    #[test]
    fn test_key_line() {
        let post = Post::from_string(Path::new("x.md"), POST_DATA_YAML).unwrap();
        assert_eq!(post.key_line("title"), Some(2));
        assert_eq!(post.key_line("url"), Some(10));
        assert_eq!(post.key_line("weight"), None);

        let post = Post::from_string(Path::new("x.md"), POST_DATA_TOML).unwrap();
        assert_eq!(post.key_line("date"), Some(3));
    }

    #[test]
    fn test_link() {
        let post = Post::from_string(Path::new("posts/whatever.md"), POST_DATA_YAML).unwrap();
        assert_eq!(post.link(), "kubernetes-backup-dr");

        let raw = "---\ntitle: x\n---\n";
        let post = Post::from_string(Path::new("posts/lvm-basics.md"), raw).unwrap();
        assert_eq!(post.link(), "lvm-basics");

        let post = Post::from_string(Path::new("posts/idrac-racadm/index.md"), raw).unwrap();
        assert_eq!(post.link(), "idrac-racadm");
    }

    #[test]
    fn test_from_file_reports_file_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.md");
        fs::write(&path, "no front matter\n").unwrap();

        let err = Post::from_file(&path).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains("broken.md"));
    }
}
