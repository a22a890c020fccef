use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{fs, io};

use spdlog::debug;

/// Section pages list posts, they are not posts themselves
const SECTION_FILE: &str = "_index.md";

pub struct PostList {
    pub root_dir: PathBuf,
    pub bundle_file: String,
}

impl PostList {
    pub fn retrieve_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut posts = vec![];
        let entries = fs::read_dir(self.root_dir.as_path())?;
        for entry in entries.flatten() {
            if let Ok(file_type) = entry.file_type() {
                if !file_type.is_file() {
                    continue;
                }
                let file_name = entry.file_name();
                if let Some(file_name) = file_name.to_str() {
                    if file_name.ends_with(".md") && file_name != SECTION_FILE {
                        posts.push(entry.path());
                    }
                }
            }
        }
        Ok(posts)
    }

    /// Page bundles: one directory per post, the post itself in `bundle_file`.
    pub fn retrieve_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let dirs = Self::list_dirs(self.root_dir.as_path())?;
        let post_files = dirs.into_iter()
            .map(|dir| dir.join(&self.bundle_file))
            .filter(|post_file| post_file.is_file())
            .collect();
        Ok(post_files)
    }

    fn list_dirs(posts_dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs: Vec<PathBuf> = vec![];
        let entries = fs::read_dir(posts_dir)?;
        for entry in entries.flatten() {
            if let Ok(file_type) = entry.file_type() {
                if file_type.is_dir() {
                    dirs.push(entry.path());
                }
            }
        }
        Ok(dirs)
    }
}

/// All posts under `root_dir`, single files and page bundles, sorted by path.
pub fn list_post_files(root_dir: &Path, bundle_file: &str) -> io::Result<Vec<PathBuf>> {
    let post_list = PostList {
        root_dir: root_dir.to_path_buf(),
        bundle_file: bundle_file.to_string(),
    };

    let mut posts = post_list.retrieve_files()?;
    posts.extend(post_list.retrieve_dirs()?);
    posts.sort();

    debug!("Found {} posts in {}", posts.len(), root_dir.display());
    Ok(posts)
}

/// Expands command line paths: files are kept, directories are listed.
///
/// A post reached through several arguments is returned once, in its first position.
pub fn expand_paths(paths: &[PathBuf], bundle_file: &str) -> io::Result<Vec<PathBuf>> {
    let mut posts = vec![];
    for path in paths {
        if path.is_dir() {
            posts.extend(list_post_files(path, bundle_file)?);
        } else if path.is_file() {
            posts.push(path.clone());
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No such file or directory: {}", path.display()),
            ));
        }
    }

    let mut seen = HashSet::new();
    posts.retain(|post| seen.insert(fs::canonicalize(post).unwrap_or_else(|_| post.clone())));
    Ok(posts)
}
