use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::front_matter::FrontMatterFormat;
use crate::lint::Rule;
use crate::post::BUNDLE_FILE;

#[derive(Deserialize)]
#[serde(default)]
pub struct Paths {
    pub content_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            content_dir: PathBuf::from("blog/content/post"),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Author written into new posts and expected in existing ones
    pub author: Option<String>,
    pub format: FrontMatterFormat,
    pub bundle_file: String,
    pub more_link: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            author: None,
            format: FrontMatterFormat::Yaml,
            bundle_file: BUNDLE_FILE.to_string(),
            more_link: "yes".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub required_fields: Vec<String>,
    pub disabled_rules: Vec<Rule>,
}

impl Default for LintConfig {
    fn default() -> Self {
        LintConfig {
            required_fields: vec!["title".to_string(), "date".to_string(), "url".to_string()],
            disabled_rules: vec![],
        }
    }
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    #[serde(default)]
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub defaults: Defaults,
    pub lint: LintConfig,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
    match exe_dir {
        Some(exe_dir) => PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())),
        None => path,
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths.content_dir = parse_path(cfg.paths.content_dir);
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(parse_path);
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
