use std::env;
use std::path::PathBuf;

use postkit::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let mut candidates = vec![];

    if let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(|p| p.to_path_buf())) {
        candidates.push(exe_dir.join(CFG_FILE_NAME));
    }

    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir.join(CFG_FILE_NAME));
    }

    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir.join("postkit").join(CFG_FILE_NAME));
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Reads the configuration and tells where it came from. Without any file, defaults are used.
pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<(Config, Option<PathBuf>), String> {
    let Some(config_path) = cfg_path.or_else(get_config_path) else {
        return Ok((Config::default(), None));
    };

    match read_config(&config_path) {
        Ok(config) => Ok((config, Some(config_path))),
        Err(e) => Err(e.to_string()),
    }
}
