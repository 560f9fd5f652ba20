use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// The user's home (Unix) or roaming app-data (Windows) directory.
fn platform_base() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("environment variable {var} is not set"))
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_base();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_base()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Turn a configured home directory into an absolute path.
///
/// `None` selects `<platform base>/<default_subdir>`. A leading `~` is
/// expanded; other relative paths are resolved against the current working
/// directory. With `create` the directory is created when missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_base()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        ensure_dir(&path)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(anyhow!("{} exists and is not a directory", path.display()));
    }
    std::fs::create_dir_all(path)
        .with_context(|| format!("cannot create directory {}", path.display()))
}
