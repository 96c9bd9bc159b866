use std::fs::{self, OpenOptions};
use std::path::Path;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::{Builder, Env, Target};

/// Send log output to `path`; the terminal belongs to the UI. `RUST_LOG`
/// takes precedence over `default_level`.
pub fn init_logging(path: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

    Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .wrap_err("Failed to initialize logger")?;

    Ok(())
}
