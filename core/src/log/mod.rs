//! Logging bootstrap for the photo shelf.
//!
//! Installs a `tracing` registry with two sinks: a non-blocking rolling file under the
//! application data directory and a terse stderr console. Records emitted through the `log`
//! facade are bridged into the same pipeline. Call [`init`] once at startup; repeated calls hand
//! back the handle installed by the first one.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use anyhow::{Context, Result, anyhow};
use tracing_log::AsLog;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, util::SubscriberInitExt};

const ENV_FILTER_VARS: [&str; 2] = ["PHOTO_SHELF_LOG", "RUST_LOG"];
const LOG_FILE_PREFIX: &str = "photo-shelf";

static LOG_HANDLE: OnceLock<LogHandle> = OnceLock::new();

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogRolling {
    Hourly,
    Daily,
    Never,
}

impl LogRolling {
    fn rotation(self) -> tracing_appender::rolling::Rotation {
        use tracing_appender::rolling::Rotation;
        match self {
            LogRolling::Hourly => Rotation::HOURLY,
            LogRolling::Daily => Rotation::DAILY,
            LogRolling::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory holding the rolling log files.
    pub directory: PathBuf,
    /// File name prefix; files are named `<prefix>.<date>.log`.
    pub file_prefix: String,
    /// Number of log files kept on startup. `None` keeps everything.
    pub retention: Option<usize>,
    pub file_level: LevelFilter,
    pub console_level: LevelFilter,
    /// Forward `log` crate records into `tracing`.
    pub capture_log: bool,
    /// Filter directive such as `photo_core=debug`; read from the environment by default.
    pub env_filter: Option<String>,
    pub rolling: LogRolling,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: crate::config::data_dir().join("logs"),
            file_prefix: LOG_FILE_PREFIX.to_string(),
            retention: Some(7),
            file_level: LevelFilter::DEBUG,
            console_level: if cfg!(debug_assertions) { LevelFilter::INFO } else { LevelFilter::WARN },
            capture_log: true,
            env_filter: env_directive(),
            rolling: LogRolling::Daily,
        }
    }
}

impl LogConfig {
    pub fn with_directory<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.directory = path.into();
        self
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_console_level(mut self, level: LevelFilter) -> Self {
        self.console_level = level;
        self
    }

    pub fn with_env_filter<S: Into<String>>(mut self, directive: S) -> Self {
        self.env_filter = Some(directive.into());
        self
    }

    /// Debug output on the console. A filter taken from the environment still wins.
    pub fn verbose(self) -> Self {
        let config = self.with_console_level(LevelFilter::DEBUG);
        match config.env_filter {
            Some(_) => config,
            None => config.with_env_filter("debug"),
        }
    }
}

/// Owns the background writer of the file sink; dropping it would lose buffered lines.
#[derive(Debug)]
pub struct LogHandle {
    _guard: tracing_appender::non_blocking::WorkerGuard,
    directory: PathBuf,
}

impl LogHandle {
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Install the global subscriber. The first successful call wins.
pub fn init(config: LogConfig) -> Result<&'static LogHandle> {
    if let Some(handle) = LOG_HANDLE.get() {
        return Ok(handle);
    }

    let handle = install(config)?;
    let _ = LOG_HANDLE.set(handle);
    LOG_HANDLE.get().ok_or_else(|| anyhow!("log handle missing after initialisation"))
}

fn install(config: LogConfig) -> Result<LogHandle> {
    if config.capture_log {
        let verbosest = config.file_level.max(config.console_level);
        let _ = tracing_log::LogTracer::builder().with_max_level(verbosest.as_log()).init();
    }

    fs::create_dir_all(&config.directory)
        .with_context(|| format!("creating log directory at {}", config.directory.display()))?;

    if let Some(keep) = config.retention.filter(|keep| *keep > 0) {
        prune_old_logs(&config.directory, &config.file_prefix, keep)
            .context("applying log retention")?;
    }

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(config.rolling.rotation())
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(&config.directory)
        .context("creating rolling log appender")?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let directive = config
        .env_filter
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| if cfg!(debug_assertions) { "debug" } else { "info" }.to_string());
    let env_filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("parsing log filter {directive:?}"))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_thread_names(true)
        .with_filter(config.file_level);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(config.console_level);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(LogHandle { _guard: guard, directory: config.directory })
}

fn env_directive() -> Option<String> {
    ENV_FILTER_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .filter(|directive| !directive.trim().is_empty())
}

/// Delete the oldest `<prefix>*` files so that at most `keep` remain.
fn prune_old_logs(dir: &Path, prefix: &str, keep: usize) -> Result<()> {
    let mut logs: Vec<(PathBuf, SystemTime)> = fs::read_dir(dir)
        .with_context(|| format!("reading log directory at {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let meta = entry.metadata().ok().filter(|meta| meta.is_file())?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(OsStr::to_str)
                .map(|name| name.starts_with(prefix))
                .unwrap_or(false);
            matches.then(|| (path, meta.modified().unwrap_or(SystemTime::UNIX_EPOCH)))
        })
        .collect();

    if logs.len() <= keep {
        return Ok(());
    }

    logs.sort_by_key(|(_, modified)| *modified);
    let excess = logs.len() - keep;
    for (path, _) in logs.into_iter().take(excess) {
        let _ = fs::remove_file(&path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn init_is_idempotent() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config =
            LogConfig::default().with_directory(temp.path().join("logs")).with_prefix("test-log");

        let first = init(config.clone()).expect("init once");
        assert!(first.directory().exists());

        let second = init(config).expect("init twice");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn verbose_opens_the_filter_unless_the_environment_set_one() {
        let quiet = LogConfig { env_filter: None, ..LogConfig::default() };
        let verbose = quiet.verbose();
        assert_eq!(verbose.console_level, LevelFilter::DEBUG);
        assert_eq!(verbose.env_filter.as_deref(), Some("debug"));

        let pinned = LogConfig::default().with_env_filter("photo_core=warn").verbose();
        assert_eq!(pinned.console_level, LevelFilter::DEBUG);
        assert_eq!(pinned.env_filter.as_deref(), Some("photo_core=warn"));
    }

    #[test]
    fn pruning_keeps_newest_matching_files() {
        let temp = tempfile::tempdir().unwrap();
        for (index, name) in ["shelf.1.log", "shelf.2.log", "shelf.3.log"].iter().enumerate() {
            let path = temp.path().join(name);
            fs::write(&path, b"line").unwrap();
            let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 + index as u64);
            fs::File::options().write(true).open(&path).unwrap().set_modified(stamp).unwrap();
        }
        fs::write(temp.path().join("other.log"), b"keep").unwrap();

        prune_old_logs(temp.path(), "shelf", 2).unwrap();

        let mut left: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["other.log", "shelf.2.log", "shelf.3.log"]);
    }
}
