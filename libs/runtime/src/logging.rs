//! Subscriber setup driven by [`LoggingConfig`].
//!
//! Each config key other than `default` names a target prefix (usually a
//! crate such as `users_info`). Console output is human readable; file output
//! is one JSON object per line, routed to the file of the longest matching
//! prefix and falling back to the `default` file.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use parking_lot::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    Layer, Registry,
};

use crate::config::{LoggingConfig, Section};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

fn parse_level(raw: &str) -> LevelFilter {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn matches_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

#[derive(Clone)]
struct SharedFile(Arc<Mutex<FileRotate<AppendCount>>>);

impl SharedFile {
    fn open(section: &Section, base_dir: &Path) -> io::Result<Self> {
        let path = resolve_log_path(section.file.trim(), base_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let max_mb = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB).max(1);
        let rotate = FileRotate::new(
            &path,
            AppendCount::new(section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS)),
            ContentLimit::BytesSurpassed((max_mb * 1024 * 1024) as usize),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

/// Writer for one record; `None` swallows the bytes.
struct RoutedWriter(Option<SharedFile>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.0 {
            Some(file) => file.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.0 {
            Some(file) => file.0.lock().flush(),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Default)]
struct FileRoutes {
    default: Option<SharedFile>,
    /// Longest prefix first.
    by_prefix: Vec<(String, SharedFile)>,
}

impl FileRoutes {
    fn route(&self, target: &str) -> Option<SharedFile> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_prefix(target, prefix))
            .map(|(_, file)| file.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRoutes {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.route(meta.target()))
    }
}

fn open_file(name: &str, section: &Section, base_dir: &Path) -> Option<SharedFile> {
    if section.file.trim().is_empty() {
        return None;
    }
    match SharedFile::open(section, base_dir) {
        Ok(file) => Some(file),
        Err(e) => {
            // The subscriber is not installed yet.
            eprintln!("cannot open log file '{}' for '{name}': {e}", section.file);
            None
        }
    }
}

struct Plan {
    console: Targets,
    file: Targets,
    routes: FileRoutes,
}

fn build_plan(cfg: &LoggingConfig, base_dir: &Path) -> Plan {
    let default = cfg.get(DEFAULT_SECTION);
    let mut subsystems: Vec<(&String, &Section)> = cfg
        .iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .collect();
    subsystems.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut routes = FileRoutes {
        default: default.and_then(|s| open_file(DEFAULT_SECTION, s, base_dir)),
        by_prefix: Vec::new(),
    };

    let mut console = Targets::new().with_default(
        default.map_or(LevelFilter::OFF, |s| parse_level(&s.console_level)),
    );
    let mut file = Targets::new().with_default(match (default, &routes.default) {
        (Some(s), Some(_)) => parse_level(&s.file_level),
        _ => LevelFilter::OFF,
    });

    for (name, section) in subsystems {
        console = console.with_target(name.clone(), parse_level(&section.console_level));

        let own = open_file(name, section, base_dir);
        let level = if own.is_some() || routes.default.is_some() {
            parse_level(&section.file_level)
        } else {
            LevelFilter::OFF
        };
        file = file.with_target(name.clone(), level);
        if let Some(own) = own {
            routes.by_prefix.push((name.clone(), own));
        }
    }

    Plan {
        console,
        file,
        routes,
    }
}

/// Install the global subscriber described by `cfg`.
///
/// Relative log files resolve against `base_dir` (the server home). An empty
/// config installs a plain console subscriber. Calling this twice is a no-op.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let plain = tracing_subscriber::fmt()
            .with_target(true)
            .with_timer(UtcTime::rfc_3339())
            .finish();
        let _ = tracing::subscriber::set_global_default(plain);
        return;
    }

    let Plan {
        console,
        file,
        routes,
    } = build_plan(cfg, base_dir);

    let console_layer = fmt::layer()
        .with_ansi(io::stdout().is_terminal())
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(console);

    let file_layer = (!routes.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_current_span(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(routes)
            .with_filter(file)
    });

    let subscriber = Registry::default().with(console_layer).with(file_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}
