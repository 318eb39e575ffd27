//! Logging subsystem.
//!
//! All crates log through `tracing`. [`init`] installs a subscriber with two
//! sinks: a daily-rolling log file and an in-memory ring buffer the drop-down
//! console drains every frame.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log severity as shown in the console overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// Shared buffer the console layer writes into and the app drains.
pub type LogBuffer = Arc<Mutex<VecDeque<LogEntry>>>;

pub fn new_log_buffer(capacity: usize) -> LogBuffer {
    Arc::new(Mutex::new(VecDeque::with_capacity(capacity)))
}

/// Where and how long log files are kept.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub file_prefix: String,
    pub retention_days: u64,
    pub console_capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: log_dir(),
            file_prefix: "mamba.log".to_string(),
            retention_days: 7,
            console_capacity: 1000,
        }
    }
}

/// Resolve the log directory.
///
/// `MAMBA_LOG_DIR` wins; otherwise `~/Library/Logs/mamba` on macOS and
/// `$XDG_DATA_HOME/mamba/logs` elsewhere, falling back to `./logs`.
pub fn log_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("MAMBA_LOG_DIR") {
        return PathBuf::from(dir);
    }

    let platform = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|home| home.join("Library").join("Logs").join("mamba"))
    } else {
        dirs::data_dir().map(|data| data.join("mamba").join("logs"))
    };

    platform.unwrap_or_else(|| PathBuf::from("logs"))
}

/// Delete rolled log files older than `max_age`. Only files carrying `prefix`
/// are touched.
fn prune_logs(dir: &Path, prefix: &str, max_age: Duration) {
    let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
        return;
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(prefix) {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .is_ok_and(|modified| modified < cutoff);
        if stale {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Tracing layer feeding the console ring buffer.
struct ConsoleLayer {
    buffer: LogBuffer,
    capacity: usize,
}

impl<S: tracing::Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            level: LogLevel::from(*event.metadata().level()),
            target: event.metadata().target().to_string(),
            message: visitor.finish(),
        };

        if let Ok(mut buf) = self.buffer.lock() {
            while buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(entry);
        }
    }
}

/// Flattens an event into `message key=value ...`.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        let mut parts = Vec::with_capacity(self.fields.len() + 1);
        parts.extend(self.message);
        parts.extend(self.fields);
        parts.join(" ")
    }

    fn push(&mut self, name: &str, value: String) {
        if name == "message" {
            self.message = Some(value);
        } else {
            self.fields.push(format!("{name}={value}"));
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        self.push(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push(field.name(), value.to_string());
    }
}

/// Install the global subscriber and return the console buffer.
///
/// The filter comes from `MAMBA_LOG`, then `RUST_LOG`, defaulting to `info`.
pub fn init(config: &LogConfig) -> LogBuffer {
    let buffer = new_log_buffer(config.console_capacity);

    let filter = EnvFilter::try_from_env("MAMBA_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = std::fs::create_dir_all(&config.dir) {
        eprintln!("warning: failed to create log directory {:?}: {}", config.dir, e);
    }
    prune_logs(
        &config.dir,
        &config.file_prefix,
        Duration::from_secs(config.retention_days * 86_400),
    );

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(rolling::daily(&config.dir, &config.file_prefix))
        .with_ansi(false)
        .with_target(true);

    let console_layer = ConsoleLayer {
        buffer: buffer.clone(),
        capacity: config.console_capacity,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Tests touching process env must not interleave.
    static ENV_LOCK: StdMutex<()> = StdMutex::new(());

    #[test]
    fn log_dir_respects_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let original = std::env::var_os("MAMBA_LOG_DIR");

        unsafe { std::env::set_var("MAMBA_LOG_DIR", "/tmp/mamba-test-logs") };
        assert_eq!(log_dir(), PathBuf::from("/tmp/mamba-test-logs"));

        match original {
            Some(v) => unsafe { std::env::set_var("MAMBA_LOG_DIR", v) },
            None => unsafe { std::env::remove_var("MAMBA_LOG_DIR") },
        }
    }

    #[test]
    fn level_conversion_and_display() {
        assert_eq!(LogLevel::from(tracing::Level::WARN), LogLevel::Warn);
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(format!("{:5}", LogLevel::Info.to_string()), "INFO ");
    }

    #[test]
    fn visitor_joins_message_and_fields() {
        let v = MessageVisitor {
            message: Some("loaded module: Hangar".into()),
            fields: vec!["module_id=hangar".into()],
        };
        assert_eq!(v.finish(), "loaded module: Hangar module_id=hangar");
    }

    #[test]
    fn visitor_without_message() {
        let v = MessageVisitor {
            message: None,
            fields: vec!["a=1".into(), "b=2".into()],
        };
        assert_eq!(v.finish(), "a=1 b=2");
        assert_eq!(MessageVisitor::default().finish(), "");
    }

    #[test]
    fn prune_removes_only_prefixed_stale_files() {
        let tmp = std::env::temp_dir().join("mamba-test-prune");
        let _ = std::fs::create_dir_all(&tmp);

        let old_a = tmp.join("mamba.log.2025-01-01");
        let other = tmp.join("notes.txt");
        std::fs::write(&old_a, "a").unwrap();
        std::fs::write(&other, "c").unwrap();

        prune_logs(&tmp, "mamba.log", Duration::ZERO);
        assert!(!old_a.exists());
        assert!(other.exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
