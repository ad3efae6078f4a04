use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::error::{BibliothecaError, Result};

/// Receives a human-readable message after each library mutation.
pub trait Observer: Send {
    fn update(&self, message: &str) -> Result<()>;
}

/// Observers in registration order.
///
/// Notification happens after the mutation it describes; a failing
/// observer is logged and skipped, the rest still run.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn Observer>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&self, message: &str) {
        for (index, observer) in self.observers.iter().enumerate() {
            if let Err(e) = observer.update(message) {
                tracing::warn!(observer = index, error = %e, "observer failed to handle notification");
            }
        }
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Prints `CONSOLE: <message>` to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn update(&self, message: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "CONSOLE: {message}")?;
        Ok(())
    }
}

/// Forwards notifications to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn update(&self, message: &str) -> Result<()> {
        tracing::info!(target: "bibliotheca::events", "{message}");
        Ok(())
    }
}

/// Appends timestamped lines to a log file.
#[derive(Debug, Clone)]
pub struct FileLogObserver {
    path: PathBuf,
}

impl FileLogObserver {
    /// Create the log file (and its directory) if missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Observer for FileLogObserver {
    fn update(&self, message: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "[{timestamp}] {message}")?;
        Ok(())
    }
}

/// Collects messages in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryObserver {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().ok().and_then(|m| m.last().cloned())
    }

    pub fn clear(&self) {
        if let Ok(mut m) = self.messages.lock() {
            m.clear();
        }
    }
}

impl Observer for MemoryObserver {
    fn update(&self, message: &str) -> Result<()> {
        self.messages
            .lock()
            .map_err(|_| BibliothecaError::Observer("message buffer poisoned".to_string()))?
            .push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingObserver;

    impl Observer for FailingObserver {
        fn update(&self, _message: &str) -> Result<()> {
            Err(BibliothecaError::Observer("sink unavailable".to_string()))
        }
    }

    struct Tagged {
        tag: &'static str,
        log: MemoryObserver,
    }

    impl Observer for Tagged {
        fn update(&self, message: &str) -> Result<()> {
            self.log.update(&format!("{}:{message}", self.tag))
        }
    }

    #[test]
    fn test_observers_run_in_registration_order() {
        let log = MemoryObserver::new();
        let mut set = ObserverSet::new();
        set.subscribe(Tagged { tag: "first", log: log.clone() });
        set.subscribe(Tagged { tag: "second", log: log.clone() });

        set.notify("Book added: Dune by Herbert");
        assert_eq!(
            log.messages(),
            [
                "first:Book added: Dune by Herbert",
                "second:Book added: Dune by Herbert"
            ]
        );
    }

    #[test]
    fn test_failing_observer_does_not_block_others() {
        let log = MemoryObserver::new();
        let mut set = ObserverSet::new();
        set.subscribe(FailingObserver);
        set.subscribe(log.clone());

        set.notify("Reader added: Ivan");
        assert_eq!(log.messages(), ["Reader added: Ivan"]);
    }

    #[test]
    fn test_subscription_applies_to_later_messages_only() {
        let log = MemoryObserver::new();
        let mut set = ObserverSet::new();
        set.notify("before");
        set.subscribe(log.clone());
        set.notify("after");
        assert_eq!(log.messages(), ["after"]);
    }

    #[test]
    fn test_file_log_appends_timestamped_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("library.log");
        let observer = FileLogObserver::open(&path).unwrap();

        observer.update("Library state saved").unwrap();
        observer.update("Book 'Dune' returned").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Library state saved"));
        assert!(lines[1].ends_with("] Book 'Dune' returned"));
    }
}
