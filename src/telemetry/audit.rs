//! Audit Records
//!
//! Outbound audit collaborator. The flow reports what happened; persisting
//! the records is the host's job.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::core::transport::lock;

/// Audit level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug level.
    Debug,
    /// Info level.
    Info,
    /// Warn level.
    Warn,
    /// Error level.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub level: LogLevel,
    pub text: String,
    /// Provider name of the flow that produced the record.
    pub provider: String,
    /// Tenant slug scoping the record.
    pub slug: Option<String>,
}

/// Audit collaborator interface (for dependency injection).
pub trait AuditSink: Send + Sync {
    /// Persist a record, returning its identifier if the sink assigns one.
    fn record(&self, record: AuditRecord) -> Option<String>;
}

/// Audit sink that discards everything.
pub struct NoOpAuditSink;

impl AuditSink for NoOpAuditSink {
    fn record(&self, _record: AuditRecord) -> Option<String> {
        None
    }
}

/// Audit sink that forwards records to `tracing`.
#[derive(Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) -> Option<String> {
        let slug = record.slug.as_deref().unwrap_or("");
        match record.level {
            LogLevel::Debug => {
                tracing::debug!(provider = %record.provider, slug, "{}", record.text)
            }
            LogLevel::Info => {
                tracing::info!(provider = %record.provider, slug, "{}", record.text)
            }
            LogLevel::Warn => {
                tracing::warn!(provider = %record.provider, slug, "{}", record.text)
            }
            LogLevel::Error => {
                tracing::error!(provider = %record.provider, slug, "{}", record.text)
            }
        }
        None
    }
}

/// Stored audit entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: String,
    pub record: AuditRecord,
}

/// In-memory audit sink for testing.
#[derive(Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    /// Create new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all entries.
    pub fn get_entries(&self) -> Vec<AuditEntry> {
        lock(&self.entries).clone()
    }

    /// Get entries by level.
    pub fn get_entries_by_level(&self, level: LogLevel) -> Vec<AuditEntry> {
        lock(&self.entries)
            .iter()
            .filter(|e| e.record.level == level)
            .cloned()
            .collect()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, record: AuditRecord) -> Option<String> {
        let mut entries = lock(&self.entries);
        let id = format!("audit-{}", entries.len() + 1);
        entries.push(AuditEntry {
            id: id.clone(),
            record,
        });
        Some(id)
    }
}

/// Audit handle scoped to one callback: provider name and tenant slug are
/// attached to every record.
#[derive(Clone)]
pub struct AuditTrail {
    sink: Arc<dyn AuditSink>,
    provider: String,
    slug: Option<String>,
}

impl AuditTrail {
    pub fn new(sink: Arc<dyn AuditSink>, provider: impl Into<String>, slug: Option<String>) -> Self {
        Self {
            sink,
            provider: provider.into(),
            slug,
        }
    }

    /// Trail that records nothing.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoOpAuditSink), "", None)
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn log(&self, level: LogLevel, text: impl Into<String>) -> Option<String> {
        self.sink.record(AuditRecord {
            level,
            text: text.into(),
            provider: self.provider.clone(),
            slug: self.slug.clone(),
        })
    }

    pub fn info(&self, text: impl Into<String>) -> Option<String> {
        self.log(LogLevel::Info, text)
    }

    pub fn error(&self, text: impl Into<String>) -> Option<String> {
        self.log(LogLevel::Error, text)
    }
}

impl fmt::Debug for AuditTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditTrail")
            .field("provider", &self.provider)
            .field("slug", &self.slug)
            .finish()
    }
}
