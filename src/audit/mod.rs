//! Audit logging for Bookkeeper
//!
//! Services record every create, update and delete with before/after
//! snapshots in an append-only JSONL file. Repositories do not audit.

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
