//! Observable events
//!
//! Every log line names one of these events. Each event carries a default
//! severity used by [`log_event`](super::log_event).

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    ConfigLoaded,
    StoreOpened,
    StoreClosed,
    StoreDropped,

    // Buckets and documents
    BucketCreated,
    DocumentInserted,
    DocumentsUpdated,
    DocumentsDeleted,
    QueryExecuted,
    TransactionRolledBack,
    InsertIdDiscarded,

    // HTTP surface
    ServerStarting,
    ServerStopped,
    HttpRequest,
    RequestTimedOut,
    FilterOperatorIgnored,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreClosed => "STORE_CLOSED",
            Event::StoreDropped => "STORE_DROPPED",

            Event::BucketCreated => "BUCKET_CREATED",
            Event::DocumentInserted => "DOCUMENT_INSERTED",
            Event::DocumentsUpdated => "DOCUMENTS_UPDATED",
            Event::DocumentsDeleted => "DOCUMENTS_DELETED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::TransactionRolledBack => "TRANSACTION_ROLLED_BACK",
            Event::InsertIdDiscarded => "INSERT_ID_DISCARDED",

            Event::ServerStarting => "SERVER_STARTING",
            Event::ServerStopped => "SERVER_STOPPED",
            Event::HttpRequest => "HTTP_REQUEST",
            Event::RequestTimedOut => "REQUEST_TIMED_OUT",
            Event::FilterOperatorIgnored => "FILTER_OPERATOR_IGNORED",
        }
    }

    /// Severity used when the event is logged without an override
    pub fn severity(&self) -> Severity {
        match self {
            Event::DocumentInserted
            | Event::DocumentsUpdated
            | Event::DocumentsDeleted
            | Event::QueryExecuted => Severity::Trace,
            Event::TransactionRolledBack
            | Event::InsertIdDiscarded
            | Event::RequestTimedOut
            | Event::FilterOperatorIgnored => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_unique() {
        let events = [
            Event::ConfigLoaded,
            Event::StoreOpened,
            Event::StoreClosed,
            Event::StoreDropped,
            Event::BucketCreated,
            Event::DocumentInserted,
            Event::DocumentsUpdated,
            Event::DocumentsDeleted,
            Event::QueryExecuted,
            Event::TransactionRolledBack,
            Event::InsertIdDiscarded,
            Event::ServerStarting,
            Event::ServerStopped,
            Event::HttpRequest,
            Event::RequestTimedOut,
            Event::FilterOperatorIgnored,
        ];
        let mut names: Vec<&str> = events.iter().map(Event::as_str).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), events.len());
    }

    #[test]
    fn test_rollback_is_warning() {
        assert_eq!(Event::TransactionRolledBack.severity(), Severity::Warn);
        assert_eq!(Event::QueryExecuted.severity(), Severity::Trace);
        assert_eq!(Event::StoreOpened.severity(), Severity::Info);
    }
}
