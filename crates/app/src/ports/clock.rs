//! Clock port — where "now" comes from.

use std::sync::Arc;

use glowminder_domain::time::Timestamp;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now_utc(&self) -> Timestamp;

    /// Current instant in whole Unix seconds.
    fn now_unix(&self) -> i64 {
        self.now_utc().timestamp()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now_utc(&self) -> Timestamp {
        (**self).now_utc()
    }

    fn now_unix(&self) -> i64 {
        (**self).now_unix()
    }
}
