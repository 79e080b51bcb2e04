use std::sync::Arc;

use parking_lot::RwLock;

use crate::store::RecordSet;

/// The record set of the most recent successful upload.
///
/// A new upload swaps the whole set; readers keep whatever snapshot they took,
/// so no query ever sees two files mixed.
#[derive(Debug, Default)]
pub struct Session {
    current: RwLock<Option<Arc<RecordSet>>>,
}

impl Session {
    pub fn replace(&self, records: RecordSet) -> Arc<RecordSet> {
        let records = Arc::new(records);
        *self.current.write() = Some(records.clone());
        records
    }

    pub fn snapshot(&self) -> Option<Arc<RecordSet>> {
        self.current.read().clone()
    }
}
