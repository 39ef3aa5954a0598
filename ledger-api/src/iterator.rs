use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A single key/value pair returned by a range scan or a rich query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KV {
    pub key: String,
    pub value: Vec<u8>,
}

/// Registration of a live cursor against the world state. Dropping it
/// releases the cursor.
#[derive(Debug)]
struct CursorLease {
    open: Arc<AtomicUsize>,
}

impl CursorLease {
    fn acquire(open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        CursorLease { open }
    }
}

impl Drop for CursorLease {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Cursor over a snapshot of the world state, in key order.
///
/// The cursor holds a lease on the store until [`StateIterator::close`] is
/// called or the iterator is dropped, whichever happens first. A closed
/// iterator yields nothing.
#[derive(Debug)]
pub struct StateIterator {
    entries: std::vec::IntoIter<KV>,
    lease: Option<CursorLease>,
}

impl StateIterator {
    pub(crate) fn new(entries: Vec<KV>, open: Arc<AtomicUsize>) -> Self {
        StateIterator {
            entries: entries.into_iter(),
            lease: Some(CursorLease::acquire(open)),
        }
    }

    pub fn has_next(&self) -> bool {
        self.lease.is_some() && !self.entries.as_slice().is_empty()
    }

    /// Releases the cursor. Calling it more than once is a no-op.
    pub fn close(&mut self) {
        if self.lease.take().is_some() {
            self.entries = Vec::new().into_iter();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lease.is_none()
    }
}

impl Iterator for StateIterator {
    type Item = KV;

    fn next(&mut self) -> Option<KV> {
        if self.lease.is_none() {
            return None;
        }
        self.entries.next()
    }
}
