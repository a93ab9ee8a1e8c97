#![forbid(unsafe_code)]

//! Deferred page-change notifications.
//!
//! The state machine runs on the frame path and must not call user code
//! there. Commits are pushed into a non-blocking channel by
//! [`PageChangeSender`]; the host drains them later with
//! [`PageChangeFeed::flush`], which invokes the registered callback once per
//! change in commit order.
//!
//! A panicking callback does not drop the remaining notifications: every
//! pending change is delivered, then the first panic is resumed.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryIter};

use tracing::debug;
use web_time::Instant;

/// One committed page transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageChange {
    /// Newly committed page.
    pub page: i64,
    /// Page committed before this transition.
    pub previous: i64,
}

impl PageChange {
    /// `+1` when moving to a higher index, `-1` when moving lower.
    #[must_use]
    pub fn direction(&self) -> i64 {
        (self.page - self.previous).signum()
    }
}

/// Callback type invoked by [`PageChangeFeed::flush`].
pub type PageChangeCallback = Box<dyn FnMut(PageChange) + Send>;

/// Producer half, owned by the pager.
#[derive(Debug, Clone)]
pub struct PageChangeSender {
    tx: Sender<PageChange>,
}

impl PageChangeSender {
    /// Enqueue a change. Never blocks; a dropped feed discards it.
    pub fn send(&self, change: PageChange) {
        if self.tx.send(change).is_err() {
            debug!(page = change.page, "page change feed dropped; notification discarded");
        }
    }
}

/// Consumer half, drained by the host off the frame path.
pub struct PageChangeFeed {
    rx: Receiver<PageChange>,
    callback: Option<PageChangeCallback>,
}

impl fmt::Debug for PageChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageChangeFeed")
            .field("has_callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

/// Create a connected sender/feed pair.
#[must_use]
pub fn page_change_channel() -> (PageChangeSender, PageChangeFeed) {
    let (tx, rx) = mpsc::channel();
    (
        PageChangeSender { tx },
        PageChangeFeed { rx, callback: None },
    )
}

impl PageChangeFeed {
    /// Attach (or replace) the callback run by [`flush`](Self::flush).
    pub fn set_callback(&mut self, callback: impl FnMut(PageChange) + Send + 'static) {
        self.callback = Some(Box::new(callback));
    }

    #[must_use]
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Pending changes, without invoking the callback.
    pub fn try_iter(&self) -> TryIter<'_, PageChange> {
        self.rx.try_iter()
    }

    /// Drain every pending change into a vector, without invoking the callback.
    #[must_use]
    pub fn drain(&self) -> Vec<PageChange> {
        self.rx.try_iter().collect()
    }

    /// Deliver every pending change to the callback. Returns how many were
    /// delivered.
    ///
    /// Without a callback, pending changes are discarded.
    ///
    /// # Panics
    ///
    /// Resumes the first callback panic after all pending changes have been
    /// delivered.
    pub fn flush(&mut self) -> usize {
        let pending: Vec<PageChange> = self.rx.try_iter().collect();
        if pending.is_empty() {
            return 0;
        }
        let Some(callback) = self.callback.as_mut() else {
            debug!(count = pending.len(), "no page change callback; discarding");
            return 0;
        };

        let started = Instant::now();
        let mut first_panic: Option<Box<dyn std::any::Any + Send>> = None;
        for change in &pending {
            let result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(*change)));
            if let Err(payload) = result
                && first_panic.is_none()
            {
                first_panic = Some(payload);
            }
        }
        debug!(
            delivered = pending.len(),
            duration_us = started.elapsed().as_micros() as u64,
            "page change feed flushed"
        );

        if let Some(payload) = first_panic {
            std::panic::resume_unwind(payload);
        }
        pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn change(previous: i64, page: i64) -> PageChange {
        PageChange { page, previous }
    }

    #[test]
    fn flush_delivers_in_commit_order() {
        let (tx, mut feed) = page_change_channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        feed.set_callback(move |c| sink.lock().unwrap().push(c.page));

        tx.send(change(0, 1));
        tx.send(change(1, 2));
        tx.send(change(2, 1));
        assert_eq!(feed.flush(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);
        assert_eq!(feed.flush(), 0);
    }

    #[test]
    fn nothing_is_delivered_before_flush() {
        let (tx, mut feed) = page_change_channel();
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        feed.set_callback(move |_| *sink.lock().unwrap() += 1);

        tx.send(change(0, 1));
        assert_eq!(*count.lock().unwrap(), 0);
        feed.flush();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn drain_bypasses_callback() {
        let (tx, feed) = page_change_channel();
        tx.send(change(3, 4));
        assert_eq!(feed.drain(), vec![change(3, 4)]);
        assert!(feed.drain().is_empty());
    }

    #[test]
    fn send_after_feed_dropped_is_silent() {
        let (tx, feed) = page_change_channel();
        drop(feed);
        tx.send(change(0, 1));
    }

    #[test]
    fn panicking_callback_still_delivers_the_rest() {
        let (tx, mut feed) = page_change_channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        feed.set_callback(move |c| {
            sink.lock().unwrap().push(c.page);
            if c.page == 1 {
                panic!("callback failure");
            }
        });

        tx.send(change(0, 1));
        tx.send(change(1, 2));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| feed.flush()));
        assert!(result.is_err());
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn direction_follows_index_order() {
        assert_eq!(change(0, 1).direction(), 1);
        assert_eq!(change(5, -2).direction(), -1);
    }
}
