//! Notifications from the pipeline to whoever presents it.
//!
//! The presentation layer implements [`Observer`]; every method has a no-op
//! default so a front end only overrides what it shows. Background operations
//! call the observer from their own task, which is why it must be
//! `Send + Sync`. [`ChannelObserver`] turns the callbacks into [`Event`]
//! values on a tokio channel for consumers living on another task.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::models::ArticleRecord;

pub trait Observer: Send + Sync {
    fn on_progress(&self, _percent: u8) {}
    fn on_status(&self, _message: &str) {}
    fn on_articles_ready(&self, _records: &[ArticleRecord]) {}
    /// The API root could not be reached; the operation keeps going.
    fn on_no_connection(&self) {}
    /// The active background operation ended, for whatever reason.
    fn on_terminated(&self) {}
    fn on_no_results(&self) {}
    /// An archive run was asked to save an empty selection.
    fn on_no_articles(&self) {}
    fn on_missing_api_key(&self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// Owned form of every [`Observer`] callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Progress(u8),
    Status(String),
    ArticlesReady(Vec<ArticleRecord>),
    NoConnection,
    Terminated,
    NoResults,
    NoArticles,
    MissingApiKey,
}

/// Forwards callbacks as [`Event`]s over an unbounded channel.
///
/// Sends after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: UnboundedSender<Event>,
}

impl ChannelObserver {
    pub fn new() -> (Self, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl Observer for ChannelObserver {
    fn on_progress(&self, percent: u8) {
        self.send(Event::Progress(percent));
    }

    fn on_status(&self, message: &str) {
        self.send(Event::Status(message.to_string()));
    }

    fn on_articles_ready(&self, records: &[ArticleRecord]) {
        self.send(Event::ArticlesReady(records.to_vec()));
    }

    fn on_no_connection(&self) {
        self.send(Event::NoConnection);
    }

    fn on_terminated(&self) {
        self.send(Event::Terminated);
    }

    fn on_no_results(&self) {
        self.send(Event::NoResults);
    }

    fn on_no_articles(&self) {
        self.send(Event::NoArticles);
    }

    fn on_missing_api_key(&self) {
        self.send(Event::MissingApiKey);
    }
}

/// Fixed-step progress counter.
///
/// Percent is always derived from `completed / total` with integer math, so
/// the last step lands on exactly 100 no matter how many steps there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    completed: usize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self { completed: 0, total }
    }

    /// Record one finished step and return the new percentage.
    pub fn advance(&mut self) -> u8 {
        self.completed = (self.completed + 1).min(self.total);
        self.percent()
    }

    /// Jump to the end, e.g. when some planned steps could not be attempted.
    pub fn finish(&mut self) -> u8 {
        self.completed = self.total;
        self.percent()
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed * 100 / self.total) as u8
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
