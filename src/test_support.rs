//! In-test fakes for the bootstrap collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::net::fetch::{Fetch, FetchError, FetchRequest, FetchResponse};
use crate::util::auto_login::{AutoLoginOutcome, MessageBus, MessageHandler};
use crate::util::navigation::Navigator;

/// Answers requests from a queue and records every request it saw.
#[derive(Default)]
pub struct ScriptedFetcher {
    replies: RefCell<VecDeque<Result<FetchResponse, FetchError>>>,
    pub requests: RefCell<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub fn replying(reply: Result<FetchResponse, FetchError>) -> Self {
        let fetcher = Self::default();
        fetcher.push(reply);
        fetcher
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self::replying(Ok(FetchResponse { status, location: None, body: body.to_owned() }))
    }

    pub fn push(&self, reply: Result<FetchResponse, FetchError>) {
        self.replies.borrow_mut().push_back(reply);
    }
}

impl Fetch for ScriptedFetcher {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output = Result<FetchResponse, FetchError>> {
        self.requests.borrow_mut().push(request);
        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("no scripted reply".to_owned())));
        async move { reply }
    }
}

/// Never answers.
pub struct PendingFetcher;

impl Fetch for PendingFetcher {
    fn fetch(&self, _request: FetchRequest) -> impl Future<Output = Result<FetchResponse, FetchError>> {
        futures::future::pending()
    }
}

/// Records every redirect it is asked to perform. `Sync`, so channels using
/// it can be watched.
#[derive(Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<(u16, String)>>,
}

impl RecordingNavigator {
    pub fn calls(&self) -> Vec<(u16, String)> {
        self.recorded().clone()
    }

    pub fn count(&self) -> usize {
        self.recorded().len()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<(u16, String)>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, status: u16, location: &str) {
        self.recorded().push((status, location.to_owned()));
    }
}

/// Message bus that keeps handlers so tests can deliver messages by hand.
#[derive(Default)]
pub struct RecordingBus {
    handlers: RefCell<Vec<Arc<dyn MessageHandler>>>,
}

impl RecordingBus {
    pub fn listeners(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn deliver(&self, origin: &str, data: &Value) -> Vec<AutoLoginOutcome> {
        self.handlers.borrow().iter().map(|handler| handler.receive(origin, data)).collect()
    }
}

impl MessageBus for RecordingBus {
    fn listen(&self, handler: Arc<dyn MessageHandler>) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        if !handlers.is_empty() {
            return false;
        }
        handlers.push(handler);
        true
    }
}
