//! The reporting function seam.
//!
//! `gtag(command, target, params)` is owned by the host page (or a test double). The client only
//! ever talks to it through [`ReportingFunction`], which is injected at construction time.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures::channel::oneshot;
use serde_json::{Map, Value};

use crate::analytics::error::AnalyticsResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GtagCommand {
    Js,
    Config,
    Event,
}

impl GtagCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            GtagCommand::Js => "js",
            GtagCommand::Config => "config",
            GtagCommand::Event => "event",
        }
    }
}

impl fmt::Display for GtagCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Second argument of a gtag call: a timestamp for `"js"`, an id or event name otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GtagTarget {
    Timestamp(DateTime<Utc>),
    Id(String),
}

impl GtagTarget {
    pub fn as_id(&self) -> Option<&str> {
        match self {
            GtagTarget::Id(id) => Some(id),
            GtagTarget::Timestamp(_) => None,
        }
    }
}

/// Completion signal embedded in event calls as `event_callback`.
///
/// Any number of invocations from any thread are accepted; only the first one settles the
/// pending event.
#[derive(Clone)]
pub struct EventCallback {
    inner: Arc<CallbackInner>,
}

struct CallbackInner {
    sender: Mutex<Option<oneshot::Sender<()>>>,
    settled: AtomicBool,
}

impl EventCallback {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let callback = Self {
            inner: Arc::new(CallbackInner {
                sender: Mutex::new(Some(tx)),
                settled: AtomicBool::new(false),
            }),
        };
        (callback, rx)
    }

    pub fn invoke(&self) {
        if self.inner.settled.swap(true, Ordering::SeqCst) {
            return;
        }
        let sender = match self.inner.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sender) = sender {
            // The receiver is gone once the event timed out; nothing left to notify.
            let _ = sender.send(());
        }
    }

    pub fn is_settled(&self) -> bool {
        self.inner.settled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCallback")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Parameter object of a gtag call.
///
/// Equality only looks at `fields`; callbacks are never compared.
#[derive(Clone, Debug, Default)]
pub struct GtagParams {
    pub fields: Map<String, Value>,
    pub event_callback: Option<EventCallback>,
}

impl GtagParams {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            event_callback: None,
        }
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl PartialEq for GtagParams {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl From<Map<String, Value>> for GtagParams {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GtagCall {
    pub command: GtagCommand,
    pub target: GtagTarget,
    pub params: Option<GtagParams>,
}

impl GtagCall {
    pub fn js(timestamp: DateTime<Utc>) -> Self {
        Self {
            command: GtagCommand::Js,
            target: GtagTarget::Timestamp(timestamp),
            params: None,
        }
    }

    pub fn config(tracking_id: impl Into<String>, params: GtagParams) -> Self {
        Self {
            command: GtagCommand::Config,
            target: GtagTarget::Id(tracking_id.into()),
            params: Some(params),
        }
    }

    pub fn event(name: impl Into<String>, params: GtagParams) -> Self {
        Self {
            command: GtagCommand::Event,
            target: GtagTarget::Id(name.into()),
            params: Some(params),
        }
    }

    pub fn event_callback(&self) -> Option<&EventCallback> {
        self.params.as_ref()?.event_callback.as_ref()
    }
}

/// The externally supplied `gtag` function.
///
/// Errors returned here are handed back to the caller of the client operation that issued the
/// call.
pub trait ReportingFunction: Send + Sync {
    fn report(&self, call: GtagCall) -> AnalyticsResult<()>;
}

impl<F> ReportingFunction for F
where
    F: Fn(GtagCall) -> AnalyticsResult<()> + Send + Sync,
{
    fn report(&self, call: GtagCall) -> AnalyticsResult<()> {
        self(call)
    }
}
