use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::Utc;
use futures::future::{self, Either};
use serde_json::{Map, Value};

use crate::analytics::config::{ClientOptions, ClientOptionsOverride};
use crate::analytics::error::{
    app_config_required, invalid_argument, reporting_function_not_set, timeout_error,
    AnalyticsResult,
};
use crate::analytics::error_props::{normalize, ReportedError};
use crate::analytics::params::{
    to_params, AppConfig, EventAction, EventCategory, EventLabel, EventOptions, Localization,
};
use crate::analytics::reporter::{EventCallback, GtagCall, GtagParams, ReportingFunction};
use crate::platform::document::{default_document_context, DocumentContext};
use crate::platform::runtime::{timer, BoxedFuture};

/// Typed front end over an injected gtag reporting function.
///
/// Every operation except [`send_event`](Self::send_event) and
/// [`send_screen_view`](Self::send_screen_view) is a silent no-op when no reporting function was
/// supplied, so analytics never interrupts the host application.
#[derive(Clone)]
pub struct GtagClient {
    inner: Arc<GtagClientInner>,
}

struct GtagClientInner {
    reporter: Option<Arc<dyn ReportingFunction>>,
    tracking_id: String,
    options: Mutex<ClientOptions>,
    app_configured: AtomicBool,
    document: Mutex<Option<Arc<dyn DocumentContext>>>,
}

impl fmt::Debug for GtagClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GtagClient")
            .field("tracking_id", &self.inner.tracking_id)
            .field("has_reporter", &self.has_reporter())
            .field("app_configured", &self.is_app_configured())
            .finish()
    }
}

impl GtagClient {
    pub fn new(
        reporter: Option<Arc<dyn ReportingFunction>>,
        tracking_id: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let inner = GtagClientInner {
            reporter,
            tracking_id: tracking_id.into(),
            options: Mutex::new(options),
            app_configured: AtomicBool::new(false),
            document: Mutex::new(default_document_context()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Builds a client whose options are `overrides` merged onto the defaults.
    pub fn with_overrides(
        reporter: Option<Arc<dyn ReportingFunction>>,
        tracking_id: impl Into<String>,
        overrides: &ClientOptionsOverride,
    ) -> AnalyticsResult<Self> {
        let options = ClientOptions::merged(overrides)?;
        Ok(Self::new(reporter, tracking_id, options))
    }

    pub fn tracking_id(&self) -> &str {
        &self.inner.tracking_id
    }

    pub fn options(&self) -> ClientOptions {
        self.inner.options.lock().unwrap().clone()
    }

    pub fn set_event_timeout(&self, timeout: Duration) -> AnalyticsResult<()> {
        let updated = self.options().with_event_timeout(timeout)?;
        *self.inner.options.lock().unwrap() = updated;
        Ok(())
    }

    pub fn has_reporter(&self) -> bool {
        self.inner.reporter.is_some()
    }

    pub fn is_app_configured(&self) -> bool {
        self.inner.app_configured.load(Ordering::SeqCst)
    }

    /// Replaces the document used by [`send_page_view`](Self::send_page_view). `None` disables
    /// page views.
    pub fn set_document_context(&self, document: Option<Arc<dyn DocumentContext>>) {
        *self.inner.document.lock().unwrap() = document;
    }

    /// Issues the `js` bootstrap call and the initial `config` for the tracking id, then the app
    /// config when one is given. Does nothing without a reporting function.
    pub fn initialize(
        &self,
        send_page_view: bool,
        app_config: Option<AppConfig>,
    ) -> AnalyticsResult<()> {
        let Some(reporter) = self.reporter() else {
            log::debug!(
                "gtag client for {} has no reporting function; skipping init",
                self.tracking_id()
            );
            return Ok(());
        };

        self.dispatch(reporter, GtagCall::js(Utc::now()))?;
        let mut fields = Map::new();
        fields.insert("send_page_view".into(), Value::Bool(send_page_view));
        self.dispatch(reporter, self.config_call(fields))?;

        if let Some(config) = app_config {
            self.set_app_config(config)?;
        }
        Ok(())
    }

    /// Marks the app as configured, with or without a reporting function, and forwards `config`.
    pub fn set_app_config(&self, config: AppConfig) -> AnalyticsResult<()> {
        self.inner.app_configured.store(true, Ordering::SeqCst);
        let Some(reporter) = self.reporter() else {
            return Ok(());
        };
        let fields = to_params(&config)?;
        self.dispatch(reporter, self.config_call(fields))
    }

    pub fn set_user_id(&self, uid: &str) -> AnalyticsResult<()> {
        let Some(reporter) = self.reporter() else {
            return Ok(());
        };
        let mut fields = Map::new();
        fields.insert("user_id".into(), Value::String(uid.to_string()));
        self.dispatch(reporter, self.config_call(fields))
    }

    pub fn set_localization(&self, info: &Localization) -> AnalyticsResult<()> {
        let Some(reporter) = self.reporter() else {
            return Ok(());
        };
        let fields = to_params(info)?;
        self.dispatch(reporter, self.config_call(fields))
    }

    /// Reports the current document. Skipped when there is no document to read from.
    pub fn send_page_view(&self, path: Option<&str>) -> AnalyticsResult<()> {
        let Some(reporter) = self.reporter() else {
            return Ok(());
        };
        let document = self.inner.document.lock().unwrap().clone();
        let Some(page) = document.and_then(|document| document.snapshot()) else {
            log::debug!("no document available; skipping page view");
            return Ok(());
        };

        let mut fields = Map::new();
        fields.insert("page_title".into(), Value::String(page.title));
        fields.insert("page_location".into(), Value::String(page.location.into()));
        if let Some(path) = path {
            fields.insert("page_path".into(), Value::String(path.to_string()));
        }
        self.dispatch(reporter, self.config_call(fields))
    }

    /// Fails with `analytics/app-config-required` until [`set_app_config`](Self::set_app_config)
    /// has been called.
    pub fn send_screen_view(&self, screen_name: &str) -> AnalyticsResult<()> {
        if !self.is_app_configured() {
            return Err(app_config_required());
        }
        let Some(reporter) = self.reporter() else {
            return Ok(());
        };
        let mut fields = Map::new();
        fields.insert("screen_name".into(), Value::String(screen_name.to_string()));
        self.dispatch(reporter, GtagCall::event("screen_view", GtagParams::new(fields)))
    }

    /// Sends an event and returns a future that settles when gtag invokes `event_callback`.
    ///
    /// The event is forwarded before this returns and the timeout window starts immediately. The
    /// future fails with `analytics/timeout` if the callback has not fired within the configured
    /// event timeout, and with `analytics/reporting-function-not-set` when there is no reporting
    /// function.
    ///
    /// On native targets the returned future must be polled inside a Tokio runtime; use
    /// [`blocking::send_event`](crate::blocking::send_event) from synchronous code.
    pub fn send_event(
        &self,
        action: impl Into<EventAction>,
        category: impl Into<EventCategory>,
        label: impl Into<EventLabel>,
        options: Option<EventOptions>,
    ) -> EventCompletion {
        let Some(reporter) = self.reporter() else {
            return EventCompletion::ready(Err(reporting_function_not_set()));
        };
        let action: EventAction = action.into();
        let category: EventCategory = category.into();
        let label: EventLabel = label.into();

        let mut fields = Map::new();
        fields.insert(
            "event_category".into(),
            Value::String(category.as_str().to_string()),
        );
        fields.insert("event_label".into(), Value::String(label.as_str().to_string()));
        if let Some(options) = options {
            match to_params(&options) {
                Ok(extra) => fields.extend(
                    extra
                        .into_iter()
                        .filter(|(key, _)| key != "event_callback"),
                ),
                Err(err) => return EventCompletion::ready(Err(err)),
            }
        }

        let (callback, completed) = EventCallback::channel();
        let params = GtagParams::new(fields).with_event_callback(callback);
        if let Err(err) = self.dispatch(reporter, GtagCall::event(action.as_str(), params)) {
            return EventCompletion::ready(Err(err));
        }

        let timeout = self.options().event_timeout();
        let deadline = timer(timeout);
        let name = action.as_str().to_string();
        EventCompletion::new(async move {
            match future::select(completed, deadline).await {
                Either::Left((Ok(()), _)) => Ok(()),
                Either::Left((Err(_), deadline)) => {
                    // Every copy of the callback was dropped unfired; only the timer is left.
                    deadline.await;
                    log::warn!("event `{name}` was not acknowledged within {timeout:?}");
                    Err(timeout_error())
                }
                Either::Right(((), _)) => {
                    log::warn!("event `{name}` was not acknowledged within {timeout:?}");
                    Err(timeout_error())
                }
            }
        })
    }

    /// Reports an `exception` event. Keys in `info` override `description` and `fatal`.
    pub fn send_exception(
        &self,
        description: &str,
        fatal: bool,
        info: Option<Map<String, Value>>,
    ) -> AnalyticsResult<()> {
        let Some(reporter) = self.reporter() else {
            return Ok(());
        };
        let mut fields = Map::new();
        fields.insert("description".into(), Value::String(description.to_string()));
        fields.insert("fatal".into(), Value::Bool(fatal));
        if let Some(info) = info {
            fields.extend(info);
        }
        self.dispatch(reporter, GtagCall::event("exception", GtagParams::new(fields)))
    }

    /// Normalizes `error` and reports it through [`send_exception`](Self::send_exception) with
    /// the JSON encoded properties as description.
    pub fn send_error(
        &self,
        error: impl Into<ReportedError>,
        fatal: bool,
        info: Option<Map<String, Value>>,
    ) -> AnalyticsResult<()> {
        if !self.has_reporter() {
            return Ok(());
        }
        let props = normalize(&error.into());
        let description = serde_json::to_string(&props)
            .map_err(|err| invalid_argument(format!("failed to encode error: {err}")))?;
        self.send_exception(&description, fatal, info)
    }

    fn reporter(&self) -> Option<&Arc<dyn ReportingFunction>> {
        self.inner.reporter.as_ref()
    }

    fn config_call(&self, fields: Map<String, Value>) -> GtagCall {
        GtagCall::config(self.inner.tracking_id.clone(), GtagParams::new(fields))
    }

    fn dispatch(
        &self,
        reporter: &Arc<dyn ReportingFunction>,
        call: GtagCall,
    ) -> AnalyticsResult<()> {
        log::debug!("gtag('{}', {:?})", call.command, call.target);
        reporter.report(call)
    }
}

/// Outcome of [`GtagClient::send_event`].
#[must_use = "the event outcome is only observable by awaiting the completion"]
pub struct EventCompletion {
    inner: BoxedFuture<AnalyticsResult<()>>,
}

impl EventCompletion {
    #[cfg(not(target_arch = "wasm32"))]
    fn new<F>(future: F) -> Self
    where
        F: Future<Output = AnalyticsResult<()>> + Send + 'static,
    {
        Self {
            inner: Box::pin(future),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn new<F>(future: F) -> Self
    where
        F: Future<Output = AnalyticsResult<()>> + 'static,
    {
        Self {
            inner: Box::pin(future),
        }
    }

    fn ready(result: AnalyticsResult<()>) -> Self {
        Self::new(future::ready(result))
    }
}

impl Future for EventCompletion {
    type Output = AnalyticsResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for EventCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCompletion").finish_non_exhaustive()
    }
}
