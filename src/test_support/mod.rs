//! Test utilities shared across crate-level unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::{GtagCall, ReportingFunction};

/// What the recording reporter does with the `event_callback` of event calls.
#[derive(Clone, Copy, Debug, Default)]
pub enum CallbackMode {
    /// Keep the callback without invoking it.
    #[default]
    Never,
    /// Invoke it before `report` returns.
    Immediate,
    /// Invoke it from a spawned tokio task after the delay.
    After(Duration),
    /// Drop every copy of the callback without invoking it.
    Drop,
}

/// Reporting function double that records every call.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    calls: Arc<Mutex<Vec<GtagCall>>>,
    mode: CallbackMode,
    failure: Arc<Mutex<Option<AnalyticsError>>>,
}

impl RecordingReporter {
    pub fn with_mode(mode: CallbackMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Makes every following call fail with `error` after it has been recorded.
    pub fn fail_with(&self, error: AnalyticsError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn as_reporting_function(&self) -> Arc<dyn ReportingFunction> {
        Arc::new(self.clone())
    }

    pub fn calls(&self) -> Vec<GtagCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<GtagCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl ReportingFunction for RecordingReporter {
    fn report(&self, mut call: GtagCall) -> AnalyticsResult<()> {
        let callback = call.event_callback().cloned();
        if matches!(self.mode, CallbackMode::Drop) {
            if let Some(params) = call.params.as_mut() {
                params.event_callback = None;
            }
        }
        self.calls.lock().unwrap().push(call);

        if let Some(callback) = callback {
            match self.mode {
                CallbackMode::Never | CallbackMode::Drop => {}
                CallbackMode::Immediate => callback.invoke(),
                CallbackMode::After(delay) => {
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        callback.invoke();
                    });
                }
            }
        }

        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
