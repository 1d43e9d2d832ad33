//! Synchronous wrappers for hosts without an async executor.

use crate::analytics::{
    AnalyticsResult, EventAction, EventCategory, EventLabel, EventOptions, GtagClient,
};
use crate::util::runtime::block_on;

/// Sends an event and waits until it is acknowledged or times out.
pub fn send_event(
    client: &GtagClient,
    action: impl Into<EventAction>,
    category: impl Into<EventCategory>,
    label: impl Into<EventLabel>,
    options: Option<EventOptions>,
) -> AnalyticsResult<()> {
    block_on(client.send_event(action, category, label, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{AnalyticsErrorCode, ClientOptions};
    use crate::test_support::{CallbackMode, RecordingReporter};
    use std::time::Duration;

    fn client(reporter: &RecordingReporter) -> GtagClient {
        let options = ClientOptions::default()
            .with_event_timeout(Duration::from_millis(50))
            .unwrap();
        GtagClient::new(Some(reporter.as_reporting_function()), "TID", options)
    }

    #[test]
    fn blocking_send_resolves_on_callback() {
        let reporter = RecordingReporter::with_mode(CallbackMode::Immediate);
        send_event(&client(&reporter), "login", "engagement", "method", None).unwrap();
        assert_eq!(reporter.calls().len(), 1);
    }

    #[test]
    fn blocking_send_times_out() {
        let reporter = RecordingReporter::with_mode(CallbackMode::Never);
        let err = send_event(&client(&reporter), "login", "engagement", "method", None)
            .unwrap_err();
        assert_eq!(err.code, AnalyticsErrorCode::Timeout);
    }
}
