#![cfg(all(target_arch = "wasm32", feature = "wasm-web"))]

use gtag_client::analytics::{
    AnalyticsErrorCode, AnalyticsResult, ClientOptions, GtagCall, GtagClient, ReportingFunction,
};
use std::sync::Arc;
use std::time::Duration;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn client(reporter: Arc<dyn ReportingFunction>, timeout_ms: u64) -> GtagClient {
    let options = ClientOptions::default()
        .with_event_timeout(Duration::from_millis(timeout_ms))
        .expect("valid timeout");
    GtagClient::new(Some(reporter), "G-WASM", options)
}

#[wasm_bindgen_test(async)]
async fn synchronous_ack_resolves() {
    let reporter = |call: GtagCall| -> AnalyticsResult<()> {
        if let Some(callback) = call.event_callback() {
            callback.invoke();
        }
        Ok(())
    };
    client(Arc::new(reporter), 100)
        .send_event("login", "engagement", "method", None)
        .await
        .expect("acknowledged");
}

#[wasm_bindgen_test(async)]
async fn missing_ack_times_out() {
    let reporter = |_call: GtagCall| -> AnalyticsResult<()> { Ok(()) };
    let err = client(Arc::new(reporter), 20)
        .send_event("login", "engagement", "method", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, AnalyticsErrorCode::Timeout);
}

#[wasm_bindgen_test]
fn page_view_uses_browser_document() {
    use std::sync::Mutex;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let captured = seen.clone();
    let reporter = move |call: GtagCall| -> AnalyticsResult<()> {
        captured.lock().unwrap().push(call);
        Ok(())
    };
    client(Arc::new(reporter), 100)
        .send_page_view(Some("/smoke"))
        .unwrap();

    let calls = seen.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let params = calls[0].params.as_ref().unwrap();
    assert!(params.get("page_location").is_some());
    assert_eq!(
        params.get("page_path").and_then(|v| v.as_str()),
        Some("/smoke")
    );
}
