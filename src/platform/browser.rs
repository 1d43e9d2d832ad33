//! Adapter over the `gtag` function that gtag.js installs on the page.

use js_sys::{Date, Function, Reflect, JSON};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::analytics::error::{reporter_error, AnalyticsResult};
use crate::analytics::{GtagCall, GtagTarget, ReportingFunction};

#[derive(Clone, Debug)]
pub struct WindowGtag {
    function: Function,
}

// wasm32 is single threaded.
unsafe impl Send for WindowGtag {}
unsafe impl Sync for WindowGtag {}

impl WindowGtag {
    /// Looks up `globalThis.gtag`. Returns `None` when the script has not been loaded.
    pub fn from_global() -> Option<Self> {
        let global = js_sys::global();
        let value = Reflect::get(&global, &JsValue::from_str("gtag")).ok()?;
        value.dyn_into::<Function>().ok().map(Self::new)
    }

    pub fn new(function: Function) -> Self {
        Self { function }
    }
}

impl ReportingFunction for WindowGtag {
    fn report(&self, call: GtagCall) -> AnalyticsResult<()> {
        let command = JsValue::from_str(call.command.as_str());
        let target = match &call.target {
            GtagTarget::Timestamp(at) => {
                JsValue::from(Date::new(&JsValue::from_f64(at.timestamp_millis() as f64)))
            }
            GtagTarget::Id(id) => JsValue::from_str(id),
        };

        let result = match call.params {
            None => self.function.call2(&JsValue::NULL, &command, &target),
            Some(params) => {
                let encoded = serde_json::to_string(&params.fields)
                    .map_err(|err| reporter_error(format!("failed to encode gtag params: {err}")))?;
                let object = JSON::parse(&encoded).map_err(|err| {
                    reporter_error(format!("failed to build gtag params: {}", js_error_message(err)))
                })?;
                if let Some(callback) = params.event_callback {
                    let closure = Closure::<dyn FnMut()>::new(move || callback.invoke());
                    Reflect::set(
                        &object,
                        &JsValue::from_str("event_callback"),
                        &closure.into_js_value(),
                    )
                    .map_err(|err| reporter_error(js_error_message(err)))?;
                }
                self.function
                    .call3(&JsValue::NULL, &command, &target, &object)
            }
        };

        result
            .map(|_| ())
            .map_err(|err| reporter_error(format!("gtag threw: {}", js_error_message(err))))
    }
}

fn js_error_message(value: JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        format!("{}", error.message())
    } else if let Some(string) = value.as_string() {
        string
    } else {
        format!("{value:?}")
    }
}
