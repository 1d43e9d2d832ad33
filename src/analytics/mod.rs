mod client;
mod config;
pub mod error;
mod error_props;
mod params;
mod reporter;

pub use client::{EventCompletion, GtagClient};
pub use config::{ClientOptions, ClientOptionsOverride, DEFAULT_EVENT_TIMEOUT};
pub use error::{AnalyticsError, AnalyticsErrorCode, AnalyticsResult};
pub use error_props::{normalize as normalize_error, ReportedError};
pub use params::{
    to_params, AppConfig, EventAction, EventCategory, EventItem, EventLabel, EventOptions,
    Localization,
};
pub use reporter::{EventCallback, GtagCall, GtagCommand, GtagParams, GtagTarget, ReportingFunction};
