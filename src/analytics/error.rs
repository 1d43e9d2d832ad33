use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalyticsErrorCode {
    InvalidArgument,
    AppConfigRequired,
    ReportingFunctionNotSet,
    Timeout,
    Reporter,
}

impl AnalyticsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsErrorCode::InvalidArgument => "analytics/invalid-argument",
            AnalyticsErrorCode::AppConfigRequired => "analytics/app-config-required",
            AnalyticsErrorCode::ReportingFunctionNotSet => "analytics/reporting-function-not-set",
            AnalyticsErrorCode::Timeout => "analytics/timeout",
            AnalyticsErrorCode::Reporter => "analytics/reporter",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnalyticsError {
    pub code: AnalyticsErrorCode,
    message: String,
}

impl AnalyticsError {
    pub fn new(code: AnalyticsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// The bare message without the error code suffix.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for AnalyticsError {}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

pub fn invalid_argument(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::InvalidArgument, message)
}

pub fn app_config_required() -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::AppConfigRequired,
        "call set_app_config() first",
    )
}

pub fn reporting_function_not_set() -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::ReportingFunctionNotSet,
        "reporting function not set",
    )
}

pub fn timeout_error() -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::Timeout, "timeout")
}

pub fn reporter_error(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::Reporter, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_appends_code() {
        let err = timeout_error();
        assert_eq!(err.message(), "timeout");
        assert_eq!(err.to_string(), "timeout (analytics/timeout)");
    }
}
