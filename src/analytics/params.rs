//! Typed parameter records forwarded to gtag.
//!
//! See <https://developers.google.com/analytics/devguides/collection/gtagjs/> for the parameter
//! names understood by the analytics backend.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::analytics::error::{invalid_argument, AnalyticsResult};

/// Application metadata required before screen views can be reported.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_installer_id: Option<String>,
}

impl AppConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn with_app_version(mut self, app_version: impl Into<String>) -> Self {
        self.app_version = Some(app_version.into());
        self
    }

    pub fn with_app_installer_id(mut self, installer_id: impl Into<String>) -> Self {
        self.app_installer_id = Some(installer_id.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }
}

/// Optional event parameters; unknown keys go to `extra` and are flattened into the same object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_interaction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<EventItem>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventOptions {
    pub fn with_value(mut self, value: impl Into<Number>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Non-finite values leave `value` unset.
    pub fn with_value_f64(mut self, value: f64) -> Self {
        self.value = Number::from_f64(value);
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
            Custom(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)*
                    $name::Custom(value) => value.as_str(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($text => $name::$variant,)*
                    other => $name::Custom(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::from(value.as_str())
            }
        }
    };
}

named_enum!(
    /// Recommended gtag event names.
    EventAction {
        AddPaymentInfo => "add_payment_info",
        AddToCart => "add_to_cart",
        AddToWishlist => "add_to_wishlist",
        BeginCheckout => "begin_checkout",
        CheckoutProgress => "checkout_progress",
        GenerateLead => "generate_lead",
        Login => "login",
        Purchase => "purchase",
        Refund => "refund",
        RemoveFromCart => "remove_from_cart",
        Search => "search",
        SelectContent => "select_content",
        SetCheckoutOption => "set_checkout_option",
        Share => "share",
        SignUp => "sign_up",
        ViewItem => "view_item",
        ViewItemList => "view_item_list",
        ViewPromotion => "view_promotion",
        ViewSearchResults => "view_search_results",
    }
);

named_enum!(EventCategory {
    Engagement => "engagement",
    Ecommerce => "ecommerce",
});

named_enum!(EventLabel {
    Method => "method",
    SearchTerm => "search_term",
    ContentType => "content_type",
});

/// Serializes a record into a gtag parameter object.
pub fn to_params<T>(value: &T) -> AnalyticsResult<Map<String, Value>>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(invalid_argument(format!(
            "gtag parameters must be an object, got {other}"
        ))),
        Err(err) => Err(invalid_argument(format!(
            "failed to serialize gtag parameters: {err}"
        ))),
    }
}
