use serde::{Deserialize, Serialize};

/// Query string accepted by `GET /`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IndexQuery {
    /// Message left by a failed write, shown as a banner.
    pub error: Option<String>,
}

/// JSON body returned by API-style endpoints.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub mod country {
    use super::*;

    /// Form posted to `/add`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CountryAdd {
        /// Free text matched against the country names.
        pub country: Option<String>,
    }

    /// Form posted to `/remove`.
    ///
    /// Both fields are kept as text so that a missing or malformed value is
    /// reported by the handler instead of the extractor.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CountryRemove {
        pub country_code: Option<String>,
        pub user_id: Option<String>,
    }
}

pub mod user {
    use super::*;

    /// Marker value of [`UserSwitch::add`] asking for the new user form.
    pub const ADD_NEW: &str = "new";

    /// Form posted to `/user` by the user tabs.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserSwitch {
        pub add: Option<String>,
        pub user: Option<String>,
    }

    impl UserSwitch {
        pub fn wants_new_user(&self) -> bool {
            self.add.as_deref() == Some(ADD_NEW)
        }
    }

    /// Form posted to `/new`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: Option<String>,
        pub color: Option<String>,
    }
}
