use crate::api::AuthToken;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_DELETE_CONFIRM_WINDOW_MS: i64 = 8000;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ThreadConfig {
    pub page_size: u32,

    /// How long a delete request waits for confirmation before being dropped
    pub delete_confirm_window_ms: i64,

    /// Display name of the site owner, their comments get flagged in the view
    pub owner_name: Option<String>,
}

impl ThreadConfig {
    pub fn delete_confirm_window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.delete_confirm_window_ms)
    }
}

impl Default for ThreadConfig {
    fn default() -> ThreadConfig {
        ThreadConfig {
            page_size: DEFAULT_PAGE_SIZE,
            delete_confirm_window_ms: DEFAULT_DELETE_CONFIRM_WINDOW_MS,
            owner_name: None,
        }
    }
}

/// Where the API lives and who we are to it
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ClientConfig {
    pub host: String,

    /// Present iff logged in as the site owner
    #[serde(default)]
    pub token: Option<AuthToken>,
}

impl ClientConfig {
    pub fn anonymous(host: impl Into<String>) -> ClientConfig {
        ClientConfig {
            host: host.into(),
            token: None,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.token.is_some()
    }
}
