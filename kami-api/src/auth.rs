use std::fmt;

#[derive(Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

// Keep tokens out of logs
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Which endpoint family a write goes through.
///
/// Both create the same comment, the owner variant lives under the privileged
/// `master` prefix and needs a bearer token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    Anonymous,
    Owner,
}

impl Route {
    pub fn for_session(is_owner: bool) -> Route {
        match is_owner {
            true => Route::Owner,
            false => Route::Anonymous,
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Route::Owner)
    }
}
