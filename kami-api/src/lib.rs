use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{Comment, CommentId, NewComment, TargetId};

mod error;
pub use error::Error;

mod event;
pub use event::{CommentCreated, EventKind, FeedMessage};

mod link;
pub use link::{Link, LinkState, LinkType};

mod page;
pub use page::{CommentPage, Pagination};

mod auth;
pub use auth::{AuthToken, Route};

pub const MAX_AUTHOR_LEN: usize = 50;
pub const MAX_TEXT_LEN: usize = 5000;

// All strings sent to the server go through this, the server rejects null bytes anyway
pub(crate) fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(s.to_string()));
    }
    Ok(())
}
