use crate::api::{self, CommentId};

#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    /// Submission rejected locally, nothing was sent
    #[error("invalid submission: {0}")]
    Validation(#[source] api::Error),

    /// The API call failed, state was left as it was
    #[error("request failed: {0:#}")]
    Network(anyhow::Error),

    #[error("only the site owner can do this")]
    NotAuthorized,

    #[error("comment {0} is not loaded")]
    UnknownComment(CommentId),

    #[error("comment {0} is not waiting for a delete confirmation")]
    NotConfirming(CommentId),
}
