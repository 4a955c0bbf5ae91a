use async_trait::async_trait;

use crate::api::{Comment, CommentId, CommentPage, NewComment, Route, TargetId};

/// What a new comment is attached to
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CreateScope {
    Target(TargetId),
    Reply(CommentId),
}

/// Remote comment storage, as seen by a thread
#[async_trait]
pub trait CommentApi {
    async fn list(
        &mut self,
        target: &TargetId,
        page: Option<u32>,
        size: Option<u32>,
    ) -> anyhow::Result<CommentPage>;

    async fn create(
        &mut self,
        scope: &CreateScope,
        comment: &NewComment,
        route: Route,
    ) -> anyhow::Result<Comment>;

    async fn delete(&mut self, id: &CommentId) -> anyhow::Result<()>;
}
