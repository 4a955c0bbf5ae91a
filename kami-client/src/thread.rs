use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use crate::{
    api::{
        Comment, CommentCreated, CommentId, CommentPage, FeedMessage, NewComment, Pagination,
        Route, TargetId, Time,
    },
    Clock, CommentApi, CommentTree, CreateScope, SystemClock, ThreadConfig, ThreadError,
};

/// Transient UI state of one comment row
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RowState {
    Idle,
    Replying,
    ConfirmingDelete,
}

/// Everything the presentation layer can ask a thread to do
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ThreadAction {
    ToggleReply(CommentId),
    SubmitReply(CommentId, NewComment),
    SubmitComment(NewComment),
    RequestDelete(CommentId),
    ConfirmDelete(CommentId),
    CancelDelete(CommentId),
    LoadMore,
    Refresh,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PushOutcome {
    TopLevel,
    Nested,
    Dropped(DropReason),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DropReason {
    ForeignTarget,
    UnhandledKind,
    MissingId,
    SelfReference,
    ParentNotLoaded,
    AlreadyLoaded,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Short-lived message for the user, eg. a toast
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PageRequest {
    page: u32,
    size: u32,
}

/// Comment thread of one target: the loaded tree, plus the reply and delete
/// state of its rows.
///
/// All methods run to completion before the next one starts (they take
/// `&mut self`), which is what keeps push events, user actions and refreshes
/// from interleaving.
pub struct CommentThread<A> {
    target: TargetId,
    api: A,
    clock: Arc<dyn Clock>,
    config: ThreadConfig,
    is_owner: bool,

    tree: CommentTree,
    loaded: Option<PageRequest>,
    pagination: Option<Pagination>,

    /// At most one row is being replied to
    reply_target: Option<CommentId>,
    /// Rows waiting for delete confirmation, with the time the request lapses
    pending_deletes: HashMap<CommentId, Time>,
    notices: VecDeque<Notice>,
}

impl<A: CommentApi> CommentThread<A> {
    pub fn new(target: TargetId, api: A, config: ThreadConfig) -> CommentThread<A> {
        CommentThread {
            target,
            api,
            clock: Arc::new(SystemClock),
            config,
            is_owner: false,
            tree: CommentTree::new(),
            loaded: None,
            pagination: None,
            reply_target: None,
            pending_deletes: HashMap::new(),
            notices: VecDeque::new(),
        }
    }

    pub fn with_owner(mut self, is_owner: bool) -> CommentThread<A> {
        self.is_owner = is_owner;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> CommentThread<A> {
        self.clock = Arc::new(clock);
        self
    }

    /// Takes a page that was loaded by someone else, eg. during page render
    pub fn with_page(mut self, page: u32, page_data: CommentPage) -> CommentThread<A> {
        let size = page_data
            .pagination
            .as_ref()
            .map(|p| p.size)
            .unwrap_or(self.config.page_size);
        self.apply_page(PageRequest { page, size }, page_data);
        self
    }

    pub fn target(&self) -> &TargetId {
        &self.target
    }

    pub fn tree(&self) -> &CommentTree {
        &self.tree
    }

    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    /// Session changes, eg. on login or logout
    pub fn set_owner(&mut self, is_owner: bool) {
        self.is_owner = is_owner;
        if !is_owner {
            self.pending_deletes.clear();
        }
    }

    pub fn now(&self) -> Time {
        self.clock.now()
    }

    /// Switches to another target, forgetting everything about the current one
    pub fn set_target(&mut self, target: TargetId) {
        if target == self.target {
            return;
        }
        tracing::debug!(from = %self.target, to = %target, "switching comment thread target");
        self.target = target;
        self.tree = CommentTree::new();
        self.loaded = None;
        self.pagination = None;
        self.reply_target = None;
        self.pending_deletes.clear();
    }

    pub fn row_state(&self, id: &CommentId) -> RowState {
        if self.is_confirming(id) {
            RowState::ConfirmingDelete
        } else if self.reply_target.as_ref() == Some(id) {
            RowState::Replying
        } else {
            RowState::Idle
        }
    }

    pub fn reply_target(&self) -> Option<&CommentId> {
        self.reply_target.as_ref()
    }

    fn is_confirming(&self, id: &CommentId) -> bool {
        self.pending_deletes
            .get(id)
            .map(|lapses_at| *lapses_at > self.clock.now())
            .unwrap_or(false)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });
    }

    /// Surfaces a failure that was not already turned into a notice
    pub fn report_error(&mut self, err: &ThreadError) {
        if !matches!(err, ThreadError::Network(_)) {
            self.notify(NoticeLevel::Error, err.to_string());
        }
    }

    fn network_failure(&mut self, what: &str, err: anyhow::Error) -> ThreadError {
        tracing::warn!(?err, thread = %self.target, "{what} failed");
        self.notify(NoticeLevel::Error, format!("{what} failed: {err}"));
        ThreadError::Network(err)
    }

    pub fn on_feed_message(&mut self, msg: FeedMessage) -> PushOutcome {
        match msg {
            FeedMessage::CommentCreate(c) => self.on_push_event(c),
            FeedMessage::Other(kind) => {
                tracing::trace!(%kind, "ignoring unhandled gateway event");
                PushOutcome::Dropped(DropReason::UnhandledKind)
            }
        }
    }

    /// Files a comment announced by the push channel into the tree.
    ///
    /// Events that cannot be placed are dropped, the next refresh brings the
    /// tree back in line with the server.
    pub fn on_push_event(&mut self, event: CommentCreated) -> PushOutcome {
        let outcome = self.place_pushed(event.target, event.comment);
        if let PushOutcome::Dropped(reason) = &outcome {
            tracing::debug!(?reason, thread = %self.target, "dropped pushed comment");
        }
        outcome
    }

    fn place_pushed(&mut self, target: TargetId, mut comment: Comment) -> PushOutcome {
        if target != self.target {
            return PushOutcome::Dropped(DropReason::ForeignTarget);
        }
        if comment.id.0.is_empty() {
            return PushOutcome::Dropped(DropReason::MissingId);
        }
        // an empty parent reference means no parent
        if comment.parent.as_ref().map(|p| p.0.is_empty()).unwrap_or(false) {
            comment.parent = None;
        }
        match comment.parent.clone() {
            None => match self.tree.insert_top_level(comment) {
                true => PushOutcome::TopLevel,
                false => PushOutcome::Dropped(DropReason::AlreadyLoaded),
            },
            Some(parent) if parent == comment.id => {
                PushOutcome::Dropped(DropReason::SelfReference)
            }
            Some(parent) if !self.tree.contains(&parent) => {
                PushOutcome::Dropped(DropReason::ParentNotLoaded)
            }
            Some(parent) => match self.tree.insert_under_parent(&parent, comment) {
                true => PushOutcome::Nested,
                false => PushOutcome::Dropped(DropReason::AlreadyLoaded),
            },
        }
    }

    /// Opens the reply box on `id`, or closes it if it already was open
    pub fn toggle_reply(&mut self, id: CommentId) {
        if self.reply_target.as_ref() == Some(&id) {
            self.reply_target = None;
        } else {
            // a row is either replying or confirming a delete, never both
            self.pending_deletes.remove(&id);
            self.reply_target = Some(id);
        }
    }

    pub async fn submit_reply(
        &mut self,
        parent: CommentId,
        comment: NewComment,
    ) -> Result<(), ThreadError> {
        self.submit(CreateScope::Reply(parent.clone()), comment)
            .await?;
        if self.reply_target.as_ref() == Some(&parent) {
            self.reply_target = None;
        }
        self.refresh_after_write().await;
        Ok(())
    }

    /// Posts a new top-level comment on the current target
    pub async fn submit_comment(&mut self, comment: NewComment) -> Result<(), ThreadError> {
        self.submit(CreateScope::Target(self.target.clone()), comment)
            .await?;
        self.refresh_after_write().await;
        Ok(())
    }

    // The created comment is not inserted here: it comes back through the
    // push channel and the refresh, inserting it too would show it twice.
    async fn submit(
        &mut self,
        scope: CreateScope,
        mut comment: NewComment,
    ) -> Result<(), ThreadError> {
        comment
            .validate(self.is_owner)
            .map_err(ThreadError::Validation)?;
        let route = Route::for_session(self.is_owner);
        match self.api.create(&scope, &comment, route).await {
            Ok(created) => {
                tracing::debug!(id = %created.id, ?scope, "comment submitted");
                self.notify(NoticeLevel::Success, "comment posted");
                Ok(())
            }
            Err(err) => Err(self.network_failure("posting comment", err)),
        }
    }

    pub fn request_delete(&mut self, id: CommentId) -> Result<(), ThreadError> {
        if !self.is_owner {
            return Err(ThreadError::NotAuthorized);
        }
        if !self.tree.contains(&id) {
            return Err(ThreadError::UnknownComment(id));
        }
        if self.reply_target.as_ref() == Some(&id) {
            self.reply_target = None;
        }
        let lapses_at = self.clock.now() + self.config.delete_confirm_window();
        self.pending_deletes.insert(id, lapses_at);
        Ok(())
    }

    /// Returns whether `id` was waiting for a confirmation
    pub fn cancel_delete(&mut self, id: &CommentId) -> bool {
        let was_confirming = self.is_confirming(id);
        self.pending_deletes.remove(id);
        was_confirming
    }

    /// Deletes `id` and reloads the first page.
    ///
    /// The row goes back to idle right away, whatever the outcome.
    pub async fn confirm_delete(&mut self, id: CommentId) -> Result<(), ThreadError> {
        let was_confirming = self.is_confirming(&id);
        self.pending_deletes.remove(&id);
        if !was_confirming {
            return Err(ThreadError::NotConfirming(id));
        }
        if let Err(err) = self.api.delete(&id).await {
            return Err(self.network_failure("deleting comment", err));
        }
        tracing::debug!(%id, "comment deleted");
        self.notify(NoticeLevel::Success, "comment deleted");
        let size = self.current_size();
        // failures are already reported as notices
        let _ = self.load_page(1, size, true).await;
        Ok(())
    }

    /// Forgets delete requests that were not confirmed in time, returning
    /// their rows
    pub fn expire_pending_deletes(&mut self) -> Vec<CommentId> {
        let now = self.clock.now();
        let mut expired = Vec::new();
        self.pending_deletes.retain(|id, lapses_at| {
            let keep = *lapses_at > now;
            if !keep {
                expired.push(id.clone());
            }
            keep
        });
        expired
    }

    /// When the earliest pending delete request lapses
    pub fn next_expiry(&self) -> Option<Time> {
        self.pending_deletes.values().min().copied()
    }

    /// Loads a page of comments, replacing the whole tree.
    ///
    /// Without `force`, asking for the page that is already loaded does
    /// nothing.
    pub async fn load_page(&mut self, page: u32, size: u32, force: bool) -> Result<(), ThreadError> {
        let req = PageRequest { page, size };
        if !force && self.loaded == Some(req) {
            return Ok(());
        }
        match self.api.list(&self.target, Some(page), Some(size)).await {
            Ok(data) => {
                self.apply_page(req, data);
                Ok(())
            }
            Err(err) => Err(self.network_failure("loading comments", err)),
        }
    }

    /// Reloads the current page
    pub async fn refresh(&mut self) -> Result<(), ThreadError> {
        let page = self.loaded.map(|l| l.page).unwrap_or(1);
        let size = self.current_size();
        self.load_page(page, size, true).await
    }

    pub async fn load_more(&mut self) -> Result<(), ThreadError> {
        if !self.has_more() {
            return Ok(());
        }
        let page = self.loaded.map(|l| l.page).unwrap_or(0) + 1;
        let size = self.current_size();
        self.load_page(page, size, false).await
    }

    pub fn has_more(&self) -> bool {
        self.pagination
            .as_ref()
            .map(|p| p.has_next_page)
            .unwrap_or(false)
    }

    pub async fn dispatch(&mut self, action: ThreadAction) -> Result<(), ThreadError> {
        match action {
            ThreadAction::ToggleReply(id) => {
                self.toggle_reply(id);
                Ok(())
            }
            ThreadAction::SubmitReply(parent, comment) => self.submit_reply(parent, comment).await,
            ThreadAction::SubmitComment(comment) => self.submit_comment(comment).await,
            ThreadAction::RequestDelete(id) => self.request_delete(id),
            ThreadAction::ConfirmDelete(id) => self.confirm_delete(id).await,
            ThreadAction::CancelDelete(id) => {
                self.cancel_delete(&id);
                Ok(())
            }
            ThreadAction::LoadMore => self.load_more().await,
            ThreadAction::Refresh => self.refresh().await,
        }
    }

    async fn refresh_after_write(&mut self) {
        // the write itself succeeded, refresh failures are already reported as notices
        let _ = self.refresh().await;
    }

    fn current_size(&self) -> u32 {
        self.loaded
            .map(|l| l.size)
            .unwrap_or(self.config.page_size)
    }

    fn apply_page(&mut self, req: PageRequest, data: CommentPage) {
        tracing::debug!(
            thread = %self.target,
            page = req.page,
            num_roots = data.data.len(),
            "loaded comment page"
        );
        self.tree.replace_all(data.data);
        self.pagination = data.pagination;
        self.loaded = Some(req);
    }
}
