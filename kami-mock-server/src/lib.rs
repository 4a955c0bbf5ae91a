use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use kami_client::{
    api::{
        AuthToken, Comment, CommentCreated, CommentId, CommentPage, Error, FeedMessage,
        NewComment, Pagination, Route, TargetId, Time,
    },
    CommentApi, CreateScope, FeedHub,
};
use tokio::sync::Mutex;

/// Call received by the mock server, in arrival order
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    List {
        target: TargetId,
        page: Option<u32>,
        size: Option<u32>,
    },
    Create {
        scope: CreateScope,
        route: Route,
    },
    Delete(CommentId),
}

#[derive(Clone, Debug)]
struct Stored {
    /// Always has empty `children`
    comment: Comment,
    target: TargetId,
}

/// In-memory comment server with a live feed
pub struct MockServer {
    owner_name: String,
    owner_token: AuthToken,
    /// In creation order
    comments: Vec<Stored>,
    feed: FeedHub,
    epoch: Time,
    num_created: u64,
    failing: bool,
    requests: Vec<Request>,
}

impl MockServer {
    pub fn new(owner_name: impl Into<String>) -> MockServer {
        MockServer {
            owner_name: owner_name.into(),
            owner_token: AuthToken(uuid::Uuid::new_v4().simple().to_string()),
            comments: Vec::new(),
            feed: FeedHub::new(),
            epoch: chrono::Utc::now(),
            num_created: 0,
            failing: false,
            requests: Vec::new(),
        }
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn owner_token(&self) -> AuthToken {
        self.owner_token.clone()
    }

    /// Live feed of everything created on this server
    pub fn feed(&self) -> FeedHub {
        self.feed.clone()
    }

    /// Makes every following call fail (or succeed again)
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    /// Return the current number of comments, replies included
    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    /// Loads a forest of comments on `target` without publishing anything.
    ///
    /// `forest` is in listing order, ie. newest first at each level.
    pub fn seed(&mut self, target: &TargetId, forest: Vec<Comment>) {
        for c in forest.into_iter().rev() {
            self.seed_one(target, None, c);
        }
    }

    fn seed_one(&mut self, target: &TargetId, parent: Option<CommentId>, mut c: Comment) {
        let children = std::mem::take(&mut c.children);
        if parent.is_some() {
            c.parent = parent;
        }
        let id = c.id.clone();
        self.comments.push(Stored {
            comment: c,
            target: target.clone(),
        });
        for ch in children.into_iter().rev() {
            self.seed_one(target, Some(id.clone()), ch);
        }
    }

    fn check_available(&self) -> Result<(), Error> {
        match self.failing {
            true => Err(Error::Unknown(String::from("server is failing on purpose"))),
            false => Ok(()),
        }
    }

    fn is_owner(&self, token: Option<&AuthToken>) -> bool {
        token == Some(&self.owner_token)
    }

    /// Top-level comments of `target`, newest first, each with its replies
    /// (also newest first)
    pub fn list(
        &mut self,
        target: &TargetId,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<CommentPage, Error> {
        self.requests.push(Request::List {
            target: target.clone(),
            page,
            size,
        });
        self.check_available()?;

        let page = page.unwrap_or(1).max(1);
        let size = size.unwrap_or(10).max(1);
        let roots = self
            .comments
            .iter()
            .rev()
            .filter(|s| &s.target == target && s.comment.parent.is_none())
            .collect::<Vec<_>>();
        let total = roots.len() as u64;
        let total_page = u32::try_from(roots.len()).unwrap_or(u32::MAX).div_ceil(size);
        let data = roots
            .into_iter()
            .skip((page - 1).saturating_mul(size) as usize)
            .take(size as usize)
            .map(|s| self.with_replies(&s.comment))
            .collect();
        Ok(CommentPage {
            data,
            pagination: Some(Pagination {
                total,
                current_page: page,
                total_page,
                size,
                has_next_page: page < total_page,
                has_prev_page: page > 1,
            }),
        })
    }

    fn with_replies(&self, c: &Comment) -> Comment {
        let children = self
            .comments
            .iter()
            .rev()
            .filter(|s| s.comment.parent.as_ref() == Some(&c.id))
            .map(|s| self.with_replies(&s.comment))
            .collect();
        Comment {
            children,
            ..c.clone()
        }
    }

    pub fn create(
        &mut self,
        token: Option<&AuthToken>,
        scope: &CreateScope,
        mut comment: NewComment,
        route: Route,
    ) -> Result<Comment, Error> {
        self.requests.push(Request::Create {
            scope: scope.clone(),
            route,
        });
        self.check_available()?;

        if route.is_owner() && !self.is_owner(token) {
            return Err(Error::PermissionDenied);
        }
        comment.validate(route.is_owner())?;

        let (target, parent) = match scope {
            CreateScope::Target(t) => (t.clone(), None),
            CreateScope::Reply(p) => {
                let parent = self
                    .comments
                    .iter()
                    .find(|s| &s.comment.id == p)
                    .ok_or_else(|| Error::NotFound(format!("comment {p}")))?;
                (parent.target.clone(), Some(p.clone()))
            }
        };

        self.num_created += 1;
        let author = match route {
            Route::Owner => self.owner_name.clone(),
            Route::Anonymous => comment.author.unwrap_or_default(),
        };
        let created = Comment {
            id: CommentId(uuid::Uuid::new_v4().simple().to_string()),
            parent,
            author,
            text: comment.text,
            created_at: self.epoch + chrono::Duration::seconds(self.num_created as i64),
            url: comment.url,
            avatar: None,
            key: Some(format!("#{}", self.num_created)),
            children: Vec::new(),
        };
        self.comments.push(Stored {
            comment: created.clone(),
            target: target.clone(),
        });
        tracing::debug!(id = %created.id, on = %target, "mock server created comment");
        self.feed.publish(FeedMessage::CommentCreate(CommentCreated {
            comment: created.clone(),
            target,
        }));
        Ok(created)
    }

    /// Deletes `id` along with all its replies
    pub fn delete(&mut self, token: Option<&AuthToken>, id: &CommentId) -> Result<(), Error> {
        self.requests.push(Request::Delete(id.clone()));
        self.check_available()?;

        if !self.is_owner(token) {
            return Err(Error::PermissionDenied);
        }
        if !self.comments.iter().any(|s| &s.comment.id == id) {
            return Err(Error::NotFound(format!("comment {id}")));
        }
        let mut removed = HashSet::new();
        removed.insert(id.clone());
        // parents are always stored before their replies
        for s in &self.comments {
            if let Some(p) = &s.comment.parent {
                if removed.contains(p) {
                    removed.insert(s.comment.id.clone());
                }
            }
        }
        self.comments.retain(|s| !removed.contains(&s.comment.id));
        Ok(())
    }
}

/// Connection to a shared mock server, logged in as the owner or not
#[derive(Clone)]
pub struct MockClient {
    server: Arc<Mutex<MockServer>>,
    token: Option<AuthToken>,
}

impl MockClient {
    pub fn new(server: Arc<Mutex<MockServer>>, token: Option<AuthToken>) -> MockClient {
        MockClient { server, token }
    }

    pub async fn as_owner(server: Arc<Mutex<MockServer>>) -> MockClient {
        let token = server.lock().await.owner_token();
        MockClient::new(server, Some(token))
    }
}

#[async_trait]
impl CommentApi for MockClient {
    async fn list(
        &mut self,
        target: &TargetId,
        page: Option<u32>,
        size: Option<u32>,
    ) -> anyhow::Result<CommentPage> {
        Ok(self.server.lock().await.list(target, page, size)?)
    }

    async fn create(
        &mut self,
        scope: &CreateScope,
        comment: &NewComment,
        route: Route,
    ) -> anyhow::Result<Comment> {
        Ok(self
            .server
            .lock()
            .await
            .create(self.token.as_ref(), scope, comment.clone(), route)?)
    }

    async fn delete(&mut self, id: &CommentId) -> anyhow::Result<()> {
        Ok(self.server.lock().await.delete(self.token.as_ref(), id)?)
    }
}
