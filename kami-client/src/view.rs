use crate::{
    api::{Comment, CommentId, NewComment},
    render::{author_link, display_text},
    tree::NodeRef,
    CommentApi, CommentThread, RowState, ThreadAction,
};

/// Snapshot of a thread, ready to be displayed
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadView {
    pub rows: Vec<RowView>,

    /// Whether delete buttons should be offered at all
    pub can_delete: bool,
    pub has_more: bool,
    pub is_empty: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RowView {
    /// The comment itself, its replies are in `children`
    pub comment: Comment,
    pub state: RowState,

    /// Written by the site owner
    pub is_author: bool,
    pub author_link: Option<String>,

    /// Text to pass to the renderer, mention included
    pub text: String,
    pub children: Vec<RowView>,
}

impl ThreadView {
    pub fn load_more(&self) -> Option<ThreadAction> {
        self.has_more.then(|| ThreadAction::LoadMore)
    }

    /// All rows, depth-first
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RowView)> {
        let mut stack = self.rows.iter().rev().map(|r| (0, r)).collect::<Vec<_>>();
        std::iter::from_fn(move || {
            let (depth, row) = stack.pop()?;
            stack.extend(row.children.iter().rev().map(|c| (depth + 1, c)));
            Some((depth, row))
        })
    }
}

impl RowView {
    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }

    pub fn toggle_reply(&self) -> ThreadAction {
        ThreadAction::ToggleReply(self.id().clone())
    }

    pub fn submit_reply(&self, comment: NewComment) -> ThreadAction {
        ThreadAction::SubmitReply(self.id().clone(), comment)
    }

    pub fn request_delete(&self) -> ThreadAction {
        ThreadAction::RequestDelete(self.id().clone())
    }

    pub fn confirm_delete(&self) -> ThreadAction {
        ThreadAction::ConfirmDelete(self.id().clone())
    }

    pub fn cancel_delete(&self) -> ThreadAction {
        ThreadAction::CancelDelete(self.id().clone())
    }
}

impl<A: CommentApi> CommentThread<A> {
    pub fn view(&self) -> ThreadView {
        let rows = self.tree().roots().map(|n| self.row_view(n)).collect();
        ThreadView {
            rows,
            can_delete: self.is_owner(),
            has_more: self.has_more(),
            is_empty: self.tree().is_empty(),
        }
    }

    fn row_view(&self, node: NodeRef<'_>) -> RowView {
        let c = node.comment();
        let comment = Comment {
            children: Vec::new(),
            ..c.clone()
        };
        RowView {
            state: self.row_state(&c.id),
            is_author: self.config().owner_name.as_deref() == Some(c.author.as_str()),
            author_link: author_link(c.url.as_deref()),
            text: display_text(c),
            children: node.children().map(|n| self.row_view(n)).collect(),
            comment,
        }
    }
}
