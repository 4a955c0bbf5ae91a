use crate::{
    api::{Comment, CommentId},
    CommentTree,
};

/// Markdown renderer used to display comment text.
///
/// For replies, the leading `@<id>` mention token is resolved through the
/// context, eg. to show the author of the comment being replied to.
pub trait Renderer {
    type Output;

    fn render(&self, text: &str, ctx: &RenderContext<'_>) -> Self::Output;
}

#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    tree: &'a CommentTree,

    /// Parent of the comment being rendered, if it is a reply
    mention: Option<&'a CommentId>,
}

impl<'a> RenderContext<'a> {
    pub fn new(tree: &'a CommentTree) -> RenderContext<'a> {
        RenderContext {
            tree,
            mention: None,
        }
    }

    /// Context for rendering `comment`, as produced by `display_text`
    pub fn for_comment(self, comment: &'a Comment) -> RenderContext<'a> {
        RenderContext {
            mention: comment
                .parent
                .as_ref()
                .filter(|p| comment.is_reply() && !p.0.is_empty()),
            ..self
        }
    }

    /// The id the text's leading mention token carries, if any
    pub fn mention(&self) -> Option<&'a CommentId> {
        self.mention
    }

    pub fn resolve_mention(&self, id: &str) -> Option<&'a Comment> {
        self.tree
            .find_by_id(&CommentId::new(id))
            .map(|n| n.comment())
    }
}

/// Text to hand to the renderer: replies get their parent mentioned first
pub fn display_text(comment: &Comment) -> String {
    match &comment.parent {
        Some(parent) if comment.is_reply() && !parent.0.is_empty() => {
            format!("@{parent} {}", comment.text)
        }
        _ => comment.text.clone(),
    }
}

/// Scheme-relative link to the host of an author's website
pub fn author_link(url: Option<&str>) -> Option<String> {
    let url = url::Url::parse(url?).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("//{host}:{port}"),
        None => format!("//{host}"),
    })
}

/// Renders to plain text, for terminals and logs.
///
/// When the context carries a mention, the matching leading token becomes
/// `@<author>`, or disappears when the mentioned comment is not loaded. The
/// rest of the text is kept as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    type Output = String;

    fn render(&self, text: &str, ctx: &RenderContext<'_>) -> String {
        let mention = match ctx.mention() {
            Some(m) => m,
            None => return text.to_string(),
        };
        let token = text
            .strip_prefix('@')
            .and_then(|rest| rest.split_once(' '));
        match token {
            Some((id, rest)) if id == mention.0 => match ctx.resolve_mention(id) {
                Some(c) => format!("@{} {rest}", c.author),
                None => rest.to_string(),
            },
            _ => text.to_string(),
        }
    }
}
