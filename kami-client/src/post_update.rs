/// The fields of a post whose changes the reader gets told about
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSnapshot {
    pub id: String,
    pub slug: String,
    pub category_id: String,

    /// Slug of the category, when the category was embedded
    #[serde(default)]
    pub category_slug: Option<String>,

    #[serde(default)]
    pub hide: bool,

    #[serde(default)]
    pub is_deleted: bool,
    pub text: String,

    #[serde(default)]
    pub summary: Option<String>,
}

impl PostSnapshot {
    /// Reader-facing path, if the category slug is known
    pub fn path(&self) -> Option<String> {
        let category = self.category_slug.as_deref()?;
        Some(format!("/posts/{category}/{}", self.slug))
    }
}

/// What a reader of a post should see after it changed
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PostChange {
    Unchanged,

    /// The post moved, replace the location with `path`
    Moved { path: String },

    /// Deleted or hidden, send the reader back to the post list
    Gone,

    /// Edited in place
    Updated,
}

/// Where to send readers of a post that went away
pub const POST_LIST_PATH: &str = "/posts";

/// Compares each new version of the post being read to the previous one.
///
/// The first snapshot, and the first snapshot of another post, only become
/// the baseline.
#[derive(Clone, Debug, Default)]
pub struct PostWatcher {
    before: Option<PostSnapshot>,
}

impl PostWatcher {
    pub fn new() -> PostWatcher {
        PostWatcher::default()
    }

    pub fn observe(&mut self, post: PostSnapshot) -> PostChange {
        let change = match &self.before {
            Some(before) if before.id == post.id => classify(before, &post),
            _ => PostChange::Unchanged,
        };
        if change != PostChange::Unchanged {
            tracing::debug!(post = %post.id, ?change, "post changed");
        }
        self.before = Some(post);
        change
    }
}

fn classify(before: &PostSnapshot, after: &PostSnapshot) -> PostChange {
    if before == after {
        return PostChange::Unchanged;
    }
    if before.category_id != after.category_id || before.slug != after.slug {
        if let Some(path) = after.path() {
            return PostChange::Moved { path };
        }
    }
    if after.hide || after.is_deleted {
        return PostChange::Gone;
    }
    PostChange::Updated
}
