use std::fmt;

use crate::{Error, Time, MAX_AUTHOR_LEN, MAX_TEXT_LEN};

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> CommentId {
        CommentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the post, note or page a comment thread is attached to
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> TargetId {
        TargetId(id.into())
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,

    /// Comment this one replies to, `None` for top-level comments
    #[serde(default, deserialize_with = "parent_ref", skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentId>,

    pub author: String,
    pub text: String,
    #[serde(rename = "created")]
    pub created_at: Time,

    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,

    /// Human-readable ordinal, eg. `#12`
    #[serde(default)]
    pub key: Option<String>,

    /// Replies, in server order for loaded pages
    #[serde(default)]
    pub children: Vec<Comment>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent.is_some()
    }
}

// The server sometimes sends the parent as a bare id and sometimes embeds the
// whole parent comment, we only ever keep the id.
fn parent_ref<'de, D>(deserializer: D) -> Result<Option<CommentId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    struct Embedded {
        id: CommentId,
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum ParentRef {
        Id(CommentId),
        Embedded(Embedded),
    }

    let parent: Option<ParentRef> = serde::Deserialize::deserialize(deserializer)?;
    Ok(match parent {
        None => None,
        Some(ParentRef::Id(id)) => Some(id),
        Some(ParentRef::Embedded(e)) => Some(e.id),
    })
}

/// Body of a comment creation request
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub text: String,
}

impl NewComment {
    pub fn new(text: impl Into<String>) -> NewComment {
        NewComment {
            author: None,
            mail: None,
            url: None,
            text: text.into(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> NewComment {
        self.author = Some(author.into());
        self
    }

    /// Normalizes the submission in place and checks it can be sent.
    ///
    /// The site owner's identity comes from the session, so only anonymous
    /// submissions need an author name.
    pub fn validate(&mut self, as_owner: bool) -> Result<(), Error> {
        if let Some(name) = self.author.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::InvalidComment(String::from("no author name provided")));
            }
            if name.chars().count() > MAX_AUTHOR_LEN {
                return Err(Error::InvalidComment(String::from("author name too long")));
            }
            crate::validate_string(&name)?;
            self.author = Some(name);
        } else if !as_owner {
            return Err(Error::InvalidComment(String::from("no author name provided")));
        }

        self.text = self.text.trim().to_string();
        if self.text.is_empty() {
            return Err(Error::InvalidComment(String::from("no content provided")));
        }
        if self.text.chars().count() > MAX_TEXT_LEN {
            return Err(Error::InvalidComment(format!(
                "content too long (max {MAX_TEXT_LEN} characters)"
            )));
        }
        crate::validate_string(&self.text)?;

        if let Some(mail) = self.mail.take() {
            let mail = mail.trim().to_lowercase();
            if !mail.is_empty() {
                if !mail.contains('@') {
                    return Err(Error::InvalidComment(String::from("invalid email")));
                }
                self.mail = Some(mail);
            }
        }

        Ok(())
    }
}
