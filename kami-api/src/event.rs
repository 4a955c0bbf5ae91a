use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{Comment, TargetId};

/// Gateway event types a client can subscribe to
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    CommentCreate,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CommentCreate => "COMMENT_CREATE",
        }
    }

    pub fn from_name(name: &str) -> Option<EventKind> {
        match name {
            "COMMENT_CREATE" => Some(EventKind::CommentCreate),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentCreated {
    #[serde(flatten)]
    pub comment: Comment,

    /// Target the new comment was posted on
    #[serde(rename = "ref")]
    pub target: TargetId,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FeedMessage {
    CommentCreate(CommentCreated),

    /// Gateway event this client does not handle, kept by name only
    Other(String),
}

impl FeedMessage {
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            FeedMessage::CommentCreate(_) => Some(EventKind::CommentCreate),
            FeedMessage::Other(_) => None,
        }
    }

    /// Parses a raw gateway frame, `{"type": ..., "data": ...}`
    pub fn parse(frame: &[u8]) -> anyhow::Result<FeedMessage> {
        let mut data: serde_json::Value =
            serde_json::from_slice(frame).context("parsing gateway frame")?;
        let kind = data
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| anyhow!("gateway frame type is not a string"))?
            .to_string();
        let payload = data
            .get_mut("data")
            .map(serde_json::Value::take)
            .ok_or_else(|| anyhow!("gateway frame {kind} has no data"))?;
        Ok(match EventKind::from_name(&kind) {
            Some(EventKind::CommentCreate) => FeedMessage::CommentCreate(
                serde_json::from_value(payload)
                    .with_context(|| format!("parsing {kind} payload"))?,
            ),
            None => FeedMessage::Other(kind),
        })
    }

    pub fn to_frame(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            FeedMessage::CommentCreate(c) => json!({
                "type": EventKind::CommentCreate.as_str(),
                "data": c,
            }),
            FeedMessage::Other(kind) => json!({
                "type": kind,
                "data": null,
            }),
        })
        .expect("serializing gateway frame")
    }
}
