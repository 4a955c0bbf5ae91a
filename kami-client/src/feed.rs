use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{channel::mpsc, Stream};
use parking_lot::Mutex;

use crate::api::{EventKind, FeedMessage};

/// Source of live gateway events
pub trait PushChannel {
    fn subscribe(&self, kind: EventKind) -> Subscription;
}

/// Live subscription to one event kind.
///
/// Dropping it unsubscribes: the channel notices the closed receiver and
/// forgets about it.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<FeedMessage>,
}

impl Stream for Subscription {
    type Item = FeedMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<FeedMessage>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

/// In-process fan-out of gateway events to subscriptions.
///
/// Whatever transport receives gateway frames feeds them in here.
#[derive(Clone, Debug, Default)]
pub struct FeedHub(Arc<Mutex<Vec<(EventKind, mpsc::UnboundedSender<FeedMessage>)>>>);

impl FeedHub {
    pub fn new() -> FeedHub {
        FeedHub::default()
    }

    pub fn publish(&self, msg: FeedMessage) {
        let kind = msg.kind();
        // Note: this also prunes subscriptions that were dropped
        self.0.lock().retain(|(k, s)| match Some(*k) == kind {
            true => s.unbounded_send(msg.clone()).is_ok(),
            false => !s.is_closed(),
        });
    }

    /// Decodes and publishes a raw gateway frame, dropping undecodable ones
    pub fn publish_frame(&self, frame: &[u8]) {
        match FeedMessage::parse(frame) {
            Ok(msg) => self.publish(msg),
            Err(err) => tracing::debug!(?err, "dropping malformed gateway frame"),
        }
    }

    pub fn num_subscribers(&self) -> usize {
        let mut subs = self.0.lock();
        subs.retain(|(_, s)| !s.is_closed());
        subs.len()
    }
}

impl PushChannel for FeedHub {
    fn subscribe(&self, kind: EventKind) -> Subscription {
        let (sender, receiver) = mpsc::unbounded();
        self.0.lock().push((kind, sender));
        Subscription { receiver }
    }
}

#[cfg(test)]
mod tests {
    use futures::{executor::block_on, StreamExt};

    use super::*;

    const FRAME: &[u8] = br#"{"type":"COMMENT_CREATE","data":{"id":"c1","author":"a","text":"t","created":"2022-05-01T10:00:00Z","ref":"p"}}"#;

    #[test]
    fn delivers_to_matching_subscriptions() {
        let hub = FeedHub::new();
        let mut a = hub.subscribe(EventKind::CommentCreate);
        let mut b = hub.subscribe(EventKind::CommentCreate);
        hub.publish_frame(FRAME);
        hub.publish_frame(br#"{"type":"VISITOR_ONLINE","data":{}}"#);
        hub.publish_frame(b"garbage");
        let expected = FeedMessage::parse(FRAME).unwrap();
        assert_eq!(block_on(a.next()), Some(expected.clone()));
        assert_eq!(block_on(b.next()), Some(expected));
        drop(hub);
        assert_eq!(block_on(a.next()), None);
    }

    #[test]
    fn dropping_unsubscribes() {
        let hub = FeedHub::new();
        let a = hub.subscribe(EventKind::CommentCreate);
        let _b = hub.subscribe(EventKind::CommentCreate);
        assert_eq!(hub.num_subscribers(), 2);
        drop(a);
        assert_eq!(hub.num_subscribers(), 1);
        hub.publish_frame(FRAME);
        assert_eq!(hub.num_subscribers(), 1);
    }
}
