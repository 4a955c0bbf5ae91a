use futures::{
    channel::{mpsc, oneshot},
    future, pin_mut, select, FutureExt, StreamExt,
};

use crate::{
    api::EventKind, CommentApi, CommentThread, PushChannel, PushOutcome, ThreadAction,
    ThreadError,
};

async fn sleep_for(d: chrono::Duration) {
    let d = d.to_std().unwrap_or(std::time::Duration::from_secs(0));
    if let Err(err) = wasm_timer::Delay::new(d).await {
        tracing::warn!(?err, "timer failed, waking up early");
    }
}

/// Runs `thread` until `cancel` fires (or its sender goes away), then hands
/// it back.
///
/// Push events, actions from the view and pending-delete expiries are handled
/// one at a time, in the order they arrive. `on_update` is called after each
/// of them, eg. to redraw. The push subscription only lives as long as this
/// function runs.
pub async fn run_thread<A, P, F>(
    mut thread: CommentThread<A>,
    channel: &P,
    actions: mpsc::UnboundedReceiver<ThreadAction>,
    cancel: oneshot::Receiver<()>,
    mut on_update: F,
) -> CommentThread<A>
where
    A: CommentApi,
    P: PushChannel + ?Sized,
    F: FnMut(&mut CommentThread<A>),
{
    let mut feed = channel.subscribe(EventKind::CommentCreate).fuse();
    let mut actions = actions.fuse();
    let mut cancel = cancel.fuse();
    tracing::debug!(thread = %thread.target(), "comment thread driver started");

    loop {
        let expiry = match thread.next_expiry() {
            Some(t) => sleep_for(t - thread.now()).left_future(),
            None => future::pending::<()>().right_future(),
        }
        .fuse();
        pin_mut!(expiry);

        select! {
            _ = cancel => break,
            _ = expiry => {
                let expired = thread.expire_pending_deletes();
                if expired.is_empty() {
                    continue;
                }
                tracing::trace!(?expired, "delete confirmations lapsed");
            }
            msg = feed.next() => match msg {
                Some(msg) => {
                    if let PushOutcome::Dropped(reason) = thread.on_feed_message(msg) {
                        tracing::trace!(?reason, "push event had no effect");
                        continue;
                    }
                }
                None => {
                    tracing::warn!("push channel closed, live updates stopped");
                    continue;
                }
            },
            action = actions.next() => match action {
                Some(action) => {
                    tracing::trace!(?action, "handling thread action");
                    match thread.dispatch(action).await {
                        Ok(()) => (),
                        // already reported
                        Err(ThreadError::Network(_)) => (),
                        Err(err) => thread.report_error(&err),
                    }
                }
                None => {
                    tracing::debug!("no more thread actions can come in");
                    continue;
                }
            },
            complete => break,
        }

        on_update(&mut thread);
    }

    tracing::debug!(thread = %thread.target(), "comment thread driver stopped");
    thread
}
