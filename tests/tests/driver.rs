use std::time::{Duration, Instant};

use futures::{
    channel::{mpsc, oneshot},
    StreamExt,
};
use kami_client::{
    api::{CommentId, NewComment, Route},
    run_thread, CreateScope, RowState, ThreadAction, ThreadConfig,
};
use tests::*;

const WINDOW_MS: i64 = 200;

#[derive(Debug, PartialEq)]
struct Snapshot {
    states: Vec<(String, RowState)>,
}

#[tokio::test(flavor = "current_thread")]
async fn driver_reacts_to_actions_pushes_and_expiries() {
    let server = server_with_sample();
    let cfg = ThreadConfig {
        delete_confirm_window_ms: WINDOW_MS,
        ..config()
    };
    let thread = open_thread(&server, true, cfg).await;
    let hub = server.lock().await.feed();

    let (actions, actions_recv) = mpsc::unbounded();
    let (cancel, cancel_recv) = oneshot::channel();
    let (updates, mut updates_recv) = mpsc::unbounded();

    let driver = run_thread(thread, &hub, actions_recv, cancel_recv, move |t| {
        let states = t
            .view()
            .iter()
            .map(|(_, r)| (r.id().0.clone(), r.state))
            .collect();
        updates
            .unbounded_send(Snapshot { states })
            .expect("test script went away");
    });

    let script = async {
        let delete_requested = Instant::now();
        actions
            .unbounded_send(ThreadAction::RequestDelete(CommentId::new("3")))
            .unwrap();
        let snap = updates_recv.next().await.unwrap();
        assert!(snap
            .states
            .contains(&(String::from("3"), RowState::ConfirmingDelete)));

        // nobody confirms, so the request lapses on its own
        let snap = updates_recv.next().await.unwrap();
        assert!(delete_requested.elapsed() >= Duration::from_millis(WINDOW_MS as u64 / 2));
        assert!(snap.states.iter().all(|(_, s)| *s == RowState::Idle));

        // live comments from other visitors show up
        server
            .lock()
            .await
            .create(
                None,
                &CreateScope::Target(target()),
                NewComment::new("live").with_author("eve"),
                Route::Anonymous,
            )
            .unwrap();
        let snap = updates_recv.next().await.unwrap();
        assert_eq!(snap.states.len(), 4);

        // invalid submissions are reported, not sent
        actions
            .unbounded_send(ThreadAction::SubmitReply(
                CommentId::new("1"),
                NewComment::new("  "),
            ))
            .unwrap();
        updates_recv.next().await.unwrap();

        cancel.send(()).unwrap();
    };

    let (mut thread, ()) = futures::join!(driver, script);

    assert_eq!(thread.tree().len(), 4);
    let roots = thread
        .tree()
        .roots()
        .map(|n| n.comment().text.clone())
        .collect::<Vec<_>>();
    assert_eq!(roots, vec!["live", "comment 1", "comment 2"]);
    let notices = thread.take_notices();
    assert_eq!(notices.len(), 1);
    // the subscription went away with the driver
    assert_eq!(hub.num_subscribers(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn driver_stops_when_cancel_handle_is_dropped() {
    let server = server_with_sample();
    let thread = open_thread(&server, false, config()).await;
    let hub = server.lock().await.feed();
    let (_actions, actions_recv) = mpsc::unbounded::<ThreadAction>();
    let (cancel, cancel_recv) = oneshot::channel::<()>();
    drop(cancel);

    let mut num_updates = 0;
    let thread = run_thread(thread, &hub, actions_recv, cancel_recv, |_| num_updates += 1).await;
    assert_eq!(num_updates, 0);
    assert_eq!(thread.tree().to_forest(), sample_forest());
    assert_eq!(hub.num_subscribers(), 0);
}
