use futures::StreamExt;
use kami_client::{
    api::{CommentId, EventKind, NewComment},
    CreateScope, DropReason, NoticeLevel, PushChannel, PushOutcome, RowState, ThreadError,
};
use kami_mock_server::Request;
use tests::*;

fn id(s: &str) -> CommentId {
    CommentId::new(s)
}

#[tokio::test(flavor = "current_thread")]
async fn pushed_reply_lands_under_its_parent() {
    let server = server_with_sample();
    let mut thread = open_thread(&server, false, config()).await;
    let mut feed = server.lock().await.feed().subscribe(EventKind::CommentCreate);

    let reply = server
        .lock()
        .await
        .create(
            None,
            &CreateScope::Reply(id("3")),
            NewComment::new("four").with_author("eve"),
            kami_client::api::Route::Anonymous,
        )
        .expect("creating reply");

    let msg = feed.next().await.expect("feed closed");
    assert_eq!(thread.on_feed_message(msg), PushOutcome::Nested);

    let node = thread.tree().find_by_id(&reply.id).expect("reply not in tree");
    assert_eq!(node.comment().parent, Some(id("3")));
    let parent = thread.tree().find_by_id(&id("3")).unwrap();
    assert_eq!(parent.children().next().unwrap().id(), &reply.id);

    // a refresh gives the same picture
    let before = thread.tree().to_forest();
    thread.refresh().await.unwrap();
    assert_eq!(thread.tree().to_forest(), before);
    assert_eq!(before, server_listing(&server, 10).await.data);
}

#[tokio::test(flavor = "current_thread")]
async fn reply_to_unloaded_parent_is_dropped() {
    let server = server_with_sample();
    let mut thread = open_thread(&server, false, config()).await;
    let mut feed = server.lock().await.feed().subscribe(EventKind::CommentCreate);

    // the parent exists, but appeared after the thread loaded
    let orphan = comment("5", Some("missing"), vec![]);
    server.lock().await.seed(&target(), vec![comment("missing", None, vec![])]);
    let msg = kami_client::api::FeedMessage::CommentCreate(kami_client::api::CommentCreated {
        comment: orphan,
        target: target(),
    });
    server.lock().await.feed().publish(msg);

    let msg = feed.next().await.unwrap();
    assert_eq!(
        thread.on_feed_message(msg),
        PushOutcome::Dropped(DropReason::ParentNotLoaded)
    );
    assert_eq!(thread.tree().to_forest(), sample_forest());
    assert!(thread.take_notices().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn submit_reply_refetches_without_inserting() {
    let server = server_with_sample();
    let mut thread = open_thread(&server, false, config()).await;

    thread.toggle_reply(id("3"));
    assert_eq!(thread.row_state(&id("3")), RowState::Replying);
    thread
        .submit_reply(id("3"), NewComment::new("hi").with_author("bob"))
        .await
        .unwrap();

    assert_eq!(thread.row_state(&id("3")), RowState::Idle);
    assert_eq!(
        server.lock().await.take_requests(),
        vec![
            Request::Create {
                scope: CreateScope::Reply(id("3")),
                route: kami_client::api::Route::Anonymous,
            },
            Request::List {
                target: target(),
                page: Some(1),
                size: Some(10),
            },
        ]
    );
    // the new reply comes from the refetch
    let three = thread.tree().find_by_id(&id("3")).unwrap();
    assert_eq!(three.num_children(), 1);
    assert_eq!(three.children().next().unwrap().comment().text, "hi");
    assert_eq!(thread.take_notices()[0].level, NoticeLevel::Success);
}

#[tokio::test(flavor = "current_thread")]
async fn owner_comments_through_owner_route() {
    let server = server_with_sample();
    let mut thread = open_thread(&server, true, config()).await;

    thread.submit_comment(NewComment::new("welcome")).await.unwrap();

    let requests = server.lock().await.take_requests();
    assert_eq!(
        requests[0],
        Request::Create {
            scope: CreateScope::Target(target()),
            route: kami_client::api::Route::Owner,
        }
    );
    let view = thread.view();
    let newest = &view.rows[0];
    assert_eq!(newest.comment.text, "welcome");
    assert!(newest.is_author);
    assert_eq!(view.rows.len(), 3);
}

#[tokio::test(flavor = "current_thread")]
async fn anonymous_cannot_delete() {
    let server = server_with_sample();
    let mut thread = open_thread(&server, false, config()).await;
    assert!(matches!(
        thread.request_delete(id("1")),
        Err(ThreadError::NotAuthorized)
    ));
    assert!(!thread.view().can_delete);
    assert!(server.lock().await.requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn confirmed_delete_removes_subtree_and_reloads() {
    let server = server_with_sample();
    let mut thread = open_thread(&server, true, config()).await;

    thread.request_delete(id("2")).unwrap();
    assert_eq!(thread.row_state(&id("2")), RowState::ConfirmingDelete);
    thread.confirm_delete(id("2")).await.unwrap();

    assert_eq!(thread.row_state(&id("2")), RowState::Idle);
    assert_eq!(thread.next_expiry(), None);
    assert_eq!(thread.tree().to_forest(), vec![comment("1", None, vec![])]);
    assert!(!thread.tree().contains(&id("3")));
    assert_eq!(server.lock().await.test_num_comments(), 1);
    assert_eq!(thread.take_notices()[0].level, NoticeLevel::Success);
}

#[tokio::test(flavor = "current_thread")]
async fn failures_leave_everything_in_place() {
    let server = server_with_sample();
    let mut thread = open_thread(&server, true, config()).await;
    server.lock().await.set_failing(true);

    thread.toggle_reply(id("1"));
    let res = thread
        .submit_reply(id("1"), NewComment::new("hi"))
        .await;
    assert!(matches!(res, Err(ThreadError::Network(_))));
    assert_eq!(thread.row_state(&id("1")), RowState::Replying);

    thread.request_delete(id("2")).unwrap();
    let res = thread.confirm_delete(id("2")).await;
    assert!(matches!(res, Err(ThreadError::Network(_))));
    assert_eq!(thread.row_state(&id("2")), RowState::Idle);

    assert!(thread.refresh().await.is_err());
    assert_eq!(thread.tree().to_forest(), sample_forest());
    let notices = thread.take_notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
}

#[tokio::test(flavor = "current_thread")]
async fn load_more_walks_pages() {
    let server = server_with_sample();
    {
        let mut s = server.lock().await;
        for i in 0..4 {
            s.create(
                None,
                &CreateScope::Target(target()),
                NewComment::new(format!("extra {i}")).with_author("x"),
                kami_client::api::Route::Anonymous,
            )
            .unwrap();
        }
    }
    let cfg = kami_client::ThreadConfig {
        page_size: 4,
        ..config()
    };
    let mut thread = open_thread(&server, false, cfg).await;
    assert!(thread.view().has_more);
    assert_eq!(thread.tree().len(), 4);

    thread.load_more().await.unwrap();
    assert!(!thread.view().has_more);
    assert_eq!(thread.tree().to_forest(), sample_forest());

    // nothing left to load
    thread.load_more().await.unwrap();
    assert_eq!(server.lock().await.take_requests().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn dropped_subscription_is_released() {
    let server = server_with_sample();
    let hub = server.lock().await.feed();
    let feed = hub.subscribe(EventKind::CommentCreate);
    assert_eq!(hub.num_subscribers(), 1);
    drop(feed);
    assert_eq!(hub.num_subscribers(), 0);
}
