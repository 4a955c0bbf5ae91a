use futures::{FutureExt, StreamExt};
use kami_client::{
    api::{EventKind, NewComment, Route},
    CreateScope, PushChannel, PushOutcome,
};
use tests::*;

/// One comment posted by a visitor: on the target itself, or as a reply to
/// the n-th comment created so far
#[derive(Clone, Copy, Debug)]
enum Post {
    TopLevel,
    Reply(u8),
}

impl From<(bool, u8)> for Post {
    fn from((is_reply, n): (bool, u8)) -> Post {
        match is_reply {
            true => Post::Reply(n),
            false => Post::TopLevel,
        }
    }
}

async fn pushes_match_refetch(posts: Vec<(bool, u8)>) {
    let server = server_with_sample();
    let cfg = kami_client::ThreadConfig {
        page_size: 1000,
        ..config()
    };
    let mut thread = open_thread(&server, false, cfg).await;
    let mut feed = server.lock().await.feed().subscribe(EventKind::CommentCreate);

    let mut ids = vec![
        kami_client::api::CommentId::new("1"),
        kami_client::api::CommentId::new("2"),
        kami_client::api::CommentId::new("3"),
    ];
    for p in posts {
        let scope = match Post::from(p) {
            Post::TopLevel => CreateScope::Target(target()),
            Post::Reply(n) => CreateScope::Reply(ids[n as usize % ids.len()].clone()),
        };
        let created = server
            .lock()
            .await
            .create(None, &scope, NewComment::new("hey").with_author("v"), Route::Anonymous)
            .expect("creating comment");
        ids.push(created.id);

        let msg = feed
            .next()
            .now_or_never()
            .expect("push was not delivered right away")
            .expect("feed closed");
        let expected = match scope {
            CreateScope::Target(_) => PushOutcome::TopLevel,
            CreateScope::Reply(_) => PushOutcome::Nested,
        };
        assert_eq!(thread.on_feed_message(msg), expected);
    }

    // every parent was loaded, so pushes alone rebuilt what the server has
    let pushed = thread.tree().to_forest();
    assert_eq!(pushed, server_listing(&server, 1000).await.data);
    thread.refresh().await.unwrap();
    assert_eq!(thread.tree().to_forest(), pushed);
}

do_tokio_test!(push_then_refetch_agree, Vec<(bool, u8)>, pushes_match_refetch);
