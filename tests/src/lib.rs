use std::sync::Arc;

use chrono::{TimeZone, Utc};
use kami_client::{
    api::{Comment, CommentId, CommentPage, TargetId},
    CommentThread, ThreadConfig,
};
use kami_mock_server::{MockClient, MockServer};
use tokio::sync::Mutex;

pub const OWNER: &str = "innei";

#[macro_export]
macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = std::panic::AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

pub fn target() -> TargetId {
    TargetId::new("posts/programming/hello")
}

pub fn comment(id: &str, parent: Option<&str>, children: Vec<Comment>) -> Comment {
    Comment {
        id: CommentId::new(id),
        parent: parent.map(CommentId::new),
        author: format!("author of {id}"),
        text: format!("comment {id}"),
        created_at: Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap(),
        url: None,
        avatar: None,
        key: None,
        children,
    }
}

/// `[{1}, {2, [{3}]}]`
pub fn sample_forest() -> Vec<Comment> {
    vec![
        comment("1", None, vec![]),
        comment("2", None, vec![comment("3", Some("2"), vec![])]),
    ]
}

pub fn server_with_sample() -> Arc<Mutex<MockServer>> {
    let mut server = MockServer::new(OWNER);
    server.seed(&target(), sample_forest());
    Arc::new(Mutex::new(server))
}

pub fn config() -> ThreadConfig {
    ThreadConfig {
        owner_name: Some(String::from(OWNER)),
        ..ThreadConfig::default()
    }
}

/// Thread on `target()`, with its first page loaded
pub async fn open_thread(
    server: &Arc<Mutex<MockServer>>,
    as_owner: bool,
    config: ThreadConfig,
) -> CommentThread<MockClient> {
    let api = match as_owner {
        true => MockClient::as_owner(server.clone()).await,
        false => MockClient::new(server.clone(), None),
    };
    let mut thread = CommentThread::new(target(), api, config).with_owner(as_owner);
    let size = thread.config().page_size;
    thread
        .load_page(1, size, true)
        .await
        .expect("loading first page");
    server.lock().await.take_requests();
    thread
}

/// What the server would answer for the first `size` roots
pub async fn server_listing(server: &Arc<Mutex<MockServer>>, size: u32) -> CommentPage {
    let mut server = server.lock().await;
    let page = server
        .list(&target(), Some(1), Some(size))
        .expect("listing comments");
    server.take_requests();
    page
}
