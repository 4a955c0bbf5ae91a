mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

mod config;
pub use config::{ClientConfig, ThreadConfig, DEFAULT_DELETE_CONFIRM_WINDOW_MS, DEFAULT_PAGE_SIZE};

mod driver;
pub use driver::run_thread;

mod error;
pub use error::ThreadError;

mod feed;
pub use feed::{FeedHub, PushChannel, Subscription};

pub mod friends;

mod http;
pub use http::{Endpoint, HttpApi, Method};

pub mod link_card;

pub mod render;
pub use render::{PlainRenderer, RenderContext, Renderer};

pub mod post_update;
pub use post_update::{PostChange, PostSnapshot, PostWatcher};

mod service;
pub use service::{CommentApi, CreateScope};

mod thread;
pub use thread::{
    CommentThread, DropReason, Notice, NoticeLevel, PushOutcome, RowState, ThreadAction,
};

mod tree;
pub use tree::{CommentTree, NodeRef};

mod view;
pub use view::{RowView, ThreadView};

pub mod api {
    pub use kami_api::*;
}
