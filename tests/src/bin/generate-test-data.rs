//! Prints a random comment forest as JSON, eg. to seed a development server

use chrono::{Duration, TimeZone, Utc};
use kami_client::api::{Comment, CommentId};
use rand::Rng;

const NUM_ROOTS: usize = 12;
const MAX_REPLIES: usize = 4;
const MAX_DEPTH: usize = 3;
const COMMENT_WORD_COUNT: usize = 25;

const AUTHORS: &[&str] = &["innei", "alice", "bob", "carol", "dave"];

fn gen_comment(rng: &mut impl Rng, next_id: &mut u64, parent: Option<&CommentId>, depth: usize) -> Comment {
    *next_id += 1;
    let id = CommentId(format!("{:024x}", *next_id));
    let key = format!("#{next_id}");
    let num_replies = match depth < MAX_DEPTH {
        true => rng.gen_range(0..=MAX_REPLIES),
        false => 0,
    };
    let children = (0..num_replies)
        .map(|_| gen_comment(rng, next_id, Some(&id), depth + 1))
        .collect();
    let author = AUTHORS[rng.gen_range(0..AUTHORS.len())];
    Comment {
        parent: parent.cloned(),
        author: String::from(author),
        text: lipsum::lipsum_words(rng.gen_range(1..=COMMENT_WORD_COUNT)),
        created_at: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
            + Duration::minutes(rng.gen_range(0..60 * 24 * 365)),
        url: rng
            .gen_bool(0.3)
            .then(|| format!("https://{author}.example.org/")),
        avatar: None,
        key: Some(key),
        children,
        id,
    }
}

fn main() {
    let mut rng = rand::thread_rng();
    let mut next_id = 0;
    let forest = (0..NUM_ROOTS)
        .map(|_| gen_comment(&mut rng, &mut next_id, None, 0))
        .collect::<Vec<_>>();
    println!(
        "{}",
        serde_json::to_string_pretty(&forest).expect("serializing generated comments")
    );
}
