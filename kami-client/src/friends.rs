use rand::{seq::SliceRandom, Rng};

use crate::api::{Link, LinkState, LinkType};

/// How many friends the home page shows at most
pub const FRIENDS_SHOWN: usize = 20;

/// Approved, visible friend links
pub fn is_shown_friend(link: &Link) -> bool {
    link.link_type == LinkType::Friend && link.state == LinkState::Pass && !link.hide
}

/// Picks the friends to show, in random order
pub fn pick_friends<R: Rng + ?Sized>(links: Vec<Link>, rng: &mut R) -> Vec<Link> {
    let mut friends = links
        .into_iter()
        .filter(is_shown_friend)
        .collect::<Vec<_>>();
    friends.shuffle(rng);
    friends.truncate(FRIENDS_SHOWN);
    friends
}
