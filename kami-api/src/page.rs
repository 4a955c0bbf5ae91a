use crate::Comment;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub current_page: u32,
    pub total_page: u32,
    pub size: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// One page of top-level comments, each carrying its whole reply subtree
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentPage {
    pub data: Vec<Comment>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl CommentPage {
    pub fn has_next_page(&self) -> bool {
        self.pagination
            .as_ref()
            .map(|p| p.has_next_page)
            .unwrap_or(false)
    }
}
