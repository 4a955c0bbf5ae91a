use std::{collections::HashMap, fmt};

use crate::api::{Comment, CommentId};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct NodeIdx(usize);

#[derive(Clone, Debug)]
struct Node {
    /// Always has empty `children`, the structure lives in `Node::children`
    comment: Comment,
    children: Vec<NodeIdx>,
}

/// Ordered forest of comments, indexed by id.
///
/// Nodes live in an arena and point to their children by index. `index` maps
/// each id to the first node carrying it in depth-first pre-order (roots in
/// order, a node's subtree before its later siblings), so lookups agree with a
/// recursive first-match search even if the server ever sends a duplicated id.
/// Nodes are never removed one by one: the whole forest is replaced instead.
#[derive(Clone, Debug, Default)]
pub struct CommentTree {
    nodes: Vec<Node>,
    roots: Vec<NodeIdx>,
    index: HashMap<CommentId, NodeIdx>,
}

impl CommentTree {
    pub fn new() -> CommentTree {
        CommentTree::default()
    }

    pub fn from_forest(roots: Vec<Comment>) -> CommentTree {
        let mut tree = CommentTree::new();
        tree.replace_all(roots);
        tree
    }

    /// Drops the current forest and takes `roots` as given, nested children
    /// included.
    pub fn replace_all(&mut self, roots: Vec<Comment>) {
        self.nodes.clear();
        self.roots.clear();
        self.index.clear();
        self.roots.reserve(roots.len());
        for c in roots {
            let idx = self.ingest(c);
            self.roots.push(idx);
        }
    }

    /// Prepends `comment` to the roots.
    ///
    /// Returns `false` without touching the tree if `comment` (or anything in
    /// its subtree) carries an id that is already loaded.
    pub fn insert_top_level(&mut self, comment: Comment) -> bool {
        if !self.is_fresh(&comment) {
            return false;
        }
        let idx = self.ingest(comment);
        self.roots.insert(0, idx);
        true
    }

    /// Prepends `comment` to the children of the node with id `parent`.
    ///
    /// Returns `false` without touching the tree if `parent` is not loaded or
    /// if `comment` carries an id that is already loaded.
    pub fn insert_under_parent(&mut self, parent: &CommentId, comment: Comment) -> bool {
        let parent = match self.index.get(parent) {
            Some(idx) => *idx,
            None => return false,
        };
        if !self.is_fresh(&comment) {
            return false;
        }
        let idx = self.ingest(comment);
        self.nodes[parent.0].children.insert(0, idx);
        true
    }

    pub fn find_by_id(&self, id: &CommentId) -> Option<NodeRef<'_>> {
        self.index.get(id).map(|idx| NodeRef {
            tree: self,
            idx: *idx,
        })
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.index.contains_key(id)
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.roots.iter().map(move |idx| NodeRef {
            tree: self,
            idx: *idx,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of comments in the whole forest
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Rebuilds the nested representation
    pub fn to_forest(&self) -> Vec<Comment> {
        self.roots().map(|n| n.to_comment()).collect()
    }

    // Stores `comment` and its subtree in pre-order, returning the subtree root
    fn ingest(&mut self, mut comment: Comment) -> NodeIdx {
        let children = std::mem::take(&mut comment.children);
        let idx = NodeIdx(self.nodes.len());
        self.index.entry(comment.id.clone()).or_insert(idx);
        self.nodes.push(Node {
            comment,
            children: Vec::with_capacity(children.len()),
        });
        for c in children {
            let child = self.ingest(c);
            self.nodes[idx.0].children.push(child);
        }
        idx
    }

    fn is_fresh(&self, comment: &Comment) -> bool {
        !self.index.contains_key(&comment.id) && comment.children.iter().all(|c| self.is_fresh(c))
    }
}

#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a CommentTree,
    idx: NodeIdx,
}

impl<'a> NodeRef<'a> {
    /// The comment itself, its `children` field is always empty
    pub fn comment(&self) -> &'a Comment {
        &self.tree.nodes[self.idx.0].comment
    }

    pub fn id(&self) -> &'a CommentId {
        &self.comment().id
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> {
        let tree = self.tree;
        tree.nodes[self.idx.0]
            .children
            .iter()
            .map(move |idx| NodeRef { tree, idx: *idx })
    }

    pub fn num_children(&self) -> usize {
        self.tree.nodes[self.idx.0].children.len()
    }

    pub fn to_comment(&self) -> Comment {
        let mut res = self.comment().clone();
        res.children = self.children().map(|c| c.to_comment()).collect();
        res
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", self.id())
            .field("num_children", &self.num_children())
            .finish()
    }
}
