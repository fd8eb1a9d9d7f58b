// src/parser/tree.rs
//! Arena-backed parse tree. Nodes own their children by index; the parent
//! link is an index too, so nothing forms an ownership cycle.

use serde::Serialize;

use crate::{
    grammar::{Grammar, Sign},
    semantic::symbol::ValueType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Attribute bag written by semantic actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    /// Literal text of the matched token.
    pub lexical: Option<String>,
    /// Source line of the matched (or inherited) token.
    pub line: Option<usize>,
    pub code: Vec<String>,
    pub ty: Option<ValueType>,
    pub id: Option<String>,
    pub length: Option<usize>,
    /// Function defined under this node.
    pub fun: Option<String>,
    pub num: Option<i64>,
    pub names: Vec<String>,
    pub flag: Option<bool>,
    pub op: Option<String>,
    pub add: Option<NodeId>,
    pub mul: Option<NodeId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub sign: Sign,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Index of this node in its parent's `children`.
    pub position: usize,
    pub attrs: Attributes,
}

impl Node {
    fn new(sign: Sign, parent: Option<NodeId>, position: usize) -> Self {
        Self {
            sign,
            children: Vec::new(),
            parent,
            position,
            attrs: Attributes::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ParseTree {
    pub fn new(root: Sign) -> Self {
        Self {
            nodes: vec![Node::new(root, None, 0)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node that is not attached to the tree.
    pub fn alloc(&mut self, sign: Sign) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(sign, None, 0));
        id
    }

    /// Append a new last child under `parent`.
    pub fn push_child(&mut self, parent: NodeId, sign: Sign) -> NodeId {
        let id = NodeId(self.nodes.len());
        let position = self.nodes[parent.0].children.len();
        self.nodes.push(Node::new(sign, Some(parent), position));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn attrs(&self, id: NodeId) -> &Attributes {
        &self.nodes[id.0].attrs
    }

    pub fn attrs_mut(&mut self, id: NodeId) -> &mut Attributes {
        &mut self.nodes[id.0].attrs
    }

    pub fn sign(&self, id: NodeId) -> Sign {
        self.nodes[id.0].sign
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child(&self, id: NodeId, i: usize) -> Option<NodeId> {
        self.nodes[id.0].children.get(i).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// The sibling `back` positions to the left of `id`.
    pub fn sibling(&self, id: NodeId, back: usize) -> Option<NodeId> {
        let node = &self.nodes[id.0];
        let parent = node.parent?;
        let pos = node.position.checked_sub(back)?;
        self.child(parent, pos)
    }

    /// `id`'s parent, grandparent, and so on up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Terminal leaves below the root, left to right.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.sign.is_terminal() {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Literal text of every terminal leaf, left to right.
    pub fn leaf_texts(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.nodes[id.0].attrs.lexical.as_deref())
            .collect()
    }

    /// Indented dump, one node per line.
    pub fn render<A>(&self, grammar: &Grammar<A>) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id.0];
            for _ in 0..depth {
                out.push_str("  ");
            }
            out.push_str(grammar.sign_name(node.sign));
            if let Some(text) = &node.attrs.lexical {
                out.push_str(&format!(" `{text}`"));
            }
            if let Some(line) = node.attrs.line.filter(|_| node.sign.is_terminal()) {
                out.push_str(&format!(" @{line}"));
            }
            if let Some(ty) = node.attrs.ty {
                out.push_str(&format!(" : {ty}"));
            }
            if node.sign.is_non_terminal() && node.children.is_empty() {
                out.push_str(" -> empty");
            }
            out.push('\n');
            for &c in node.children.iter().rev() {
                stack.push((c, depth + 1));
            }
        }
        out
    }

    /// Flat JSON listing of the nodes reachable from the root.
    pub fn to_json<A>(&self, grammar: &Grammar<A>) -> serde_json::Value {
        let mut nodes = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            nodes.push(serde_json::json!({
                "id": id.0,
                "sign": grammar.sign_name(node.sign),
                "parent": node.parent.map(|p| p.0),
                "children": node.children.iter().map(|c| c.0).collect::<Vec<_>>(),
                "attrs": node.attrs,
            }));
            stack.extend(node.children.iter().rev().copied());
        }
        serde_json::json!({ "root": self.root.0, "nodes": nodes })
    }
}
