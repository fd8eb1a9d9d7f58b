// src/parser/mod.rs
pub mod driver;
pub mod tables;
pub mod tree;

pub use driver::{Parser, StackItem};
pub use tables::{ParseTable, PredictiveTable};
pub use tree::{Attributes, Node, NodeId, ParseTree};
