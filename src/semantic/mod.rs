// src/semantic/mod.rs
//! Contract between the parse driver and semantic actions.
//!
//! The driver asks an [`ActionFactory`] for an action bound to a tree node
//! whenever a production slot carries an action id. Actions run against an
//! [`ActionContext`] and report failure by recording errors; the driver
//! checks [`SemanticRule::errors`] right after each run and stops at the
//! first one.

pub mod rules;
pub mod symbol;

use crate::{
    error::CompileError,
    parser::tree::{NodeId, ParseTree},
};
use symbol::SymbolTablePool;

/// Everything an action may read or mutate.
pub struct ActionContext<'a> {
    pub tree: &'a mut ParseTree,
    pub pool: &'a mut SymbolTablePool,
}

pub trait SemanticRule {
    fn execute(&mut self, cx: &mut ActionContext<'_>);

    fn errors(&self) -> &[CompileError];
}

/// Maps an action id and the node it binds to onto an executable action.
/// Returning `None` means the slot has nothing to run.
pub trait ActionFactory<A> {
    fn instantiate(&self, action: &A, node: NodeId) -> Option<Box<dyn SemanticRule>>;
}

impl<A, F> ActionFactory<A> for F
where
    F: Fn(&A, NodeId) -> Option<Box<dyn SemanticRule>>,
{
    fn instantiate(&self, action: &A, node: NodeId) -> Option<Box<dyn SemanticRule>> {
        self(action, node)
    }
}

/// Factory that never produces an action.
pub fn no_actions<A>(_: &A, _: NodeId) -> Option<Box<dyn SemanticRule>> {
    None
}

/// Adapts a fallible closure into a [`SemanticRule`] bound to `node`.
pub struct BoundRule<F> {
    node: NodeId,
    run: F,
    errors: Vec<CompileError>,
}

impl<F> BoundRule<F>
where
    F: FnMut(&mut ActionContext<'_>, NodeId) -> Result<(), CompileError> + 'static,
{
    pub fn new(node: NodeId, run: F) -> Self {
        Self {
            node,
            run,
            errors: Vec::new(),
        }
    }

    pub fn boxed(node: NodeId, run: F) -> Box<dyn SemanticRule> {
        Box::new(Self::new(node, run))
    }
}

impl<F> SemanticRule for BoundRule<F>
where
    F: FnMut(&mut ActionContext<'_>, NodeId) -> Result<(), CompileError>,
{
    fn execute(&mut self, cx: &mut ActionContext<'_>) {
        if let Err(e) = (self.run)(cx, self.node) {
            self.errors.push(e);
        }
    }

    fn errors(&self) -> &[CompileError] {
        &self.errors
    }
}
