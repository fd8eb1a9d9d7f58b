// src/parser/driver.rs
//! Stack-driven predictive parser. Builds the parse tree top-down while
//! running the semantic actions bound to each production.

use std::time::Instant;

use super::{
    tables::ParseTable,
    tree::{NodeId, ParseTree},
};
use crate::{
    error::CompileError,
    grammar::{Grammar, Sign},
    semantic::{ActionContext, ActionFactory, SemanticRule, symbol::SymbolTablePool},
    token::Token,
};

/// Work item on the parse stack.
pub enum StackItem {
    Node(NodeId),
    Action(Box<dyn SemanticRule>),
}

/// Input position as seen by the driver. `sign` is `None` for a token kind
/// the grammar does not know.
struct Lookahead<'t> {
    sign: Option<Sign>,
    text: &'t str,
    line: usize,
}

pub struct Parser<'g, A, F> {
    grammar: &'g Grammar<A>,
    table: &'g ParseTable,
    factory: F,
}

impl<'g, A, F> Parser<'g, A, F>
where
    F: ActionFactory<A>,
{
    pub fn new(grammar: &'g Grammar<A>, table: &'g ParseTable, factory: F) -> Self {
        Self {
            grammar,
            table,
            factory,
        }
    }

    pub fn grammar(&self) -> &Grammar<A> {
        self.grammar
    }

    /// Parse `tokens` to completion. The end marker is appended here, on the
    /// last token's line. Returns the tree, or the first error raised by the
    /// parse or by an action.
    pub fn execute(
        &self,
        tokens: &[Token],
        pool: &mut SymbolTablePool,
    ) -> Result<ParseTree, CompileError> {
        let instant = Instant::now();

        let end_line = tokens.last().map_or(1, |t| t.line);
        let input: Vec<Lookahead<'_>> = tokens
            .iter()
            .map(|t| Lookahead {
                sign: self.grammar.terminal(&t.kind),
                text: &t.text,
                line: t.line,
            })
            .chain(std::iter::once(Lookahead {
                sign: Some(Sign::Pound),
                text: "",
                line: end_line,
            }))
            .collect();

        let mut tree = ParseTree::new(Sign::NonTerminal(self.grammar.start()));
        let sentinel = tree.alloc(Sign::Pound);
        let mut stack = vec![StackItem::Node(sentinel), StackItem::Node(tree.root())];
        let mut cursor = 0usize;

        while let Some(item) = stack.pop() {
            let current = &input[cursor];
            let id = match item {
                StackItem::Action(mut rule) => {
                    run(rule.as_mut(), &mut tree, pool)?;
                    continue;
                }
                StackItem::Node(id) => id,
            };

            match tree.sign(id) {
                Sign::NonTerminal(nt) => {
                    let index = current
                        .sign
                        .and_then(|s| self.table.get(nt, s))
                        .ok_or_else(|| syntax_error(current))?;
                    let production = self.grammar.production(index);
                    if production.children.len() != production.right.len() {
                        return Err(CompileError::SemanticRuleArity {
                            production: self.grammar.render_production(index),
                        });
                    }
                    log::trace!(
                        "line {}: expand `{}`",
                        current.line,
                        self.grammar.render_production(index)
                    );

                    if let Some(mut rule) = production
                        .start
                        .as_ref()
                        .and_then(|a| self.factory.instantiate(a, id))
                    {
                        run(rule.as_mut(), &mut tree, pool)?;
                    }

                    let children: Vec<NodeId> = production
                        .right
                        .iter()
                        .map(|&s| tree.push_child(id, s))
                        .collect();

                    if let Some(rule) = production
                        .end
                        .as_ref()
                        .and_then(|a| self.factory.instantiate(a, id))
                    {
                        stack.push(StackItem::Action(rule));
                    }
                    for (&child, action) in children.iter().zip(&production.children).rev() {
                        stack.push(StackItem::Node(child));
                        if let Some(rule) = action
                            .as_ref()
                            .and_then(|a| self.factory.instantiate(a, child))
                        {
                            stack.push(StackItem::Action(rule));
                        }
                    }
                }
                Sign::Empty => {}
                sign => {
                    if current.sign != Some(sign) {
                        return Err(syntax_error(current));
                    }
                    if id == sentinel {
                        log::debug!(
                            "parsed {} tokens into {} nodes in {} us",
                            tokens.len(),
                            tree.len() - 1,
                            instant.elapsed().as_micros()
                        );
                        return Ok(tree);
                    }
                    let attrs = tree.attrs_mut(id);
                    attrs.lexical = Some(current.text.to_string());
                    attrs.line = Some(current.line);
                    cursor += 1;
                }
            }
        }

        Err(syntax_error(&input[cursor]))
    }
}

fn syntax_error(at: &Lookahead<'_>) -> CompileError {
    CompileError::Syntax {
        text: at.text.to_string(),
        line: at.line,
    }
}

/// Execute one action and surface the first error it recorded.
fn run(
    rule: &mut dyn SemanticRule,
    tree: &mut ParseTree,
    pool: &mut SymbolTablePool,
) -> Result<(), CompileError> {
    let mut cx = ActionContext { tree, pool };
    rule.execute(&mut cx);
    match rule.errors().first() {
        Some(e) => Err(e.clone()),
        None => Ok(()),
    }
}
