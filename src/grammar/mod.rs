// src/grammar/mod.rs
//! Grammar model: interned terminal/non-terminal alphabets, productions with
//! their semantic-action wiring, and a start symbol.

use hashbrown::{HashMap, HashSet};
use serde::Serialize;

use crate::error::CompileError;

pub mod cminus;

/// A grammar symbol. `Terminal`/`NonTerminal` carry dense indices into the
/// owning [`Grammar`]'s alphabets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Sign {
    Terminal(usize),
    NonTerminal(usize),
    /// Epsilon.
    Empty,
    /// End of input.
    Pound,
}

impl Sign {
    pub fn is_terminal(self) -> bool {
        matches!(self, Sign::Terminal(_))
    }

    pub fn is_non_terminal(self) -> bool {
        matches!(self, Sign::NonTerminal(_))
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Sign::Empty)
    }
}

/// One production `left -> right`, plus the action ids run around it.
///
/// `children[i]` runs right before `right[i]` is matched or expanded, `start`
/// runs before any child is created and `end` after the last child is fully
/// reduced. The driver requires `children.len() == right.len()`.
#[derive(Debug, Clone)]
pub struct Production<A> {
    pub left: usize,
    pub right: Vec<Sign>,
    pub start: Option<A>,
    pub end: Option<A>,
    pub children: Vec<Option<A>>,
}

impl<A> Production<A> {
    /// Production with no actions attached.
    pub fn new(left: usize, right: Vec<Sign>) -> Self {
        let children = right.iter().map(|_| None).collect();
        Self {
            left,
            right,
            start: None,
            end: None,
            children,
        }
    }

    /// Same left side and same right-hand signs; actions are ignored.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.left == other.left && self.right == other.right
    }
}

#[derive(Debug, Clone)]
pub struct Grammar<A> {
    terminals: Vec<String>,
    non_terminals: Vec<String>,
    terminal_ids: HashMap<String, usize>,
    non_terminal_ids: HashMap<String, usize>,
    productions: Vec<Production<A>>,
    start: usize,
}

impl<A> Grammar<A> {
    pub fn builder() -> GrammarBuilder<A> {
        GrammarBuilder::new()
    }

    /// Assemble a grammar from already-resolved parts. Nothing is checked
    /// here; the table builder rejects signs that do not fit the alphabets.
    pub fn from_parts(
        terminals: Vec<String>,
        non_terminals: Vec<String>,
        start: usize,
        productions: Vec<Production<A>>,
    ) -> Self {
        let terminal_ids = terminals
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let non_terminal_ids = non_terminals
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self {
            terminals,
            non_terminals,
            terminal_ids,
            non_terminal_ids,
            productions,
            start,
        }
    }

    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &[String] {
        &self.non_terminals
    }

    pub fn productions(&self) -> &[Production<A>] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production<A> {
        &self.productions[index]
    }

    /// Index of the start non-terminal.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn terminal(&self, name: &str) -> Option<Sign> {
        self.terminal_ids.get(name).map(|&i| Sign::Terminal(i))
    }

    pub fn non_terminal(&self, name: &str) -> Option<Sign> {
        self.non_terminal_ids.get(name).map(|&i| Sign::NonTerminal(i))
    }

    /// Productions whose left side is `nt`, with their indices.
    pub fn productions_of(&self, nt: usize) -> impl Iterator<Item = (usize, &Production<A>)> {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.left == nt)
    }

    pub fn sign_name(&self, sign: Sign) -> &str {
        match sign {
            Sign::Terminal(i) => self
                .terminals
                .get(i)
                .map_or("<bad terminal>", |s| s.as_str()),
            Sign::NonTerminal(i) => self
                .non_terminals
                .get(i)
                .map_or("<bad non-terminal>", |s| s.as_str()),
            Sign::Empty => "empty",
            Sign::Pound => "#",
        }
    }

    /// `left -> a b c`, or `left -> empty` for an epsilon production.
    pub fn render_production(&self, index: usize) -> String {
        let p = &self.productions[index];
        let mut out = format!("{} ->", self.sign_name(Sign::NonTerminal(p.left)));
        if p.right.is_empty() {
            out.push_str(" empty");
        }
        for &s in &p.right {
            out.push(' ');
            out.push_str(self.sign_name(s));
        }
        out
    }
}

/// A production spelled with sign names, resolved by [`GrammarBuilder::build`].
#[derive(Debug, Clone)]
pub struct Rule<A> {
    left: String,
    right: Vec<String>,
    start: Option<A>,
    end: Option<A>,
    children: Option<Vec<Option<A>>>,
    at: Vec<(usize, A)>,
}

/// `rule("S", ["a", "S"])`; an empty right side is an epsilon production.
pub fn rule<A, I, S>(left: &str, right: I) -> Rule<A>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Rule {
        left: left.to_string(),
        right: right.into_iter().map(Into::into).collect(),
        start: None,
        end: None,
        children: None,
        at: Vec::new(),
    }
}

/// `left -> empty`.
pub fn epsilon<A>(left: &str) -> Rule<A> {
    rule(left, Vec::<String>::new())
}

impl<A> Rule<A> {
    pub fn start(mut self, action: A) -> Self {
        self.start = Some(action);
        self
    }

    pub fn end(mut self, action: A) -> Self {
        self.end = Some(action);
        self
    }

    /// Run `action` right before the child at `pos`.
    pub fn at(mut self, pos: usize, action: A) -> Self {
        self.at.push((pos, action));
        self
    }

    /// Replace the whole per-position action list. Its length is taken as
    /// given, even if it differs from the right-hand side.
    pub fn children(mut self, actions: impl IntoIterator<Item = Option<A>>) -> Self {
        self.children = Some(actions.into_iter().collect());
        self
    }
}

pub struct GrammarBuilder<A> {
    terminals: Vec<String>,
    non_terminals: Vec<String>,
    start: Option<String>,
    rules: Vec<Rule<A>>,
}

impl<A> Default for GrammarBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> GrammarBuilder<A> {
    pub fn new() -> Self {
        Self {
            terminals: Vec::new(),
            non_terminals: Vec::new(),
            start: None,
            rules: Vec::new(),
        }
    }

    pub fn terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminals.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn non_terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_terminals.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    pub fn rule(mut self, rule: Rule<A>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule<A>>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> Result<Grammar<A>, CompileError> {
        {
            let mut seen = HashSet::new();
            for name in self.terminals.iter().chain(self.non_terminals.iter()) {
                if !seen.insert(name.as_str()) {
                    return Err(CompileError::grammar(format!(
                        "sign `{name}` is declared twice"
                    )));
                }
            }
        }
        let start_name = self
            .start
            .ok_or_else(|| CompileError::grammar("no start symbol set"))?;

        let mut grammar =
            Grammar::from_parts(self.terminals, self.non_terminals, 0, Vec::new());
        grammar.start = match grammar.non_terminal(&start_name) {
            Some(Sign::NonTerminal(i)) => i,
            _ => {
                return Err(CompileError::grammar(format!(
                    "start symbol `{start_name}` is not a non-terminal"
                )));
            }
        };

        for r in self.rules {
            let left = match grammar.non_terminal(&r.left) {
                Some(Sign::NonTerminal(i)) => i,
                _ => {
                    return Err(CompileError::grammar(format!(
                        "left side `{}` is not a non-terminal",
                        r.left
                    )));
                }
            };
            let mut right = Vec::with_capacity(r.right.len());
            for name in &r.right {
                let sign = grammar
                    .terminal(name)
                    .or_else(|| grammar.non_terminal(name))
                    .ok_or_else(|| {
                        CompileError::grammar(format!(
                            "unknown sign `{name}` in a production of `{}`",
                            r.left
                        ))
                    })?;
                right.push(sign);
            }

            let mut children = match r.children {
                Some(list) => list,
                None => right.iter().map(|_| None).collect(),
            };
            for (pos, action) in r.at {
                if pos >= children.len() {
                    children.resize_with(pos + 1, || None);
                }
                children[pos] = Some(action);
            }

            grammar.productions.push(Production {
                left,
                right,
                start: r.start,
                end: r.end,
                children,
            });
        }

        Ok(grammar)
    }
}
