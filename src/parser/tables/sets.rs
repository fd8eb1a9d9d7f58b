// src/parser/tables/sets.rs
use hashbrown::HashSet;

use crate::{
    error::CompileError,
    grammar::{Grammar, Sign},
};

pub type SignSet = HashSet<Sign>;

/// Set members in `Sign` order; used wherever iteration order is observable.
pub fn sorted(set: &SignSet) -> Vec<Sign> {
    let mut v: Vec<Sign> = set.iter().copied().collect();
    v.sort_unstable();
    v
}

fn bad_kind(sign: Sign) -> CompileError {
    CompileError::grammar(format!("terminal or non-terminal kind error: {sign:?}"))
}

/// Reject productions whose signs do not belong to the grammar's alphabets.
/// `Empty` and `Pound` are not allowed on a right-hand side.
pub fn validate<A>(grammar: &Grammar<A>) -> Result<(), CompileError> {
    let n_terms = grammar.terminals().len();
    let n_non_terms = grammar.non_terminals().len();
    if grammar.start() >= n_non_terms {
        return Err(CompileError::grammar(format!(
            "start symbol index {} out of range",
            grammar.start()
        )));
    }
    for p in grammar.productions() {
        if p.left >= n_non_terms {
            return Err(bad_kind(Sign::NonTerminal(p.left)));
        }
        for &s in &p.right {
            let ok = match s {
                Sign::Terminal(i) => i < n_terms,
                Sign::NonTerminal(i) => i < n_non_terms,
                Sign::Empty | Sign::Pound => false,
            };
            if !ok {
                return Err(bad_kind(s));
            }
        }
    }
    Ok(())
}

fn set_of(sets: &[SignSet], nt: usize) -> Result<&SignSet, CompileError> {
    sets.get(nt).ok_or_else(|| bad_kind(Sign::NonTerminal(nt)))
}

fn set_of_mut(sets: &mut [SignSet], nt: usize) -> Result<&mut SignSet, CompileError> {
    sets.get_mut(nt).ok_or_else(|| bad_kind(Sign::NonTerminal(nt)))
}

/// First of a sign sequence under the given per-non-terminal first sets.
///
/// An empty sequence yields `{Empty}`. A leading non-terminal contributes its
/// non-empty members; while the visited non-terminal can vanish, the next
/// sign (or its non-empty first members) is added, and `Empty` is added when
/// the last sign can vanish.
pub fn first_of_sequence(firsts: &[SignSet], seq: &[Sign]) -> Result<SignSet, CompileError> {
    let mut out = SignSet::new();
    let Some(&lead) = seq.first() else {
        out.insert(Sign::Empty);
        return Ok(out);
    };

    match lead {
        Sign::Terminal(_) => {
            out.insert(lead);
        }
        Sign::NonTerminal(n) => {
            out.extend(set_of(firsts, n)?.iter().filter(|s| !s.is_empty()));

            for (i, &s) in seq.iter().enumerate() {
                let Sign::NonTerminal(n) = s else {
                    break;
                };
                if !set_of(firsts, n)?.contains(&Sign::Empty) {
                    break;
                }
                match seq.get(i + 1) {
                    None => {
                        out.insert(Sign::Empty);
                    }
                    Some(&t @ Sign::Terminal(_)) => {
                        out.insert(t);
                    }
                    Some(&Sign::NonTerminal(m)) => {
                        out.extend(set_of(firsts, m)?.iter().filter(|s| !s.is_empty()));
                    }
                    Some(&other) => return Err(bad_kind(other)),
                }
            }
        }
        other => return Err(bad_kind(other)),
    }

    Ok(out)
}

/// First set of every non-terminal, indexed by non-terminal id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    sets: Vec<SignSet>,
}

impl FirstSets {
    pub fn new(n_non_terminals: usize) -> Self {
        Self {
            sets: vec![SignSet::new(); n_non_terminals],
        }
    }

    /// Validate the grammar, then grow until the fixed point.
    pub fn compute<A>(grammar: &Grammar<A>) -> Result<Self, CompileError> {
        validate(grammar)?;
        let mut firsts = Self::new(grammar.non_terminals().len());
        let mut passes = 1usize;
        while firsts.grow(grammar)? {
            passes += 1;
        }
        log::debug!("first sets converged after {passes} passes");
        Ok(firsts)
    }

    /// One scan over every production. Returns whether any set grew.
    pub fn grow<A>(&mut self, grammar: &Grammar<A>) -> Result<bool, CompileError> {
        let mut grew = false;
        for p in grammar.productions() {
            let first = first_of_sequence(&self.sets, &p.right)?;
            let target = set_of_mut(&mut self.sets, p.left)?;
            for s in first {
                grew |= target.insert(s);
            }
        }
        Ok(grew)
    }

    pub fn get(&self, nt: usize) -> &SignSet {
        &self.sets[nt]
    }

    /// Combined first of a sign sequence.
    pub fn of(&self, seq: &[Sign]) -> Result<SignSet, CompileError> {
        first_of_sequence(&self.sets, seq)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Follow set of every non-terminal, indexed by non-terminal id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
    sets: Vec<SignSet>,
}

impl FollowSets {
    pub fn new(n_non_terminals: usize) -> Self {
        Self {
            sets: vec![SignSet::new(); n_non_terminals],
        }
    }

    pub fn compute<A>(grammar: &Grammar<A>, firsts: &FirstSets) -> Result<Self, CompileError> {
        let mut follows = Self::new(grammar.non_terminals().len());
        let mut passes = 1usize;
        while follows.grow(grammar, firsts)? {
            passes += 1;
        }
        log::debug!("follow sets converged after {passes} passes");
        Ok(follows)
    }

    /// One scan over every production. Returns whether any set grew.
    ///
    /// The sign after a non-terminal is handled through the combined first of
    /// the whole remaining suffix, not sign by sign.
    pub fn grow<A>(&mut self, grammar: &Grammar<A>, firsts: &FirstSets) -> Result<bool, CompileError> {
        let mut grew = false;
        for p in grammar.productions() {
            if p.left == grammar.start() {
                grew |= set_of_mut(&mut self.sets, p.left)?.insert(Sign::Pound);
            }

            for (i, &s) in p.right.iter().enumerate() {
                let n = match s {
                    Sign::Terminal(_) => continue,
                    Sign::NonTerminal(n) => n,
                    other => return Err(bad_kind(other)),
                };

                let rest = &p.right[i + 1..];
                let inherit = if rest.is_empty() {
                    true
                } else {
                    let first = firsts.of(rest)?;
                    let target = set_of_mut(&mut self.sets, n)?;
                    for &f in first.iter().filter(|f| !f.is_empty()) {
                        grew |= target.insert(f);
                    }
                    first.contains(&Sign::Empty)
                };

                if inherit && n != p.left {
                    let from_left: Vec<Sign> = set_of(&self.sets, p.left)?.iter().copied().collect();
                    let target = set_of_mut(&mut self.sets, n)?;
                    for f in from_left {
                        grew |= target.insert(f);
                    }
                }
            }
        }
        Ok(grew)
    }

    pub fn get(&self, nt: usize) -> &SignSet {
        &self.sets[nt]
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
