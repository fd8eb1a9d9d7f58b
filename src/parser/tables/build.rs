// src/parser/tables/build.rs
use std::{fmt, time::Instant};

use super::{
    ParseTable,
    sets::{FirstSets, FollowSets, SignSet, sorted},
};
use crate::{
    error::CompileError,
    grammar::{Grammar, Sign},
};

/// Advisory grammar-quality findings. These never block compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarWarning {
    /// Two productions of the same non-terminal have overlapping first sets.
    FirstFirstOverlap { non_terminal: String },
    /// A nullable non-terminal whose first and follow sets overlap.
    FirstFollowOverlap { non_terminal: String },
}

impl fmt::Display for GrammarWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarWarning::FirstFirstOverlap { non_terminal } => {
                write!(f, "productions of `{non_terminal}` have overlapping first sets")
            }
            GrammarWarning::FirstFollowOverlap { non_terminal } => {
                write!(f, "first and follow sets of `{non_terminal}` overlap")
            }
        }
    }
}

/// First/follow sets plus the predictive table compiled from them.
#[derive(Debug, Clone)]
pub struct PredictiveTable {
    table: ParseTable,
    firsts: FirstSets,
    follows: FollowSets,
    warnings: Vec<GrammarWarning>,
}

impl PredictiveTable {
    /// Compute first and follow sets to their fixed points and fill the
    /// table. Fails on the first cell claimed by two different productions.
    pub fn compile<A>(grammar: &Grammar<A>) -> Result<Self, CompileError> {
        let instant = Instant::now();

        let firsts = FirstSets::compute(grammar)?;
        let follows = FollowSets::compute(grammar, &firsts)?;

        let warnings = diagnose(grammar, &firsts, &follows)?;
        for w in &warnings {
            log::warn!("{w}");
        }

        let mut table = ParseTable::new(grammar.non_terminals().len(), grammar.terminals().len());
        for (index, p) in grammar.productions().iter().enumerate() {
            let first = firsts.of(&p.right)?;
            for s in sorted(&first) {
                if !s.is_empty() {
                    insert(&mut table, grammar, index, s)?;
                }
            }
            if first.contains(&Sign::Empty) {
                for s in sorted(follows.get(p.left)) {
                    insert(&mut table, grammar, index, s)?;
                }
            }
        }

        log::debug!(
            "predictive table: {} productions, {}x{} cells, {} filled, {} warnings in {} us",
            grammar.productions().len(),
            table.n_rows(),
            table.n_columns(),
            table.filled(),
            warnings.len(),
            instant.elapsed().as_micros()
        );

        Ok(Self {
            table,
            firsts,
            follows,
            warnings,
        })
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn firsts(&self) -> &FirstSets {
        &self.firsts
    }

    pub fn follows(&self) -> &FollowSets {
        &self.follows
    }

    pub fn first(&self, nt: usize) -> &SignSet {
        self.firsts.get(nt)
    }

    pub fn follow(&self, nt: usize) -> &SignSet {
        self.follows.get(nt)
    }

    /// Combined first of an arbitrary sign sequence.
    pub fn first_of(&self, seq: &[Sign]) -> Result<SignSet, CompileError> {
        self.firsts.of(seq)
    }

    /// Production index selected by `(nt, lookahead)`.
    pub fn get(&self, nt: usize, lookahead: Sign) -> Option<usize> {
        self.table.get(nt, lookahead)
    }

    pub fn warnings(&self) -> &[GrammarWarning] {
        &self.warnings
    }

    pub fn into_table(self) -> ParseTable {
        self.table
    }
}

fn insert<A>(
    table: &mut ParseTable,
    grammar: &Grammar<A>,
    index: usize,
    lookahead: Sign,
) -> Result<(), CompileError> {
    let p = grammar.production(index);
    let Some(column) = table.column(lookahead) else {
        return Err(CompileError::grammar(format!(
            "terminal or non-terminal kind error: {lookahead:?} cannot be a lookahead"
        )));
    };

    match table.cell(p.left, column) {
        None => {
            table.set(p.left, column, index);
            Ok(())
        }
        Some(existing) if existing == index || grammar.production(existing).same_shape(p) => Ok(()),
        Some(existing) => {
            let message = format!(
                "grammar is not LL(1): `{}` on `{}` is claimed by `{}` and `{}`",
                grammar.sign_name(Sign::NonTerminal(p.left)),
                grammar.sign_name(lookahead),
                grammar.render_production(existing),
                grammar.render_production(index),
            );
            log::error!("{message}");
            Err(CompileError::grammar(message))
        }
    }
}

fn diagnose<A>(
    grammar: &Grammar<A>,
    firsts: &FirstSets,
    follows: &FollowSets,
) -> Result<Vec<GrammarWarning>, CompileError> {
    let mut warnings = Vec::new();

    for nt in 0..grammar.non_terminals().len() {
        let name = grammar.sign_name(Sign::NonTerminal(nt)).to_string();
        let bodies: Vec<SignSet> = grammar
            .productions_of(nt)
            .map(|(_, p)| firsts.of(&p.right))
            .collect::<Result<_, _>>()?;

        let overlapping = bodies
            .iter()
            .enumerate()
            .any(|(i, a)| bodies[i + 1..].iter().any(|b| !a.is_disjoint(b)));
        if overlapping {
            warnings.push(GrammarWarning::FirstFirstOverlap {
                non_terminal: name.clone(),
            });
        }

        let first = firsts.get(nt);
        if first.contains(&Sign::Empty) && !first.is_disjoint(follows.get(nt)) {
            warnings.push(GrammarWarning::FirstFollowOverlap { non_terminal: name });
        }
    }

    Ok(warnings)
}
