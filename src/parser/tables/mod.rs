// src/parser/tables/mod.rs
pub mod build;
pub mod io;
pub mod sets;

pub use build::{GrammarWarning, PredictiveTable};
pub use io::{load_table_json_bytes, save_table_json, table_to_json_string};
pub use sets::{FirstSets, FollowSets, SignSet, first_of_sequence, sorted};

use crate::grammar::Sign;

/// Predictive table: (non-terminal, lookahead) -> production index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    n_rows: usize,                // one per non-terminal
    n_columns: usize,             // one per terminal, plus `Pound` last
    cells: Vec<Option<usize>>,    // n_rows*n_columns row-major
}

impl ParseTable {
    pub fn new(n_non_terminals: usize, n_terminals: usize) -> Self {
        let n_columns = n_terminals + 1;
        Self {
            n_rows: n_non_terminals,
            n_columns,
            cells: vec![None; n_non_terminals * n_columns],
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Column of a lookahead sign; only terminals and `Pound` have one.
    pub fn column(&self, lookahead: Sign) -> Option<usize> {
        match lookahead {
            Sign::Terminal(i) if i + 1 < self.n_columns => Some(i),
            Sign::Pound => Some(self.n_columns - 1),
            _ => None,
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<usize> {
        if row >= self.n_rows || column >= self.n_columns {
            return None;
        }
        self.cells[row * self.n_columns + column]
    }

    pub(crate) fn set(&mut self, row: usize, column: usize, production: usize) {
        self.cells[row * self.n_columns + column] = Some(production);
    }

    pub fn get(&self, nt: usize, lookahead: Sign) -> Option<usize> {
        self.column(lookahead).and_then(|c| self.cell(nt, c))
    }

    /// Every cell of one row, `None` when `nt` is out of range.
    pub fn row(&self, nt: usize) -> Option<&[Option<usize>]> {
        if nt >= self.n_rows {
            return None;
        }
        self.cells.get(nt * self.n_columns..(nt + 1) * self.n_columns)
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
