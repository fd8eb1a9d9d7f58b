// src/parser/tables/io.rs
use std::io::{BufWriter, Write};

use serde::{Deserialize, Serialize};

use super::{ParseTable, PredictiveTable, SignSet, sorted};
use crate::grammar::{Grammar, Sign};

// -------------------- JSON (de)serialization --------------------

#[derive(Serialize, Deserialize)]
struct NamedSet {
    non_terminal: String,
    signs: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct TableDisk {
    terminals: Vec<String>,
    non_terminals: Vec<String>,
    productions: Vec<String>,
    #[serde(default)]
    first: Vec<NamedSet>,
    #[serde(default)]
    follow: Vec<NamedSet>,
    cells: Vec<Vec<Option<usize>>>, // [non_terminal][terminal..., pound]
}

fn named_sets<A>(grammar: &Grammar<A>, get: impl Fn(usize) -> SignSet) -> Vec<NamedSet> {
    (0..grammar.non_terminals().len())
        .map(|nt| NamedSet {
            non_terminal: grammar.sign_name(Sign::NonTerminal(nt)).to_string(),
            signs: sorted(&get(nt))
                .into_iter()
                .map(|s| grammar.sign_name(s).to_string())
                .collect(),
        })
        .collect()
}

impl TableDisk {
    fn new<A>(grammar: &Grammar<A>, compiled: &PredictiveTable) -> Self {
        let table = compiled.table();
        Self {
            terminals: grammar.terminals().to_vec(),
            non_terminals: grammar.non_terminals().to_vec(),
            productions: (0..grammar.productions().len())
                .map(|i| grammar.render_production(i))
                .collect(),
            first: named_sets(grammar, |nt| compiled.first(nt).clone()),
            follow: named_sets(grammar, |nt| compiled.follow(nt).clone()),
            cells: (0..table.n_rows())
                .filter_map(|nt| table.row(nt).map(<[_]>::to_vec))
                .collect(),
        }
    }

    fn into_table<A>(self, grammar: &Grammar<A>) -> Result<ParseTable, String> {
        if self.terminals != grammar.terminals() {
            return Err("terminal alphabet does not match the grammar".into());
        }
        if self.non_terminals != grammar.non_terminals() {
            return Err("non-terminal alphabet does not match the grammar".into());
        }
        let n_prods = grammar.productions().len();
        if self.productions.len() != n_prods {
            return Err(format!(
                "table lists {} productions, grammar has {n_prods}",
                self.productions.len()
            ));
        }
        for (i, text) in self.productions.iter().enumerate() {
            let expected = grammar.render_production(i);
            if *text != expected {
                return Err(format!(
                    "production {i} is `{text}`, grammar has `{expected}`"
                ));
            }
        }

        let mut table = ParseTable::new(self.non_terminals.len(), self.terminals.len());
        if self.cells.len() != table.n_rows() {
            return Err(format!(
                "expected {} rows, found {}",
                table.n_rows(),
                self.cells.len()
            ));
        }
        for (row, cells) in self.cells.into_iter().enumerate() {
            if cells.len() != table.n_columns() {
                return Err(format!(
                    "row {row}: expected {} columns, found {}",
                    table.n_columns(),
                    cells.len()
                ));
            }
            for (column, cell) in cells.into_iter().enumerate() {
                let Some(p) = cell else {
                    continue;
                };
                if p >= n_prods {
                    return Err(format!("row {row} column {column}: no production {p}"));
                }
                if grammar.production(p).left != row {
                    return Err(format!(
                        "row {row} column {column}: production {p} has a different left side"
                    ));
                }
                table.set(row, column, p);
            }
        }
        Ok(table)
    }
}

pub fn table_to_json_string<A>(
    grammar: &Grammar<A>,
    compiled: &PredictiveTable,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&TableDisk::new(grammar, compiled))
}

pub fn save_table_json<A>(
    path: &std::path::Path,
    grammar: &Grammar<A>,
    compiled: &PredictiveTable,
) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, &TableDisk::new(grammar, compiled))?;
    w.flush()
}

/// Read back a table written by [`save_table_json`]. The first/follow
/// sections are informational and ignored.
pub fn load_table_json_bytes<A>(grammar: &Grammar<A>, data: &[u8]) -> Result<ParseTable, String> {
    serde_json::from_slice::<TableDisk>(data)
        .map_err(|e| format!("Failed to parse table JSON: {e}"))?
        .into_table(grammar)
}
