// src/frontend.rs
//! C-minus front end: the grammar, its compiled table and the parse entry
//! point wired to the C-minus actions.

use serde::Serialize;

use crate::{
    error::CompileError,
    grammar::{Grammar, cminus},
    parser::{
        Parser,
        tables::{GrammarWarning, ParseTable, PredictiveTable, load_table_json_bytes},
        tree::ParseTree,
    },
    semantic::{
        rules::{Action, CminusActions},
        symbol::SymbolTablePool,
    },
    token::Token,
};

/// Result of a successful parse.
#[derive(Debug)]
pub struct Compilation {
    pub tree: ParseTree,
    pub symbols: SymbolTablePool,
}

impl Compilation {
    pub fn to_json(&self, grammar: &Grammar<Action>) -> serde_json::Result<serde_json::Value> {
        #[derive(Serialize)]
        struct Out<'a> {
            tree: serde_json::Value,
            symbols: &'a SymbolTablePool,
        }
        serde_json::to_value(Out {
            tree: self.tree.to_json(grammar),
            symbols: &self.symbols,
        })
    }
}

pub struct Frontend {
    grammar: Grammar<Action>,
    table: ParseTable,
    warnings: Vec<GrammarWarning>,
}

impl Frontend {
    /// Build the grammar and compile its table.
    pub fn new() -> Result<Self, CompileError> {
        let grammar = cminus::grammar()?;
        let compiled = PredictiveTable::compile(&grammar)?;
        let warnings = compiled.warnings().to_vec();
        Ok(Self {
            grammar,
            table: compiled.into_table(),
            warnings,
        })
    }

    /// Use a table previously written by `gen_parse_tables` instead of
    /// compiling one.
    pub fn from_table_json(data: &[u8]) -> Result<Self, CompileError> {
        let grammar = cminus::grammar()?;
        let table = load_table_json_bytes(&grammar, data).map_err(CompileError::grammar)?;
        Ok(Self {
            grammar,
            table,
            warnings: Vec::new(),
        })
    }

    pub fn grammar(&self) -> &Grammar<Action> {
        &self.grammar
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn warnings(&self) -> &[GrammarWarning] {
        &self.warnings
    }

    /// Parse one token stream against fresh symbol tables.
    pub fn parse(&self, tokens: &[Token]) -> Result<Compilation, CompileError> {
        let mut symbols = SymbolTablePool::init();
        let parser = Parser::new(&self.grammar, &self.table, CminusActions);
        let tree = parser.execute(tokens, &mut symbols)?;
        Ok(Compilation { tree, symbols })
    }
}
