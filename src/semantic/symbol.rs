// src/semantic/symbol.rs
//! Symbol tables: one global variable table, one local table per function
//! (chained to the global table for existence checks), and a function table.

use std::fmt::{self, Write};

use serde::Serialize;

/// Width in bytes of an `int`.
pub const INT_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Void,
}

impl ValueType {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw {
            "int" => Some(ValueType::Int),
            "void" => Some(ValueType::Void),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => f.write_str("int"),
            ValueType::Void => f.write_str("void"),
        }
    }
}

/// Index of a local variable table inside the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symbol {
    GlobalVar {
        name: String,
        ty: ValueType,
        width: usize,
        offset: usize,
    },
    LocalVar {
        name: String,
        ty: ValueType,
        width: usize,
        offset: usize,
        is_param: bool,
    },
    Fun {
        name: String,
        return_type: ValueType,
        param_types: Vec<ValueType>,
        scope: ScopeId,
    },
}

impl Symbol {
    pub fn global_var(name: impl Into<String>, ty: ValueType, width: usize) -> Self {
        Symbol::GlobalVar {
            name: name.into(),
            ty,
            width,
            offset: 0,
        }
    }

    pub fn local_var(name: impl Into<String>, ty: ValueType, width: usize, is_param: bool) -> Self {
        Symbol::LocalVar {
            name: name.into(),
            ty,
            width,
            offset: 0,
            is_param,
        }
    }

    pub fn fun(
        name: impl Into<String>,
        return_type: ValueType,
        param_types: Vec<ValueType>,
        scope: ScopeId,
    ) -> Self {
        Symbol::Fun {
            name: name.into(),
            return_type,
            param_types,
            scope,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::GlobalVar { name, .. }
            | Symbol::LocalVar { name, .. }
            | Symbol::Fun { name, .. } => name,
        }
    }

    /// Storage width; functions take none.
    pub fn width(&self) -> usize {
        match self {
            Symbol::GlobalVar { width, .. } | Symbol::LocalVar { width, .. } => *width,
            Symbol::Fun { .. } => 0,
        }
    }

    pub fn offset(&self) -> Option<usize> {
        match self {
            Symbol::GlobalVar { offset, .. } | Symbol::LocalVar { offset, .. } => Some(*offset),
            Symbol::Fun { .. } => None,
        }
    }

    fn set_offset(&mut self, at: usize) {
        match self {
            Symbol::GlobalVar { offset, .. } | Symbol::LocalVar { offset, .. } => *offset = at,
            Symbol::Fun { .. } => {}
        }
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Symbol::LocalVar { is_param: true, .. })
    }
}

/// Ordered symbol list with a running width. Appending never checks for
/// duplicates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
    width: usize,
}

pub type GlobalVarTable = SymbolTable;
pub type FunTable = SymbolTable;

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `symbol` at the current running width and return its offset.
    pub fn append(&mut self, mut symbol: Symbol) -> usize {
        let offset = self.width;
        symbol.set_offset(offset);
        self.width = self.width.saturating_add(symbol.width());
        self.entries.push(symbol);
        offset
    }

    /// Whether `width` more bytes still fit after the running width.
    pub fn has_room(&self, width: usize) -> bool {
        self.width.checked_add(width).is_some()
    }

    pub fn exist(&self, name: &str) -> bool {
        self.entries.iter().any(|s| s.name() == name)
    }

    /// First entry with this name.
    pub fn query(&self, name: &str) -> Option<&Symbol> {
        self.entries.iter().find(|s| s.name() == name)
    }

    pub fn query_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.entries.iter_mut().find(|s| s.name() == name)
    }

    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total width of everything appended so far.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.entries.iter()
    }
}

/// Variables of one function. Its outer scope is always the pool's global
/// table; see [`ScopeView`].
#[derive(Debug, Clone, Serialize)]
pub struct LocalVarTable {
    name: String,
    table: SymbolTable,
}

impl LocalVarTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: SymbolTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn append(&mut self, symbol: Symbol) -> usize {
        self.table.append(symbol)
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Lookup in this table only.
    pub fn query(&self, name: &str) -> Option<&Symbol> {
        self.table.query(name)
    }

    pub fn params(&self) -> impl Iterator<Item = &Symbol> {
        self.table.iter().filter(|s| s.is_param())
    }

    pub fn param_count(&self) -> usize {
        self.params().count()
    }
}

/// A local table seen together with its outer global table.
#[derive(Debug, Clone, Copy)]
pub struct ScopeView<'a> {
    pub local: &'a LocalVarTable,
    pub outer: &'a GlobalVarTable,
}

impl ScopeView<'_> {
    /// True when the name is declared locally or in the outer global table.
    pub fn exist(&self, name: &str) -> bool {
        self.outer.exist(name) || self.local.table.exist(name)
    }

    /// Local entry first, then the global one.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.local.query(name).or_else(|| self.outer.query(name))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolTablePool {
    global: GlobalVarTable,
    locals: Vec<LocalVarTable>,
    funs: FunTable,
}

impl Default for SymbolTablePool {
    fn default() -> Self {
        Self::init()
    }
}

impl SymbolTablePool {
    /// Empty tables plus the built-in `input` and `output` functions.
    pub fn init() -> Self {
        let mut pool = Self {
            global: GlobalVarTable::new(),
            locals: Vec::new(),
            funs: FunTable::new(),
        };

        let input = pool.append(LocalVarTable::new("input"));
        let output = pool.append(LocalVarTable::new("output"));
        pool.locals[output.0].append(Symbol::local_var("num", ValueType::Int, INT_WIDTH, true));

        pool.funs
            .append(Symbol::fun("input", ValueType::Int, Vec::new(), input));
        pool.funs.append(Symbol::fun(
            "output",
            ValueType::Void,
            vec![ValueType::Int],
            output,
        ));
        pool
    }

    pub fn global(&self) -> &GlobalVarTable {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut GlobalVarTable {
        &mut self.global
    }

    pub fn funs(&self) -> &FunTable {
        &self.funs
    }

    pub fn funs_mut(&mut self) -> &mut FunTable {
        &mut self.funs
    }

    pub fn locals(&self) -> &[LocalVarTable] {
        &self.locals
    }

    pub fn local(&self, id: ScopeId) -> &LocalVarTable {
        &self.locals[id.0]
    }

    /// Register a new local table and return its id.
    pub fn append(&mut self, table: LocalVarTable) -> ScopeId {
        self.locals.push(table);
        ScopeId(self.locals.len() - 1)
    }

    /// Local table by scope name.
    pub fn query(&self, name: &str) -> Option<&LocalVarTable> {
        self.locals.iter().find(|t| t.name == name)
    }

    pub fn query_mut(&mut self, name: &str) -> Option<&mut LocalVarTable> {
        self.locals.iter_mut().find(|t| t.name == name)
    }

    pub fn scope(&self, name: &str) -> Option<ScopeView<'_>> {
        self.query(name).map(|local| ScopeView {
            local,
            outer: &self.global,
        })
    }

    pub fn fun(&self, name: &str) -> Option<&Symbol> {
        self.funs.query(name)
    }

    pub fn fun_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.funs.query_mut(name)
    }

    /// Human-readable dump of every table.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "globals (width {}):", self.global.width());
        for s in self.global.iter() {
            let _ = writeln!(out, "  {}", describe(s));
        }
        let _ = writeln!(out, "functions:");
        for s in self.funs.iter() {
            let _ = writeln!(out, "  {}", describe(s));
        }
        for table in &self.locals {
            let _ = writeln!(out, "scope {} (width {}):", table.name, table.table.width());
            for s in table.table.iter() {
                let _ = writeln!(out, "  {}", describe(s));
            }
        }
        out
    }
}

fn describe(symbol: &Symbol) -> String {
    match symbol {
        Symbol::GlobalVar {
            name,
            ty,
            width,
            offset,
        } => format!("{ty} {name} [width {width}, offset {offset}]"),
        Symbol::LocalVar {
            name,
            ty,
            width,
            offset,
            is_param,
        } => {
            let kind = if *is_param { "param" } else { "local" };
            format!("{kind} {ty} {name} [width {width}, offset {offset}]")
        }
        Symbol::Fun {
            name,
            return_type,
            param_types,
            ..
        } => {
            let params: Vec<String> = param_types.iter().map(|t| t.to_string()).collect();
            format!("{return_type} {name}({})", params.join(", "))
        }
    }
}
