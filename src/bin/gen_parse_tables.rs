// src/bin/gen_parse_tables.rs
// Offline generator for the C-minus predictive table.
// Compiles the built-in grammar and writes tables/parse_table.json (or the
// path given as the first argument). `cminusc --table` reads it back.

use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use cminusc::{
    grammar::cminus,
    parser::tables::{PredictiveTable, save_table_json},
    util::diagnostics_enabled,
};

fn main() -> Result<()> {
    let out_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tables/parse_table.json"));

    let grammar = cminus::grammar().context("building the C-minus grammar")?;
    let compiled = PredictiveTable::compile(&grammar).context("compiling the parse table")?;

    if diagnostics_enabled() {
        for w in compiled.warnings() {
            eprintln!("[gen_parse_tables] warning: {w}");
        }
    }

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    save_table_json(&out_path, &grammar, &compiled)
        .with_context(|| format!("writing {}", out_path.display()))?;
    println!(
        "[gen_parse_tables] wrote {} ({} productions, {} filled cells)",
        out_path.display(),
        grammar.productions().len(),
        compiled.table().filled()
    );
    Ok(())
}
