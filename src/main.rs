// src/main.rs
use std::{env, fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result, bail};
use cminusc::{
    Frontend, load_tokens_json,
    util::{diagnostics_enabled, tree_enabled},
};

fn usage() -> ! {
    eprintln!("usage: cminusc <tokens.json> [--json] [--table <table.json>]");
    std::process::exit(2);
}

fn main() {
    if let Err(e) = run() {
        eprintln!("[cminusc] error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut tokens_path: Option<PathBuf> = None;
    let mut table_path: Option<PathBuf> = None;
    let mut json = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--table" => match args.next() {
                Some(p) => table_path = Some(PathBuf::from(p)),
                None => usage(),
            },
            "-h" | "--help" => usage(),
            _ if tokens_path.is_none() => tokens_path = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument `{arg}`"),
        }
    }
    let Some(tokens_path) = tokens_path else {
        usage();
    };

    let t0 = Instant::now();
    let frontend = match &table_path {
        Some(p) => {
            let data = fs::read(p).with_context(|| format!("reading {}", p.display()))?;
            Frontend::from_table_json(&data)
                .with_context(|| format!("loading table {}", p.display()))?
        }
        None => Frontend::new().context("compiling the C-minus grammar")?,
    };
    if diagnostics_enabled() {
        for w in frontend.warnings() {
            eprintln!("[cminusc] warning: {w}");
        }
    }

    let data = fs::read(&tokens_path)
        .with_context(|| format!("reading {}", tokens_path.display()))?;
    let tokens = load_tokens_json(&data).map_err(anyhow::Error::msg)?;
    let compilation = frontend
        .parse(&tokens)
        .with_context(|| format!("compiling {}", tokens_path.display()))?;

    if json {
        let doc = compilation.to_json(frontend.grammar())?;
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    if tree_enabled() {
        print!("{}", compilation.tree.render(frontend.grammar()));
    }
    print!("{}", compilation.symbols.render());
    println!(
        "[cminusc] {} tokens, {} nodes in {:.3} ms",
        tokens.len(),
        compilation.tree.len() - 1,
        t0.elapsed().as_secs_f64() * 1e3
    );
    Ok(())
}
