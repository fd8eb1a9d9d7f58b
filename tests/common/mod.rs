//! Shared helpers: a whitespace tokenizer for C-minus test sources and a
//! seeded generator of valid programs.
#![allow(dead_code)]

use cminusc::Token;
use rand::{Rng, rngs::StdRng};

const KEYWORDS: &[&str] = &["int", "void", "if", "else", "while", "return"];

/// Split `src` on whitespace. Every token must be separated by spaces;
/// lines count from 1.
pub fn lex(src: &str) -> Vec<Token> {
    let mut out = Vec::new();
    for (i, line) in src.lines().enumerate() {
        for word in line.split_whitespace() {
            let kind = if KEYWORDS.contains(&word) {
                word
            } else if word.bytes().all(|b| b.is_ascii_digit()) {
                "num"
            } else if word.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
                "id"
            } else {
                word
            };
            out.push(Token::new(kind, word, i + 1));
        }
    }
    out
}

/// One token per kind, text equal to the kind, token `i` on line `i + 1`.
pub fn toks(kinds: &[&str]) -> Vec<Token> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, k)| Token::new(*k, *k, i + 1))
        .collect()
}

pub struct Generated {
    pub source: String,
    /// Expected width of the global variable table.
    pub global_width: usize,
    /// User-defined functions, built-ins excluded.
    pub functions: usize,
}

struct Env {
    arrays: Vec<String>,
    scalars: Vec<String>,
    /// (name, arity, returns int)
    funs: Vec<(String, usize, bool)>,
}

const OPS: &[&str] = &["+", "-", "*", "/"];
const REL_OPS: &[&str] = &["<", "<=", ">", ">=", "==", "!="];

fn pick<'a>(rng: &mut StdRng, items: &'a [String]) -> &'a str {
    &items[rng.random_range(0..items.len())]
}

fn call_args(rng: &mut StdRng, env: &Env, arity: usize, depth: usize) -> String {
    let args: Vec<String> = (0..arity).map(|_| expression(rng, env, depth)).collect();
    if args.is_empty() {
        "( )".to_string()
    } else {
        format!("( {} )", args.join(" , "))
    }
}

fn factor(rng: &mut StdRng, env: &Env, depth: usize) -> String {
    let choice = if depth == 0 {
        rng.random_range(0..2)
    } else {
        rng.random_range(0..5)
    };
    match choice {
        0 => rng.random_range(0..1000).to_string(),
        1 => pick(rng, &env.scalars).to_string(),
        2 => format!("( {} )", expression(rng, env, depth - 1)),
        3 if !env.arrays.is_empty() => {
            let a = pick(rng, &env.arrays).to_string();
            format!("{a} [ {} ]", expression(rng, env, depth - 1))
        }
        _ => {
            let callable: Vec<&(String, usize, bool)> =
                env.funs.iter().filter(|f| f.2).collect();
            if callable.is_empty() || rng.random_bool(0.3) {
                "input ( )".to_string()
            } else {
                let (name, arity, _) = callable[rng.random_range(0..callable.len())];
                format!("{name} {}", call_args(rng, env, *arity, depth - 1))
            }
        }
    }
}

fn additive(rng: &mut StdRng, env: &Env, depth: usize) -> String {
    let mut out = factor(rng, env, depth);
    for _ in 0..rng.random_range(0..3) {
        let op = OPS[rng.random_range(0..OPS.len())];
        out = format!("{out} {op} {}", factor(rng, env, depth));
    }
    out
}

fn expression(rng: &mut StdRng, env: &Env, depth: usize) -> String {
    let lhs = additive(rng, env, depth);
    if rng.random_bool(0.3) {
        let op = REL_OPS[rng.random_range(0..REL_OPS.len())];
        format!("{lhs} {op} {}", additive(rng, env, depth))
    } else {
        lhs
    }
}

fn statement(rng: &mut StdRng, env: &Env, returns_int: bool, depth: usize, out: &mut String) {
    let choice = if depth == 0 {
        rng.random_range(0..4)
    } else {
        rng.random_range(0..7)
    };
    match choice {
        0 => out.push_str(";\n"),
        1 => {
            let v = pick(rng, &env.scalars).to_string();
            out.push_str(&format!("{v} = {} ;\n", expression(rng, env, 2)));
        }
        2 if !env.arrays.is_empty() => {
            let a = pick(rng, &env.arrays).to_string();
            let i = expression(rng, env, 1);
            out.push_str(&format!("{a} [ {i} ] = {} ;\n", expression(rng, env, 2)));
        }
        2 | 3 => {
            let (name, arity) = match env.funs.len() {
                0 => ("output".to_string(), 1),
                n => {
                    let (name, arity, _) = &env.funs[rng.random_range(0..n)];
                    (name.clone(), *arity)
                }
            };
            out.push_str(&format!("{name} {} ;\n", call_args(rng, env, arity, 1)));
        }
        4 => {
            out.push_str(&format!("if ( {} ) {{\n", expression(rng, env, 2)));
            block(rng, env, returns_int, depth - 1, out);
            if rng.random_bool(0.5) {
                out.push_str("} else {\n");
                block(rng, env, returns_int, depth - 1, out);
            }
            out.push_str("}\n");
        }
        5 => {
            out.push_str(&format!("while ( {} )", expression(rng, env, 2)));
            if rng.random_bool(0.5) {
                out.push_str(" {\n");
                block(rng, env, returns_int, depth - 1, out);
                out.push_str("}\n");
            } else {
                out.push('\n');
                statement(rng, env, returns_int, depth - 1, out);
            }
        }
        _ => {
            if returns_int {
                out.push_str(&format!("return {} ;\n", expression(rng, env, 2)));
            } else {
                out.push_str("return ;\n");
            }
        }
    }
}

fn block(rng: &mut StdRng, env: &Env, returns_int: bool, depth: usize, out: &mut String) {
    for _ in 0..rng.random_range(0..4) {
        statement(rng, env, returns_int, depth, out);
    }
}

/// A random program with `n_defs` top-level definitions after a leading
/// `int g0 ;`.
pub fn gen_program(rng: &mut StdRng, n_defs: usize) -> Generated {
    let mut out = String::from("int g0 ;\n");
    let mut globals = vec!["g0".to_string()];
    let mut arrays = Vec::new();
    let mut funs: Vec<(String, usize, bool)> = Vec::new();
    let mut global_width = 4;

    for i in 0..n_defs {
        match rng.random_range(0..3) {
            0 => {
                let name = format!("g{}", i + 1);
                out.push_str(&format!("int {name} ;\n"));
                globals.push(name);
                global_width += 4;
            }
            1 => {
                let name = format!("a{}", i + 1);
                let len = rng.random_range(1..16);
                out.push_str(&format!("int {name} [ {len} ] ;\n"));
                arrays.push(name);
                global_width += 4 * len;
            }
            _ => {
                let name = format!("f{}", i + 1);
                let returns_int = rng.random_bool(0.6);
                let arity = rng.random_range(0..4);
                let mut params = Vec::new();
                let mut scalars = globals.clone();
                for p in 0..arity {
                    if rng.random_bool(0.25) {
                        params.push(format!("int q{p} [ ]"));
                    } else {
                        params.push(format!("int p{p}"));
                        scalars.push(format!("p{p}"));
                    }
                }
                let ret = if returns_int { "int" } else { "void" };
                out.push_str(&format!("{ret} {name} ( {} ) {{\n", params.join(" , ")));

                for l in 0..rng.random_range(0..3) {
                    out.push_str(&format!("int l{l} ;\n"));
                    scalars.push(format!("l{l}"));
                }

                funs.push((name, arity, returns_int));
                let env = Env {
                    arrays: arrays.clone(),
                    scalars,
                    funs: funs.clone(),
                };
                block(rng, &env, returns_int, 2, &mut out);
                if returns_int {
                    out.push_str(&format!("return {} ;\n", expression(rng, &env, 1)));
                }
                out.push_str("}\n");
            }
        }
    }

    Generated {
        source: out,
        global_width,
        functions: funs.len(),
    }
}
