//! Seeded random valid programs. Override the sweep with
//! CMINUSC_FUZZ_SEEDS / CMINUSC_FUZZ_DEFS.

mod common;

use cminusc::Frontend;
use common::{gen_program, lex};
use rand::{SeedableRng, rngs::StdRng};

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

#[test]
fn random_programs_parse_and_fill_tables() {
    let frontend = Frontend::new().unwrap();
    let seeds = env_u64("CMINUSC_FUZZ_SEEDS", 32);
    let n_defs = env_usize("CMINUSC_FUZZ_DEFS", 12);

    for seed in 0..seeds {
        let mut rng = StdRng::seed_from_u64(seed);
        let generated = gen_program(&mut rng, n_defs);
        let tokens = lex(&generated.source);

        let out = match frontend.parse(&tokens) {
            Ok(out) => out,
            Err(e) => panic!("seed {seed}: {e}\n{}", generated.source),
        };

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(out.tree.leaf_texts(), texts, "seed {seed}");
        assert_eq!(
            out.symbols.global().width(),
            generated.global_width,
            "seed {seed}"
        );
        assert_eq!(
            out.symbols.funs().len(),
            2 + generated.functions,
            "seed {seed}"
        );
        assert_eq!(out.symbols.locals().len(), 2 + generated.functions);
    }
}

#[test]
#[ignore]
fn large_random_program() {
    let frontend = Frontend::new().unwrap();
    let mut rng = StdRng::seed_from_u64(env_u64("CMINUSC_FUZZ_SEED", 42));
    let generated = gen_program(&mut rng, env_usize("CMINUSC_FUZZ_LARGE_DEFS", 2000));
    let tokens = lex(&generated.source);
    let t0 = std::time::Instant::now();
    let out = frontend.parse(&tokens).unwrap();
    let ms = t0.elapsed().as_secs_f64() * 1e3;
    println!(
        "[random_programs] {} tokens, {} nodes in {ms:.3} ms",
        tokens.len(),
        out.tree.len() - 1
    );
}
