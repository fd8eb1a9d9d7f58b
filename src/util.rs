//! Small helpers for env flags.

/// Treat any value other than "0"/"false" (case-insensitive) as true.
pub fn env_flag_true(var: &str, default: bool) -> bool {
    std::env::var(var)
        .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
        .unwrap_or(default)
}

/// Gate for printing advisory grammar warnings.
pub fn diagnostics_enabled() -> bool {
    env_flag_true("CMINUSC_DIAGNOSTICS", true)
}

/// Gate for the rendered parse tree in text output.
pub fn tree_enabled() -> bool {
    env_flag_true("CMINUSC_TREE", true)
}
