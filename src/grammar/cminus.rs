// src/grammar/cminus.rs
//! The C-minus language: alphabets, start symbol and the LL(1) production
//! list wired to [`Action`] ids.

use super::{Grammar, Rule, epsilon, rule};
use crate::{error::CompileError, semantic::rules::Action};

pub const TERMINALS: &[&str] = &[
    "int", "void", "id", "num", "(", ")", "[", "]", "{", "}", ",", ";", "=", "if", "else",
    "while", "return", "+", "-", "*", "/", "<", "<=", ">", ">=", "==", "!=",
];

pub const NON_TERMINALS: &[&str] = &[
    "program",
    "define-list",
    "define",
    "define-type",
    "var-define-follow",
    "type",
    "fun-define-follow",
    "params",
    "param-list",
    "param-follow",
    "param",
    "array-subscript",
    "code-block",
    "local-define-list",
    "local-var-define",
    "code-list",
    "code",
    "normal-statement",
    "normal-statement-follow",
    "call-follow",
    "call-params",
    "call-param-list",
    "call-param-follow",
    "selection-statement",
    "selection-follow",
    "iteration-statement",
    "iteration-follow",
    "return-statement",
    "return-follow",
    "var-follow",
    "expression",
    "expression-follow",
    "rel-op",
    "additive-expr",
    "additive-expr-follow",
    "add-op",
    "term",
    "term-follow",
    "mul-op",
    "factor",
    "id-factor-follow",
];

pub const START: &str = "program";

pub fn rules() -> Vec<Rule<Action>> {
    use Action::*;

    let mut rules = vec![
        rule("program", ["define-list"]),
        rule("define-list", ["define", "define-list"]),
        epsilon("define-list"),
        rule("define", ["type", "id", "define-type"]).at(2, CaptureDeclarator),
        rule("define-type", ["var-define-follow"]).at(0, Inherit),
        rule("define-type", ["fun-define-follow"]).at(0, Inherit),
        rule("var-define-follow", [";"]).end(DeclareVariable),
        rule("var-define-follow", ["[", "num", "]", ";"]).end(DeclareArray),
        rule("type", ["int"]).end(TypeFromKeyword),
        rule("type", ["void"]).end(TypeFromKeyword),
        // functions
        rule("fun-define-follow", ["(", "params", ")", "code-block"]).start(OpenFunction),
        rule("params", ["param-list"]),
        epsilon("params"),
        rule("param-list", ["param", "param-follow"]),
        rule("param-follow", [",", "param", "param-follow"]),
        epsilon("param-follow"),
        rule("param", ["type", "id", "array-subscript"]).end(DeclareParam),
        rule("array-subscript", ["[", "]"]).end(MarkArray),
        epsilon("array-subscript").end(MarkScalar),
        rule("code-block", ["{", "local-define-list", "code-list", "}"]),
        rule("local-define-list", ["local-var-define", "local-define-list"]),
        epsilon("local-define-list"),
        rule("local-var-define", ["type", "id", "var-define-follow"]).at(2, CaptureDeclarator),
        // statements
        rule("code-list", ["code", "code-list"]),
        epsilon("code-list"),
        rule("code", ["normal-statement"]),
        rule("code", ["selection-statement"]),
        rule("code", ["iteration-statement"]),
        rule("code", ["return-statement"]),
        rule("normal-statement", [";"]),
        rule("normal-statement", ["id", "normal-statement-follow"]).at(1, PassId),
        rule("normal-statement-follow", ["var-follow", "=", "expression", ";"])
            .start(ResolveVariable),
        rule("normal-statement-follow", ["call-follow", ";"]).at(0, Inherit),
        rule("call-follow", ["(", "call-params", ")"])
            .start(ResolveCall)
            .end(CheckCall),
        rule("call-params", ["call-param-list"]).end(ArgsFrom(0)),
        epsilon("call-params").end(ArgsNone),
        rule("call-param-list", ["expression", "call-param-follow"]).end(ArgsPrepend(1)),
        rule("call-param-follow", [",", "expression", "call-param-follow"]).end(ArgsPrepend(2)),
        epsilon("call-param-follow").end(ArgsNone),
        rule(
            "selection-statement",
            ["if", "(", "expression", ")", "{", "code-list", "}", "selection-follow"],
        ),
        rule("selection-follow", ["else", "{", "code-list", "}"]),
        epsilon("selection-follow"),
        rule("iteration-statement", ["while", "(", "expression", ")", "iteration-follow"]),
        rule("iteration-follow", ["{", "code-list", "}"]),
        rule("iteration-follow", ["code"]),
        rule("return-statement", ["return", "return-follow"]),
        rule("return-follow", [";"]).start(ReturnNothing),
        rule("return-follow", ["expression", ";"]).start(ReturnValue),
        rule("var-follow", ["[", "expression", "]"]),
        epsilon("var-follow"),
        // expressions
        rule("expression", ["additive-expr", "expression-follow"]),
        rule("expression-follow", ["rel-op", "additive-expr"]),
        epsilon("expression-follow"),
    ];

    for op in ["<=", "<", ">", ">=", "==", "!="] {
        rules.push(rule("rel-op", [op]).end(Operator));
    }
    rules.extend([
        rule("additive-expr", ["term", "additive-expr-follow"]),
        rule("additive-expr-follow", ["add-op", "term", "additive-expr-follow"]),
        epsilon("additive-expr-follow"),
        rule("add-op", ["+"]).end(Operator),
        rule("add-op", ["-"]).end(Operator),
        rule("term", ["factor", "term-follow"]),
        rule("term-follow", ["mul-op", "factor", "term-follow"]),
        epsilon("term-follow"),
        rule("mul-op", ["*"]).end(Operator),
        rule("mul-op", ["/"]).end(Operator),
        rule("factor", ["(", "expression", ")"]),
        rule("factor", ["id", "id-factor-follow"]).at(1, PassId),
        rule("factor", ["num"]).end(LiteralValue),
        rule("id-factor-follow", ["[", "expression", "]"]).start(ResolveVariable),
        rule("id-factor-follow", ["call-follow"])
            .at(0, Inherit)
            .end(RequireValue),
        epsilon("id-factor-follow").start(ResolveVariable),
    ]);
    rules
}

pub fn grammar() -> Result<Grammar<Action>, CompileError> {
    Grammar::builder()
        .terminals(TERMINALS.iter().copied())
        .non_terminals(NON_TERMINALS.iter().copied())
        .start(START)
        .rules(rules())
        .build()
}
