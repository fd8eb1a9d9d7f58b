//! Stack driver: tree shape, error locality and action scheduling.

mod common;

use std::{cell::RefCell, rc::Rc};

use cminusc::{
    CompileError, Token,
    grammar::{Grammar, Sign, epsilon, rule},
    parser::{Parser, PredictiveTable, tables::ParseTable, tree::NodeId},
    semantic::{BoundRule, SemanticRule, no_actions, symbol::SymbolTablePool},
};
use common::toks;

type Log = Rc<RefCell<Vec<String>>>;

fn compile<A>(g: &Grammar<A>) -> ParseTable {
    PredictiveTable::compile(g).unwrap().into_table()
}

/// Factory recording every action id as it runs. Ids starting with `fail`
/// report an error on line 7 instead.
fn recorder(
    log: &Log,
) -> impl Fn(&&'static str, NodeId) -> Option<Box<dyn SemanticRule>> + use<> {
    let log = log.clone();
    move |action: &&'static str, node: NodeId| -> Option<Box<dyn SemanticRule>> {
        let log = log.clone();
        let name = *action;
        Some(BoundRule::boxed(node, move |_cx, _node| {
            if name.starts_with("fail") {
                return Err(CompileError::semantic(name, Some(7)));
            }
            log.borrow_mut().push(name.to_string());
            Ok(())
        }))
    }
}

fn toy() -> Grammar<()> {
    Grammar::builder()
        .terminals(["a", "b"])
        .non_terminals(["S"])
        .start("S")
        .rules([rule("S", ["a", "S"]), epsilon("S")])
        .build()
        .unwrap()
}

#[test]
fn nested_tree_ends_in_epsilon() {
    let g = toy();
    let table = compile(&g);
    let parser = Parser::new(&g, &table, no_actions::<()>);
    let mut pool = SymbolTablePool::init();
    let tree = parser.execute(&toks(&["a", "a"]), &mut pool).unwrap();

    let s = Sign::NonTerminal(0);
    let a = g.terminal("a").unwrap();
    let root = tree.root();
    assert_eq!(tree.sign(root), s);
    let kids: Vec<Sign> = tree.children(root).iter().map(|&c| tree.sign(c)).collect();
    assert_eq!(kids, vec![a, s]);

    let inner = tree.child(root, 1).unwrap();
    assert_eq!(tree.children(inner).len(), 2);
    let innermost = tree.child(inner, 1).unwrap();
    assert_eq!(tree.sign(innermost), s);
    assert!(tree.children(innermost).is_empty());
    assert_eq!(tree.parent(innermost), Some(inner));
    assert_eq!(tree.ancestors(innermost).collect::<Vec<_>>(), vec![inner, root]);

    assert_eq!(tree.leaf_texts(), vec!["a", "a"]);
    let second_a = tree.child(inner, 0).unwrap();
    assert_eq!(tree.attrs(second_a).line, Some(2));
    assert_eq!(tree.sibling(innermost, 1), Some(second_a));
    assert_eq!(tree.sibling(innermost, 2), None);
}

#[test]
fn empty_input_takes_the_epsilon_production() {
    let g = toy();
    let table = compile(&g);
    let parser = Parser::new(&g, &table, no_actions::<()>);
    let tree = parser.execute(&[], &mut SymbolTablePool::init()).unwrap();
    assert!(tree.children(tree.root()).is_empty());
    assert!(tree.leaves().is_empty());
}

#[test]
fn syntax_error_points_at_the_offending_token() {
    let g = toy();
    let table = compile(&g);
    let parser = Parser::new(&g, &table, no_actions::<()>);
    let err = parser
        .execute(&toks(&["a", "b"]), &mut SymbolTablePool::init())
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::Syntax {
            text: "b".into(),
            line: 2
        }
    );
    assert_eq!(err.line(), Some(2));
}

#[test]
fn unknown_token_kind_is_a_syntax_error() {
    let g = toy();
    let table = compile(&g);
    let parser = Parser::new(&g, &table, no_actions::<()>);
    let tokens = vec![Token::new("a", "a", 1), Token::new("mystery", "?", 3)];
    let err = parser
        .execute(&tokens, &mut SymbolTablePool::init())
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::Syntax {
            text: "?".into(),
            line: 3
        }
    );
}

#[test]
fn running_out_of_input_reports_end_of_input() {
    let g: Grammar<()> = Grammar::builder()
        .terminals(["a", "b"])
        .non_terminals(["S"])
        .start("S")
        .rule(rule("S", ["a", "b"]))
        .build()
        .unwrap();
    let table = compile(&g);
    let parser = Parser::new(&g, &table, no_actions::<()>);
    let err = parser
        .execute(&toks(&["a"]), &mut SymbolTablePool::init())
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::Syntax {
            text: String::new(),
            line: 1
        }
    );
    assert!(err.to_string().contains("end of input"));
}

/// P -> A ; A -> X Y Z ; X -> x ; Y -> y ; Z -> z
fn scheduled() -> Grammar<&'static str> {
    Grammar::builder()
        .terminals(["x", "y", "z"])
        .non_terminals(["P", "A", "X", "Y", "Z"])
        .start("P")
        .rules([
            rule("P", ["A"]),
            rule("A", ["X", "Y", "Z"])
                .start("s")
                .end("e")
                .at(0, "a0")
                .at(1, "a1")
                .at(2, "a2"),
            rule("X", ["x"]).start("X"),
            rule("Y", ["y"]).start("Y"),
            rule("Z", ["z"]).start("Z"),
        ])
        .build()
        .unwrap()
}

#[test]
fn actions_run_in_scheduling_order() {
    let g = scheduled();
    let table = compile(&g);
    let log = Log::default();
    let parser = Parser::new(&g, &table, recorder(&log));
    parser
        .execute(&toks(&["x", "y", "z"]), &mut SymbolTablePool::init())
        .unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["s", "a0", "X", "a1", "Y", "a2", "Z", "e"]
    );
}

#[test]
fn no_action_runs_past_a_syntax_error() {
    let g = scheduled();
    let table = compile(&g);
    let log = Log::default();
    let parser = Parser::new(&g, &table, recorder(&log));
    let err = parser
        .execute(&toks(&["x", "x", "z"]), &mut SymbolTablePool::init())
        .unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert_eq!(*log.borrow(), vec!["s", "a0", "X", "a1"]);
}

#[test]
fn first_action_error_halts_the_parse() {
    let g: Grammar<&'static str> = Grammar::builder()
        .terminals(["x", "y"])
        .non_terminals(["P", "X", "Y"])
        .start("P")
        .rules([
            rule("P", ["X", "Y"]).end("after-p"),
            rule("X", ["x"]).end("fail-x"),
            rule("Y", ["y"]).start("after-y"),
        ])
        .build()
        .unwrap();
    let table = compile(&g);
    let log = Log::default();
    let parser = Parser::new(&g, &table, recorder(&log));
    let err = parser
        .execute(&toks(&["x", "y"]), &mut SymbolTablePool::init())
        .unwrap_err();
    assert_eq!(err, CompileError::semantic("fail-x", Some(7)));
    assert!(log.borrow().is_empty());
}

#[test]
fn mismatched_action_list_is_an_arity_error() {
    let g: Grammar<()> = Grammar::builder()
        .terminals(["a"])
        .non_terminals(["S"])
        .start("S")
        .rule(rule("S", ["a"]).children([None, None]))
        .build()
        .unwrap();
    let table = compile(&g);
    let parser = Parser::new(&g, &table, no_actions::<()>);
    let err = parser
        .execute(&toks(&["a"]), &mut SymbolTablePool::init())
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::SemanticRuleArity {
            production: "S -> a".into()
        }
    );
}

#[test]
fn leaves_reproduce_a_long_input() {
    let g = toy();
    let table = compile(&g);
    let parser = Parser::new(&g, &table, no_actions::<()>);
    let kinds = vec!["a"; 500];
    let tree = parser
        .execute(&toks(&kinds), &mut SymbolTablePool::init())
        .unwrap();
    assert_eq!(tree.leaf_texts(), kinds);
    // 500 terminals, 501 S nodes.
    assert_eq!(tree.len() - 1, 1001);
}

#[test]
fn tree_dumps_name_every_node() {
    let g = toy();
    let table = compile(&g);
    let parser = Parser::new(&g, &table, no_actions::<()>);
    let tree = parser
        .execute(&toks(&["a"]), &mut SymbolTablePool::init())
        .unwrap();

    assert_eq!(tree.render(&g), "S\n  a `a` @1\n  S -> empty\n");
    let json = tree.to_json(&g);
    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[1]["sign"], "a");
    assert_eq!(nodes[1]["attrs"]["lexical"], "a");
}
