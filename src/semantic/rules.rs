// src/semantic/rules.rs
//! Semantic actions of the C-minus grammar. They declare names into the
//! symbol tables and check every use against them.

use super::{
    ActionContext, ActionFactory, BoundRule, SemanticRule,
    symbol::{INT_WIDTH, LocalVarTable, Symbol, ValueType},
};
use crate::{
    error::CompileError,
    parser::tree::{NodeId, ParseTree},
};

/// Action ids referenced by the C-minus production list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `type -> int | void`: record the keyword as the node's type.
    TypeFromKeyword,
    /// Before a declaration tail: pick up type and name from the two
    /// preceding siblings.
    CaptureDeclarator,
    /// Copy type, identifier and line from the parent.
    Inherit,
    /// Copy the identifier and line of the preceding sibling.
    PassId,
    DeclareVariable,
    DeclareArray,
    OpenFunction,
    DeclareParam,
    MarkArray,
    MarkScalar,
    ResolveVariable,
    ResolveCall,
    CheckCall,
    /// A call used inside an expression must produce a value.
    RequireValue,
    ArgsNone,
    /// Argument count of child `n`.
    ArgsFrom(usize),
    /// One argument plus the count of child `n`.
    ArgsPrepend(usize),
    ReturnNothing,
    ReturnValue,
    LiteralValue,
    Operator,
}

/// Factory for [`Action`]; every id maps onto an action.
#[derive(Debug, Clone, Copy, Default)]
pub struct CminusActions;

impl ActionFactory<Action> for CminusActions {
    fn instantiate(&self, action: &Action, node: NodeId) -> Option<Box<dyn SemanticRule>> {
        let action = *action;
        Some(BoundRule::boxed(node, move |cx, node| apply(action, cx, node)))
    }
}

fn internal(what: &str) -> CompileError {
    CompileError::semantic(format!("malformed tree: {what}"), None)
}

fn child(tree: &ParseTree, node: NodeId, i: usize) -> Result<NodeId, CompileError> {
    tree.child(node, i)
        .ok_or_else(|| internal("missing child"))
}

fn sibling(tree: &ParseTree, node: NodeId, back: usize) -> Result<NodeId, CompileError> {
    tree.sibling(node, back)
        .ok_or_else(|| internal("missing sibling"))
}

fn lexical(tree: &ParseTree, node: NodeId) -> Result<String, CompileError> {
    tree.attrs(node)
        .lexical
        .clone()
        .ok_or_else(|| internal("token text not recorded"))
}

fn identifier(tree: &ParseTree, node: NodeId) -> Result<(String, Option<usize>), CompileError> {
    let attrs = tree.attrs(node);
    let name = attrs.id.clone().ok_or_else(|| internal("identifier not passed down"))?;
    Ok((name, attrs.line))
}

/// Name of the function whose definition encloses `node`.
fn enclosing_function(tree: &ParseTree, node: NodeId) -> Option<String> {
    std::iter::once(node)
        .chain(tree.ancestors(node))
        .find_map(|n| tree.attrs(n).fun.clone())
}

fn return_type_of(cx: &ActionContext<'_>, fun: &str) -> Result<ValueType, CompileError> {
    match cx.pool.fun(fun) {
        Some(Symbol::Fun { return_type, .. }) => Ok(*return_type),
        _ => Err(internal("enclosing function not registered")),
    }
}

fn is_visible(cx: &ActionContext<'_>, node: NodeId, name: &str) -> bool {
    match enclosing_function(cx.tree, node).and_then(|f| cx.pool.scope(&f)) {
        Some(view) => view.lookup(name).is_some(),
        None => cx.pool.global().exist(name),
    }
}

fn apply(action: Action, cx: &mut ActionContext<'_>, node: NodeId) -> Result<(), CompileError> {
    use Action::*;
    match action {
        TypeFromKeyword => {
            let kw = child(cx.tree, node, 0)?;
            let text = lexical(cx.tree, kw)?;
            let ty = ValueType::from_keyword(&text).ok_or_else(|| {
                CompileError::semantic(format!("`{text}` is not a type"), cx.tree.attrs(kw).line)
            })?;
            cx.tree.attrs_mut(node).ty = Some(ty);
        }
        CaptureDeclarator => {
            let ty_node = sibling(cx.tree, node, 2)?;
            let id_node = sibling(cx.tree, node, 1)?;
            let ty = cx.tree.attrs(ty_node).ty;
            let name = lexical(cx.tree, id_node)?;
            let line = cx.tree.attrs(id_node).line;
            let attrs = cx.tree.attrs_mut(node);
            attrs.ty = ty;
            attrs.id = Some(name);
            attrs.line = line;
        }
        Inherit => {
            let parent = cx.tree.parent(node).ok_or_else(|| internal("missing parent"))?;
            let from = cx.tree.attrs(parent).clone();
            let attrs = cx.tree.attrs_mut(node);
            attrs.ty = from.ty;
            attrs.id = from.id;
            attrs.line = from.line;
        }
        PassId => {
            let id_node = sibling(cx.tree, node, 1)?;
            let name = lexical(cx.tree, id_node)?;
            let line = cx.tree.attrs(id_node).line;
            let attrs = cx.tree.attrs_mut(node);
            attrs.id = Some(name);
            attrs.line = line;
        }
        DeclareVariable => declare_variable(cx, node, INT_WIDTH, None)?,
        DeclareArray => {
            let num = child(cx.tree, node, 1)?;
            let text = lexical(cx.tree, num)?;
            let (name, line) = identifier(cx.tree, node)?;
            let length = match text.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(CompileError::semantic(
                        format!("array `{name}` needs a positive length, got `{text}`"),
                        line,
                    ));
                }
            };
            let width = INT_WIDTH
                .checked_mul(length)
                .ok_or_else(|| too_large(&name, Some(length), line))?;
            declare_variable(cx, node, width, Some(length))?;
        }
        OpenFunction => {
            let (name, line) = identifier(cx.tree, node)?;
            let return_type = cx
                .tree
                .attrs(node)
                .ty
                .ok_or_else(|| internal("function type not passed down"))?;
            if cx.pool.fun(&name).is_some() || cx.pool.global().exist(&name) {
                return Err(CompileError::semantic(
                    format!("`{name}` is already declared"),
                    line,
                ));
            }
            let scope = cx.pool.append(LocalVarTable::new(name.clone()));
            cx.pool
                .funs_mut()
                .append(Symbol::fun(name.clone(), return_type, Vec::new(), scope));
            cx.tree.attrs_mut(node).fun = Some(name);
        }
        DeclareParam => {
            let ty_node = child(cx.tree, node, 0)?;
            let id_node = child(cx.tree, node, 1)?;
            let subscript = child(cx.tree, node, 2)?;
            let name = lexical(cx.tree, id_node)?;
            let line = cx.tree.attrs(id_node).line;
            let is_array = cx.tree.attrs(subscript).flag.unwrap_or(false);
            let ty = cx
                .tree
                .attrs(ty_node)
                .ty
                .ok_or_else(|| internal("parameter type not recorded"))?;
            if ty == ValueType::Void {
                return Err(CompileError::semantic(
                    format!("parameter `{name}` declared void"),
                    line,
                ));
            }
            let fun = enclosing_function(cx.tree, node)
                .ok_or_else(|| internal("parameter outside of a function"))?;
            let exists = cx
                .pool
                .scope(&fun)
                .ok_or_else(|| internal("function scope not registered"))?
                .exist(&name);
            if exists {
                return Err(CompileError::semantic(
                    format!("parameter `{name}` is already declared"),
                    line,
                ));
            }
            if let Some(table) = cx.pool.query_mut(&fun) {
                table.append(Symbol::local_var(name.clone(), ty, INT_WIDTH, true));
            }
            if let Some(Symbol::Fun { param_types, .. }) = cx.pool.fun_mut(&fun) {
                param_types.push(ty);
            }
            let attrs = cx.tree.attrs_mut(node);
            attrs.id = Some(name);
            attrs.ty = Some(ty);
            attrs.flag = Some(is_array);
            attrs.line = line;
        }
        MarkArray => cx.tree.attrs_mut(node).flag = Some(true),
        MarkScalar => cx.tree.attrs_mut(node).flag = Some(false),
        ResolveVariable => {
            let (name, line) = identifier(cx.tree, node)?;
            if !is_visible(cx, node, &name) {
                return Err(CompileError::semantic(
                    format!("undeclared identifier `{name}`"),
                    line,
                ));
            }
            cx.tree.attrs_mut(node).ty = Some(ValueType::Int);
        }
        ResolveCall => {
            let (name, line) = identifier(cx.tree, node)?;
            let Some(Symbol::Fun { return_type, .. }) = cx.pool.fun(&name) else {
                return Err(CompileError::semantic(
                    format!("call to undefined function `{name}`"),
                    line,
                ));
            };
            cx.tree.attrs_mut(node).ty = Some(*return_type);
        }
        CheckCall => {
            let (name, line) = identifier(cx.tree, node)?;
            let params = child(cx.tree, node, 1)?;
            let given = cx.tree.attrs(params).length.unwrap_or(0);
            let expected = match cx.pool.fun(&name) {
                Some(Symbol::Fun { param_types, .. }) => param_types.len(),
                _ => return Err(internal("call target vanished")),
            };
            if given != expected {
                return Err(CompileError::semantic(
                    format!("function `{name}` expects {expected} argument(s), got {given}"),
                    line,
                ));
            }
            cx.tree.attrs_mut(node).length = Some(given);
        }
        RequireValue => {
            let call = child(cx.tree, node, 0)?;
            let ty = cx.tree.attrs(call).ty;
            if ty == Some(ValueType::Void) {
                let (name, line) = identifier(cx.tree, node)?;
                return Err(CompileError::semantic(
                    format!("void function `{name}` used as a value"),
                    line,
                ));
            }
            cx.tree.attrs_mut(node).ty = ty;
        }
        ArgsNone => cx.tree.attrs_mut(node).length = Some(0),
        ArgsFrom(i) => {
            let from = child(cx.tree, node, i)?;
            let n = cx.tree.attrs(from).length.unwrap_or(0);
            cx.tree.attrs_mut(node).length = Some(n);
        }
        ArgsPrepend(i) => {
            let rest = child(cx.tree, node, i)?;
            let n = cx.tree.attrs(rest).length.unwrap_or(0);
            cx.tree.attrs_mut(node).length = Some(n + 1);
        }
        ReturnNothing | ReturnValue => {
            let keyword = sibling(cx.tree, node, 1)?;
            let line = cx.tree.attrs(keyword).line;
            let fun = enclosing_function(cx.tree, node).ok_or_else(|| {
                CompileError::semantic("`return` outside of a function", line)
            })?;
            let ret = return_type_of(cx, &fun)?;
            if action == ReturnNothing && ret != ValueType::Void {
                return Err(CompileError::semantic(
                    format!("function `{fun}` must return a value"),
                    line,
                ));
            }
            if action == ReturnValue && ret == ValueType::Void {
                return Err(CompileError::semantic(
                    format!("void function `{fun}` cannot return a value"),
                    line,
                ));
            }
        }
        LiteralValue => {
            let lit = child(cx.tree, node, 0)?;
            let text = lexical(cx.tree, lit)?;
            let line = cx.tree.attrs(lit).line;
            let value = text.parse::<i64>().map_err(|_| {
                CompileError::semantic(format!("invalid integer literal `{text}`"), line)
            })?;
            let attrs = cx.tree.attrs_mut(node);
            attrs.num = Some(value);
            attrs.ty = Some(ValueType::Int);
            attrs.line = line;
        }
        Operator => {
            let op = child(cx.tree, node, 0)?;
            let text = lexical(cx.tree, op)?;
            cx.tree.attrs_mut(node).op = Some(text);
        }
    }
    Ok(())
}

fn too_large(name: &str, length: Option<usize>, line: Option<usize>) -> CompileError {
    let what = if length.is_some() { "array" } else { "variable" };
    CompileError::semantic(format!("{what} `{name}` is too large"), line)
}

/// Append the declared name to the enclosing function's table, or to the
/// global table outside of any function.
fn declare_variable(
    cx: &mut ActionContext<'_>,
    node: NodeId,
    width: usize,
    length: Option<usize>,
) -> Result<(), CompileError> {
    let (name, line) = identifier(cx.tree, node)?;
    let ty = cx
        .tree
        .attrs(node)
        .ty
        .ok_or_else(|| internal("variable type not passed down"))?;
    if ty == ValueType::Void {
        return Err(CompileError::semantic(
            format!("variable `{name}` declared void"),
            line,
        ));
    }
    let duplicate = || CompileError::semantic(format!("`{name}` is already declared"), line);

    match enclosing_function(cx.tree, node) {
        Some(fun) => {
            let view = cx
                .pool
                .scope(&fun)
                .ok_or_else(|| internal("function scope not registered"))?;
            if view.exist(&name) {
                return Err(duplicate());
            }
            if !view.local.table().has_room(width) {
                return Err(too_large(&name, length, line));
            }
            if let Some(table) = cx.pool.query_mut(&fun) {
                table.append(Symbol::local_var(name.clone(), ty, width, false));
            }
        }
        None => {
            if cx.pool.global().exist(&name) || cx.pool.fun(&name).is_some() {
                return Err(duplicate());
            }
            if !cx.pool.global().has_room(width) {
                return Err(too_large(&name, length, line));
            }
            cx.pool
                .global_mut()
                .append(Symbol::global_var(name.clone(), ty, width));
        }
    }

    cx.tree.attrs_mut(node).length = length;
    Ok(())
}
