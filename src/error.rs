//! Error type shared by table construction, parsing and semantic actions.
//!
//! Every error is fatal for the stage that produced it: the first one stops
//! table compilation or the parse, and nothing is aggregated.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The grammar is not LL(1), or a production references a sign of the
    /// wrong kind.
    GrammarDefinition { message: String },

    /// The current token selects no production or fails to match the
    /// expected terminal.
    Syntax { text: String, line: usize },

    /// A production's per-position action list does not line up with its
    /// right-hand side.
    SemanticRuleArity { production: String },

    /// Raised by a semantic action.
    Semantic { message: String, line: Option<usize> },
}

impl CompileError {
    pub fn grammar(message: impl Into<String>) -> Self {
        CompileError::GrammarDefinition {
            message: message.into(),
        }
    }

    pub fn semantic(message: impl Into<String>, line: Option<usize>) -> Self {
        CompileError::Semantic {
            message: message.into(),
            line,
        }
    }

    /// Source line the error points at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::Syntax { line, .. } => Some(*line),
            CompileError::Semantic { line, .. } => *line,
            _ => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::GrammarDefinition { message } => {
                write!(f, "grammar definition error: {message}")
            }
            CompileError::Syntax { text, line } => {
                if text.is_empty() {
                    write!(f, "syntax error at line {line}: unexpected end of input")
                } else {
                    write!(f, "syntax error at line {line}: unexpected `{text}`")
                }
            }
            CompileError::SemanticRuleArity { production } => {
                write!(
                    f,
                    "semantic rule count does not match right-hand side of `{production}`"
                )
            }
            CompileError::Semantic {
                message,
                line: Some(line),
            } => write!(f, "semantic error at line {line}: {message}"),
            CompileError::Semantic {
                message,
                line: None,
            } => write!(f, "semantic error: {message}"),
        }
    }
}

impl std::error::Error for CompileError {}
