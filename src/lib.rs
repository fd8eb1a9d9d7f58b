// src/lib.rs
pub mod error;
pub mod frontend;
pub mod grammar;
pub mod parser;
pub mod semantic;
pub mod token;
pub mod util;

pub use error::CompileError;
pub use frontend::{Compilation, Frontend};
pub use token::{Token, load_tokens_json};
