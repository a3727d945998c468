//! Resume tailoring: LLM rewrite of a LaTeX source and PDF compilation.

pub mod compiler;
pub mod handlers;
pub mod prompts;
pub mod rebuild;

pub use compiler::{CompileError, LatexCompiler};
