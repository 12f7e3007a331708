pub mod ast;
pub mod ast_printer;
pub mod context;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;
