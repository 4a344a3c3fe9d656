pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod scanner;
pub mod search;
pub mod summary;
pub mod trash;

pub use config::Config;
pub use error::{Error, Result};
pub use scanner::Scanner;
pub use search::SearchEngine;
pub use trash::TrashStore;
