mod args;

pub use args::{CartCommand, Cli, Commands};
