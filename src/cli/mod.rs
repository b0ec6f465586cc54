pub mod forms;
pub mod output;
mod screens;
pub mod ui;
pub mod wizards;

pub use screens::{run_cli, App};
