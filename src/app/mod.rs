// Application layer: terminal presentation over the core session.

pub mod render;
pub mod shell;

pub use shell::{parse_command, Command, Flow, Shell};
