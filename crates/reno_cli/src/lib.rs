pub mod app;
pub mod cli;
pub mod render;
pub mod shell;
