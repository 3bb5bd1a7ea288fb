pub mod commands;
pub mod export;
pub mod handlers;
pub mod output;
