//! Subcommands.

pub mod batch;
pub mod config;
pub mod detect;
pub mod extract;
pub mod input;
pub mod normalize;
pub mod template;
pub mod word;
