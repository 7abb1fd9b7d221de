//! Data models for docbind.

pub mod config;
pub mod document;
pub mod region;
pub mod result;
pub mod template;
