//! Command handlers

pub mod book;
pub mod config;
pub mod greeting;
pub mod status;
pub mod tag;
