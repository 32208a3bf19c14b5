//! Command handlers

pub mod config;
pub mod index;
pub mod status;
pub mod tag;
