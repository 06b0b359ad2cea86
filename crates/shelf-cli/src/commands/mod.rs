//! Command handlers

pub mod book;
pub mod catalog;
pub mod config;
