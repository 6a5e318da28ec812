//! Core domain + application logic for the showcase bot.
//!
//! This crate is framework-agnostic. The messaging transport lives behind the
//! `SessionPort` trait, implemented in adapter crates (Telegram today).

pub mod archive;
pub mod config;
pub mod connection;
pub mod domain;
pub mod errors;
pub mod event;
pub mod logging;
pub mod messaging;
pub mod script;
pub mod sequencer;
pub mod utils;

pub use errors::{Error, Result};
