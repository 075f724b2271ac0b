//! heritage-core
//!
//! Shared types, traits, errors and configuration for the heritage
//! question-answering workspace.
#![deny(unused_variables)]

pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
