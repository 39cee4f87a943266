//! Waterspread Core - Domain models, configuration, and input formats
//!
//! This crate contains the domain types shared by the boundary detector and the
//! water-spread estimator, the layered configuration, and the readers that turn
//! uploaded vector files into a region of interest.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;

pub use error::{Result, WaterspreadError};
