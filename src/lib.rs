// src/lib.rs
//! Survey export → dashboard JSON.
//!
//! [`load`] turns the raw CSV blob into a cleaned [`load::Dataset`],
//! [`transform`] derives every artifact from it, [`output`] writes them and
//! [`pipeline`] strings the three together.

pub mod config;
pub mod load;
pub mod output;
pub mod pipeline;
pub mod transform;
