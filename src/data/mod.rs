//! Read/write layer for the curated datasets.
//!
//! Reads come from the publish tree (what the site actually serves); writes
//! go to the source tree and flow to the publish tree on the next build.

pub mod featured;
pub mod reader;
pub mod search;
pub mod types;
pub mod writer;
