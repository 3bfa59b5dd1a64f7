//! Size-bounded rich-text chunking.
//!
//! A block tree (usually parsed from markdown) is rendered into plain text
//! plus formatting annotations whose offsets and lengths are measured in
//! UTF-16 code units, then split into chunks that each fit a message limit.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
