//! Utility modules for the publisher.

pub mod exec;
pub mod path;
