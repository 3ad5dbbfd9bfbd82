//! Utility modules for common functionality.
//!
//! Currently just logging configuration; the hosting application decides
//! when (and whether) to initialize it.

pub mod logger;
