//! Utility functions for the waybill core.
//!
//! Contains helper functions for common operations such as string formatting
//! and ID truncation for display purposes.

pub mod formatting;

pub use formatting::truncate_id;
