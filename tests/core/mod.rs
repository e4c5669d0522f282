//! Core module tests for non-parser functionality
//!
//! Tests for:
//! - Store filtering and ordering
//! - Trip segmentation
//! - Radio-to-GNSS correlation
//! - Quality scoring
//! - Settings persistence

pub mod settings_tests;
