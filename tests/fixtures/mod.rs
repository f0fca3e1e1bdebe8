//! Test fixtures and data generators
//!
//! This module contains builders for creating VGM test data.
#![allow(dead_code)]

pub mod builders;

pub use builders::*;
