//! Test module for hub-core
//!
//! This module contains cross-module tests for:
//! - Text search through the pipeline (spans, author keys, empty query bypass)
//! - Filter dimensions over a realistic index, plus widening/identity properties
//! - Sort orders, stability, idempotence and purity
//! - URL codec round-trips and the query store driving the pipeline
//! - Pagination reconstruction
//! - Configuration loading and defaults

// Test modules use exact float comparisons
#![allow(clippy::float_cmp)]

mod fixtures;
mod query_tests;
