//! Integration tests for Layer 2: Engine
//!
//! Tests for pattern matching, rule registration, and the execution loop.

mod execution;
mod patterns;
mod rules;
