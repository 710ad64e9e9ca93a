//! Steplogic Core Types and Definitions
//!
//! This crate provides the foundational types shared by the step-logic
//! parser, library facade and CLI. It includes:
//!
//! - **Model**: The parsed program model: steps, condition groups,
//!   cross-references, latch blocks and variables ([`model`] module)
//! - **Syntax**: The keyword synonym tables and validation thresholds that
//!   drive the parser ([`syntax`] module)

pub mod model;
pub mod syntax;
