//! Program model types.
//!
//! This module contains the structured representation of a step-logic program
//! description after normalization and parsing.
//!
//! # Pipeline Position
//!
//! ```text
//! Extracted Text
//!     ↓ normalize
//! Canonical Lines
//!     ↓ extract
//! Step / Latch Blocks
//!     ↓ conditions + cross-references
//! Program Model (these types) - steps, groups, references, variables
//!     ↓ validate
//! Parse Result with diagnostics
//! ```
//!
//! # Organization
//!
//! - [`step`] - [`Step`], [`StepKind`] and [`Assignment`]
//! - [`condition`] - [`ConditionGroup`], [`Condition`], [`Operator`] and [`TimeSpec`]
//! - [`reference`] - [`CrossReference`] and [`StepRange`]
//! - [`latch`] - [`LatchBlock`]
//! - [`variable`] - [`Variable`] and [`VariableKind`]
//! - [`program`] - [`ParseContext`], [`ProgramMetadata`] and [`Statistics`]

pub mod condition;
pub mod latch;
pub mod program;
pub mod reference;
pub mod step;
pub mod variable;

pub use condition::*;
pub use latch::*;
pub use program::*;
pub use reference::*;
pub use step::*;
pub use variable::*;
