//! gramc-util - Foundation Types for the Gram Toolchain
//!
//! This crate provides the ownership primitives shared by the compiler
//! front-end crates:
//!
//! - **Managed storage** ([`Arena`], [`Heap`], [`Root`], [`ManagedPtr`]):
//!   bulk ownership for large node graphs such as a grammar AST. Many small
//!   nodes live and die together under a single owner; individual references
//!   between them are unowning handles.
//! - **Write-once cells** ([`AssignOnce`]): slots populated exactly once by a
//!   later compiler pass. A second assignment is a programming error.
//! - **Source positions** ([`Pos`], [`SynString`]): line/column coordinates
//!   attached to grammar names and literals.

pub mod arena;
pub mod assign_once;
pub mod pos;

pub use arena::{Arena, Heap, ManagedPtr, Root};
pub use assign_once::AssignOnce;
pub use pos::{Pos, SynString};
