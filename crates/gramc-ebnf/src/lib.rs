//! gramc-ebnf - EBNF Grammar Intermediate Representation
//!
//! The grammar IR the parser front-end builds and later passes annotate:
//!
//! - [`ast`]: declaration and expression nodes, arena-allocated with
//!   unowning [`gramc_util::ManagedPtr`] links. Ownership is bulk: all
//!   nodes of one grammar live in arenas owned by a single
//!   [`gramc_util::Root`].
//! - [`extension`]: write-once side records populated by compiler passes
//!   (voidness, general and concrete types, AND-expression meaning, ...).
//! - [`types`]: resolved semantic types with identity equality (structural
//!   for arrays).
//! - [`grammar`]: the declaration container with stable terminal and
//!   nonterminal numbering.
//! - [`scan`]: the deterministic literal-token trie handed to the scanner
//!   generator.
//! - [`print`]: priority-aware EBNF dump for diagnostics.

pub mod ast;
pub mod error;
pub mod extension;
pub mod grammar;
pub mod print;
pub mod scan;
pub mod types;

pub use ast::{Declaration, ExprPtr, SyntaxExpr, SyntaxExprKind, TypePtr};
pub use error::EbnfError;
pub use grammar::Grammar;
pub use scan::{build_literal_trie, TerminalDescriptor, TerminalKind, TrieNode};
pub use types::Type;
