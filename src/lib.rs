// Production-quality lints
#![warn(clippy::todo, clippy::unimplemented, clippy::dbg_macro)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # gird — invisible contracts for Go
//!
//! gird is a Design-by-Contract preprocessor. Developers annotate Go code
//! with four kinds of contract comments; gird generates *shadow* source
//! files in which each directive has been replaced by ordinary control flow
//! that panics on violation, plus an *overlay* manifest consumed by
//! `go build -overlay`. The original sources are never modified.
//!
//! ## Directives
//!
//! ```go
//! func Transfer(from *Account, amount int) (receipt *Receipt, err error) {
//!     // @pre -nd from
//!     // @pre amount > 0, "amount must be positive"
//!     // @post -nd receipt
//!
//!     tx, _ := begin() // @errcheck
//!     ...
//! }
//! ```
//!
//! - `@pre` — precondition, checked where it stands.
//! - `@post` — postcondition, checked on every function exit via `defer`.
//! - `@errcheck` — the discarded error of the host assignment must be nil.
//! - `@okcheck` — the discarded comma-ok of the host assignment must be true.
//!
//! The `-nd` ("not defaulted") form checks each listed variable against its
//! type's zero value, using the semantic type resolved from the enclosing
//! compilation unit: `== nil` for reference types, `== ""` / `== 0` / `!x`
//! for basics, composite-literal compares for comparable aggregates,
//! `*new(T)` for comparable type parameters, and a reflective zero check
//! (auto-importing `reflect`) for unconstrained ones.
//!
//! ## Pipeline
//!
//! ```text
//! walk ──► per-directory parse ──► resolve ──► lex ∘ generate ──► overlay
//! ```
//!
//! Shadows carry `//line` directives so that panics and stack traces always
//! point at the original file and line. Output is deterministic: identical
//! inputs produce byte-identical shadows under content-addressed names, and
//! re-running without source changes recreates the same files.

pub mod audit;
pub mod directive;
pub mod engine;
pub mod error;
pub mod fold;
pub mod generate;
pub mod overlay;
pub mod resolve;
pub mod source;
pub mod walk;

pub use audit::{AuditReport, AuditSummary, Auditor};
pub use directive::{parse_directive, Directive, DirectiveKind};
pub use engine::{content_hash, Engine, CACHE_DIR};
pub use error::{Error, Result};
pub use generate::{collect_directives, generate_shadow, PositionedDirective, Shadow};
pub use overlay::{Overlay, OVERLAY_FILE};
pub use resolve::{Resolver, TypeCategory, TypeInfo, Unit};
pub use source::SourceFile;
pub use walk::walk_go_files;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
