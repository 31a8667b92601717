#![allow(clippy::result_large_err)]
//! lu-core: compiler core for the `.lu` / `.qna` authoring language.
//!
//! Turns DSL text into a consolidated intent-recognition application and
//! QnA knowledge base, merging repeated and partial entity declarations
//! along the way.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`parse_content()`] / [`parse_file()`] -- run the full pipeline
//! - [`ParsedContent`] -- pipeline output: [`LuisApp`], [`QnaKb`], warnings
//! - [`EntityRegistry`] / [`EntityRecord`] -- the consolidated entities
//! - [`LuError`] / [`ErrorCode`] -- fatal errors with stable codes
//! - [`ParseOptions`] -- culture, verbosity, nested-label policy
//! - [`SourceProvider`] / [`UriProbe`] -- I/O seams
//!
//! The serializer entry points live in [`pass5_serialize`].

pub mod ast;
pub mod config;
pub mod elaborate;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod pass1_model_info;
pub mod pass2_imports;
pub mod pass3_merge;
pub mod pass4_qna;
pub mod pass5_serialize;
pub mod prebuilt;
pub mod registry;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Provenance, Section, SyntaxResource};
pub use config::ParseOptions;
pub use error::{Diagnostic, ErrorCode, LuError, Severity};
pub use model::{
    EntityKind, EntityLabel, EntityRecord, Intent, LuisApp, ParsedContent, Pattern, QnaKb,
    QnaPair, RoleSet, SubList, Utterance,
};
pub use registry::{EntityRegistry, RegistryError};
#[cfg(feature = "http")]
pub use source::HttpProbe;
pub use source::{
    FileSystemProvider, InMemoryProbe, InMemoryProvider, OfflineProbe, SourceProvider, UriProbe,
};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use elaborate::{parse_content, parse_file};
pub use pass5_serialize::{alterations_to_json, luis_to_json, qna_to_json};
