//! # remision
//!
//! Peruvian electronic delivery guide (Guía de Remisión Electrónica) library
//! covering the full submission lifecycle against SUNAT: pre-flight
//! validation, document numbering, UBL 2.1 DespatchAdvice rendering in
//! ISO-8859-1, ZIP enveloping with SHA-256, the GRE REST protocol
//! (token / send / ticket poll), CDR extraction, and an orchestrator that
//! drives the picking state machine.
//!
//! Quantities and weights use [`rust_decimal::Decimal`], never floating
//! point. Catalog values (transfer reasons, related document types,
//! identification kinds) are closed sum types carrying their SUNAT codes.
//!
//! ## Quick Start
//!
//! ```rust
//! use remision::core::{DispatchSequence, SerieFolio};
//!
//! let mut seq = DispatchSequence::new();
//! assert_eq!(seq.next_number(), "T001-00000001");
//! assert_eq!(seq.next_number(), "T001-00000002");
//!
//! let parsed = SerieFolio::parse("T001-00000007").unwrap();
//! assert_eq!(parsed.serie, "T001");
//! assert_eq!(parsed.folio, "00000007");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Guide types, validation, numbering, store traits |
//! | `ubl` | UBL 2.1 DespatchAdvice rendering & CDR reading |
//! | `envelope` | ZIP packaging, SHA-256, base64 |
//! | `transport` | SUNAT GRE REST client (token, send, poll) |
//! | `submit` (default) | The full submission pipeline |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod store;

#[cfg(feature = "ubl")]
pub mod ubl;

#[cfg(feature = "envelope")]
pub mod envelope;

#[cfg(feature = "transport")]
pub mod transport;

#[cfg(feature = "submit")]
pub mod submit;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
