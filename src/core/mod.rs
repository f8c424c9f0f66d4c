//! Core delivery-guide types, validation, and numbering.
//!
//! This module provides the foundational types for the Guía de Remisión
//! Electrónica: the guide itself, the parties involved, the SUNAT catalog
//! enums, pre-flight validation, and the document-number series.

mod builder;
pub mod codes;
mod error;
mod numbering;
mod types;
mod validation;

pub use builder::*;
pub use codes::{RelatedDocumentType, TransferReason, friendly_response_message};
pub use error::*;
pub use numbering::*;
pub use types::*;
pub use validation::*;
