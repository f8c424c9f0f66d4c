//! Collaborator interfaces around the submission core.
//!
//! The record store, sequence allocator, signing service, and clock are
//! external systems; the core consumes them through these traits. The
//! [`MemoryStore`] implementation backs the test suite and the demos.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, FixedOffset, Utc};

use crate::core::{DeliveryGuide, DespatchError, GuideId};

/// An opaque blob attached to a delivery guide.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub guide_id: GuideId,
    /// Canonical filename; doubles as the idempotency key.
    pub name: String,
    pub mime_type: String,
    pub description: Option<String>,
    pub bytes: Vec<u8>,
}

/// Row store for delivery guides, attachments, and the chatter log.
///
/// Implementations must make `save` atomic per guide so two submitters
/// cannot interleave ticket and number writes on the same record.
pub trait DispatchStore {
    fn load(&self, id: GuideId) -> Result<DeliveryGuide, DespatchError>;
    fn save(&self, guide: &DeliveryGuide) -> Result<(), DespatchError>;
    fn attachment_exists(&self, guide_id: GuideId, name: &str) -> Result<bool, DespatchError>;
    fn create_attachment(&self, attachment: Attachment) -> Result<(), DespatchError>;
    /// Append a message (HTML) to the guide's log.
    fn log_message(&self, guide_id: GuideId, body: &str) -> Result<(), DespatchError>;
}

/// Gap-free per-company document number allocation.
pub trait SequenceAllocator {
    /// Next document number in the company's despatch series, creating the
    /// series on first use (prefix `T001-`, padding 8, starting at 1).
    fn next_document_number(&self, company_vat: &str) -> Result<String, DespatchError>;
}

/// Renders-and-signs an XML document. The signature format is the signing
/// service's concern; the core only moves bytes.
pub trait XmlSigner {
    fn sign(&self, filename: &str, xml: &[u8]) -> Result<Vec<u8>, DespatchError>;
}

/// Source of the current Peruvian civil time used on document dates.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in Lima time. Peru is UTC-5 with no daylight saving.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimaClock;

impl Clock for LimaClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let lima = FixedOffset::west_opt(5 * 3600).expect("UTC-5 is in range");
        Utc::now().with_timezone(&lima)
    }
}

/// A clock pinned to one instant, for deterministic rendering in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

// Shared references delegate, so one store instance can serve several roles.

impl<T: DispatchStore + ?Sized> DispatchStore for &T {
    fn load(&self, id: GuideId) -> Result<DeliveryGuide, DespatchError> {
        (**self).load(id)
    }

    fn save(&self, guide: &DeliveryGuide) -> Result<(), DespatchError> {
        (**self).save(guide)
    }

    fn attachment_exists(&self, guide_id: GuideId, name: &str) -> Result<bool, DespatchError> {
        (**self).attachment_exists(guide_id, name)
    }

    fn create_attachment(&self, attachment: Attachment) -> Result<(), DespatchError> {
        (**self).create_attachment(attachment)
    }

    fn log_message(&self, guide_id: GuideId, body: &str) -> Result<(), DespatchError> {
        (**self).log_message(guide_id, body)
    }
}

impl<T: SequenceAllocator + ?Sized> SequenceAllocator for &T {
    fn next_document_number(&self, company_vat: &str) -> Result<String, DespatchError> {
        (**self).next_document_number(company_vat)
    }
}

impl<T: XmlSigner + ?Sized> XmlSigner for &T {
    fn sign(&self, filename: &str, xml: &[u8]) -> Result<Vec<u8>, DespatchError> {
        (**self).sign(filename, xml)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}
