use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::core::{DeliveryGuide, DespatchError, DispatchSequence, GuideId};

use super::{Attachment, DispatchStore, SequenceAllocator};

/// In-memory record store used by the test suite and the demos.
///
/// All state sits behind one mutex, which also stands in for the row-level
/// locking a real store provides.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    guides: HashMap<GuideId, DeliveryGuide>,
    attachments: Vec<Attachment>,
    messages: Vec<(GuideId, String)>,
    sequences: HashMap<String, DispatchSequence>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with guides.
    pub fn with_guides(guides: impl IntoIterator<Item = DeliveryGuide>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            for guide in guides {
                inner.guides.insert(guide.id, guide);
            }
        }
        store
    }

    /// Current state of a guide, if present.
    pub fn guide(&self, id: GuideId) -> Option<DeliveryGuide> {
        self.lock().guides.get(&id).cloned()
    }

    /// All attachments of a guide, in creation order.
    pub fn attachments(&self, id: GuideId) -> Vec<Attachment> {
        self.lock()
            .attachments
            .iter()
            .filter(|a| a.guide_id == id)
            .cloned()
            .collect()
    }

    /// All log messages of a guide, in creation order.
    pub fn messages(&self, id: GuideId) -> Vec<String> {
        self.lock()
            .messages
            .iter()
            .filter(|(g, _)| *g == id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DispatchStore for MemoryStore {
    fn load(&self, id: GuideId) -> Result<DeliveryGuide, DespatchError> {
        self.lock()
            .guides
            .get(&id)
            .cloned()
            .ok_or_else(|| DespatchError::Store(format!("no delivery guide with id {id}")))
    }

    fn save(&self, guide: &DeliveryGuide) -> Result<(), DespatchError> {
        self.lock().guides.insert(guide.id, guide.clone());
        Ok(())
    }

    fn attachment_exists(&self, guide_id: GuideId, name: &str) -> Result<bool, DespatchError> {
        Ok(self
            .lock()
            .attachments
            .iter()
            .any(|a| a.guide_id == guide_id && a.name == name))
    }

    fn create_attachment(&self, attachment: Attachment) -> Result<(), DespatchError> {
        self.lock().attachments.push(attachment);
        Ok(())
    }

    fn log_message(&self, guide_id: GuideId, body: &str) -> Result<(), DespatchError> {
        self.lock().messages.push((guide_id, body.to_string()));
        Ok(())
    }
}

impl SequenceAllocator for MemoryStore {
    fn next_document_number(&self, company_vat: &str) -> Result<String, DespatchError> {
        let mut inner = self.lock();
        let sequence = inner
            .sequences
            .entry(company_vat.to_string())
            .or_insert_with(DispatchSequence::new);
        Ok(sequence.next_number())
    }
}
