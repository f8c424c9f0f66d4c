//! Submission orchestrator.
//!
//! Drives one guide through validate → number → render → sign → envelope →
//! send → poll, persisting every observable transition: the ticket is
//! committed before the first poll, attachments are created idempotently by
//! canonical filename, and every failure past the validation gate lands as a
//! stored HTML error plus a state decision instead of propagating.

use std::future::Future;

use tracing::{info, warn};

use crate::core::{
    Company, DeliveryGuide, DespatchError, GuideId, SubmissionState, check,
    friendly_response_message,
};
use crate::envelope;
use crate::store::{Attachment, Clock, DispatchStore, SequenceAllocator, XmlSigner};
use crate::transport::SunatApi;
use crate::ubl::{self, DESPATCH_DOCUMENT_CODE, cdr};

/// What a single submission attempt achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// SUNAT accepted the document; the CDR is attached and the guide is `Sent`.
    Accepted,
    /// The guide already had a CDR; nothing was done.
    AlreadySent,
}

/// Per-guide result of [`Submitter::submit_all`].
///
/// A `Validation` error means nothing was persisted. Any other error has
/// already been stored on the guide together with its state effects; it is
/// returned here only so callers can report it.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub guide_id: GuideId,
    pub result: Result<SubmissionStatus, DespatchError>,
}

/// The submission orchestrator.
pub struct Submitter<A, S, Q, G, C> {
    api: A,
    store: S,
    sequences: Q,
    signer: G,
    clock: C,
}

impl<A, S, Q, G, C> Submitter<A, S, Q, G, C>
where
    A: SunatApi,
    S: DispatchStore,
    Q: SequenceAllocator,
    G: XmlSigner,
    C: Clock,
{
    pub fn new(api: A, store: S, sequences: Q, signer: G, clock: C) -> Self {
        Self {
            api,
            store,
            sequences,
            signer,
            clock,
        }
    }

    /// Submit every guide, best-effort: a failure on one record never stops
    /// the others.
    pub async fn submit_all(&self, ids: &[GuideId]) -> Vec<SubmissionOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            let result = self.submit_one(id).await;
            if let Err(err) = &result {
                warn!(guide = id, error = %err, "submission failed");
            }
            outcomes.push(SubmissionOutcome {
                guide_id: id,
                result,
            });
        }
        outcomes
    }

    async fn submit_one(&self, id: GuideId) -> Result<SubmissionStatus, DespatchError> {
        let mut guide = self.store.load(id)?;

        if guide.state == SubmissionState::Sent {
            return Ok(SubmissionStatus::AlreadySent);
        }

        let findings = check(&guide);
        if !findings.is_empty() {
            let joined = findings
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(DespatchError::Validation(joined));
        }

        match self.run_pipeline(&mut guide).await {
            Ok(()) => Ok(SubmissionStatus::Accepted),
            Err(err) => {
                if err.clears_number() {
                    guide.document_number = None;
                }
                if err.clears_ticket() {
                    guide.ticket = None;
                }
                guide.error = Some(error_html(&err));
                guide.state = SubmissionState::ToSend;
                self.store.save(&guide)?;
                Err(err)
            }
        }
    }

    async fn run_pipeline(&self, guide: &mut DeliveryGuide) -> Result<(), DespatchError> {
        let ruc = guide.shipper.ruc()?.to_string();

        let number = match &guide.document_number {
            Some(number) => number.clone(),
            None => {
                let number = self.sequences.next_document_number(&ruc)?;
                guide.document_number = Some(number.clone());
                number
            }
        };

        guide.state = SubmissionState::ToSend;
        guide.error = None;
        self.store.save(guide)?;

        let filename = format!("{ruc}-{DESPATCH_DOCUMENT_CODE}-{number}");
        let xml = ubl::despatch_advice_xml(guide, self.clock.now())?;
        let signed = self.signer.sign(&filename, &xml)?;

        let mut token = self.api.get_token(&guide.shipper, false).await?;

        let ticket = match &guide.ticket {
            // A retained ticket means a prior send succeeded; resume at poll.
            Some(ticket) => ticket.clone(),
            None => {
                let envelope = envelope::package(&signed, &filename)?;
                let ticket = self
                    .with_token_retry(&guide.shipper, &mut token, |tok| {
                        let envelope = &envelope;
                        async move { self.api.send(envelope, &tok).await }
                    })
                    .await?;
                guide.ticket = Some(ticket.clone());
                // Committed before the first poll so a crash cannot double-send.
                self.store.save(guide)?;
                ticket
            }
        };

        let cdr_bytes = self
            .with_token_retry(&guide.shipper, &mut token, |tok| {
                let ticket = ticket.as_str();
                async move { self.api.poll(ticket, &tok).await }
            })
            .await?;

        let xml_name = format!("{filename}.xml");
        let cdr_name = format!("cdr-{filename}.xml");
        if !self.store.attachment_exists(guide.id, &xml_name)? {
            self.store.create_attachment(Attachment {
                guide_id: guide.id,
                name: xml_name.clone(),
                mime_type: "application/xml".into(),
                description: Some("Signed UBL DespatchAdvice".into()),
                bytes: signed,
            })?;
        }
        if !self.store.attachment_exists(guide.id, &cdr_name)? {
            self.store.create_attachment(Attachment {
                guide_id: guide.id,
                name: cdr_name.clone(),
                mime_type: "application/xml".into(),
                description: Some("SUNAT CDR (constancia de recepción)".into()),
                bytes: cdr_bytes.clone(),
            })?;
        }

        let summary = match cdr::extract_cdr_status(&cdr_bytes) {
            Ok(status) => {
                let mut text = escape_html(&status.description);
                for note in &status.notes {
                    text.push_str("<br/>");
                    text.push_str(&escape_html(note));
                }
                text
            }
            Err(_) => "CDR received".into(),
        };
        self.store.log_message(
            guide.id,
            &format!(
                "<p>The delivery guide was accepted by SUNAT.</p><p>{summary}</p>\
                 <p>Attachments: {xml_name}, {cdr_name}</p>"
            ),
        )?;

        guide.state = SubmissionState::Sent;
        guide.error = None;
        self.store.save(guide)?;
        info!(guide = guide.id, number = %number, "delivery guide accepted");
        Ok(())
    }

    /// Run an authenticated step; on a 401 force one token refresh and retry
    /// the step exactly once.
    async fn with_token_retry<T, F, Fut>(
        &self,
        company: &Company,
        token: &mut String,
        op: F,
    ) -> Result<T, DespatchError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, DespatchError>>,
    {
        match op(token.clone()).await {
            Err(DespatchError::Unauthorized) => {
                warn!("SUNAT token rejected, refreshing once");
                *token = self.api.get_token(company, true).await?;
                op(token.clone()).await
            }
            other => other,
        }
    }
}

fn error_html(err: &DespatchError) -> String {
    let mut html = format!("<p>{}</p>", escape_html(&err.to_string()));
    let code = match err {
        DespatchError::ResponseCode { code, .. } | DespatchError::Rejected { code, .. } => {
            Some(code.as_str())
        }
        DespatchError::Duplicate { .. } => Some("1033"),
        DespatchError::Processing => Some("98"),
        _ => None,
    };
    if let Some(hint) = code.and_then(friendly_response_message) {
        html.push_str("<p>");
        html.push_str(&escape_html(hint));
        html.push_str("</p>");
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
