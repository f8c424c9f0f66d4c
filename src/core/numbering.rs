use super::error::DespatchError;

/// Serie prefix used for the per-company despatch-guide sequence.
pub const SERIES_PREFIX: &str = "T001-";

/// Zero padding of the folio part.
pub const FOLIO_PADDING: usize = 8;

/// Per-company despatch document number sequence.
///
/// Produces numbers in the format `T001-00000001`, `T001-00000002`, etc.
/// Gap-free allocation under concurrency is the record store's job; this is
/// the pure counter the store wraps. Gaps are still possible at the protocol
/// level: a rolled-back send does not return its number unless SUNAT reports
/// it as a duplicate.
#[derive(Debug, Clone)]
pub struct DispatchSequence {
    next: u64,
}

impl Default for DispatchSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchSequence {
    /// Create a new sequence starting at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Create a sequence continuing from a given folio.
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Allocate the next document number.
    pub fn next_number(&mut self) -> String {
        let folio = self.next;
        self.next += 1;
        format!("{}{:0>width$}", SERIES_PREFIX, folio, width = FOLIO_PADDING)
    }

    /// Preview the next number without consuming it.
    pub fn peek(&self) -> String {
        format!("{}{:0>width$}", SERIES_PREFIX, self.next, width = FOLIO_PADDING)
    }

    /// The next folio that will be issued, unformatted.
    pub fn next_raw(&self) -> u64 {
        self.next
    }
}

/// A document number split into its serie and folio parts.
///
/// The folio is the final decimal run of the document number; the serie is
/// everything before it, with trailing separators stripped. The zero padding
/// of the folio is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerieFolio {
    pub serie: String,
    pub folio: String,
}

impl SerieFolio {
    /// Split a document number such as "T001-00000007" into serie "T001"
    /// and folio "00000007".
    pub fn parse(document_number: &str) -> Result<Self, DespatchError> {
        let trimmed = document_number.trim();
        let folio_start = trimmed
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|i| i + 1)
            .unwrap_or(0);
        let folio = &trimmed[folio_start..];
        if folio.is_empty() {
            return Err(DespatchError::Validation(format!(
                "document number '{document_number}' has no folio"
            )));
        }
        let serie = trimmed[..folio_start]
            .trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
        if serie.is_empty() {
            return Err(DespatchError::Validation(format!(
                "document number '{document_number}' has no serie"
            )));
        }
        Ok(Self {
            serie: serie.to_string(),
            folio: folio.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_numbering() {
        let mut seq = DispatchSequence::new();
        assert_eq!(seq.next_number(), "T001-00000001");
        assert_eq!(seq.next_number(), "T001-00000002");
        assert_eq!(seq.next_number(), "T001-00000003");
    }

    #[test]
    fn peek_does_not_consume() {
        let mut seq = DispatchSequence::new();
        assert_eq!(seq.peek(), "T001-00000001");
        assert_eq!(seq.peek(), "T001-00000001");
        assert_eq!(seq.next_number(), "T001-00000001");
        assert_eq!(seq.peek(), "T001-00000002");
    }

    #[test]
    fn starting_at() {
        let mut seq = DispatchSequence::starting_at(42);
        assert_eq!(seq.next_number(), "T001-00000042");
        assert_eq!(seq.next_number(), "T001-00000043");
    }

    #[test]
    fn serie_folio_with_separator() {
        let parsed = SerieFolio::parse("T001-00000007").unwrap();
        assert_eq!(parsed.serie, "T001");
        assert_eq!(parsed.folio, "00000007");
    }

    #[test]
    fn serie_folio_without_separator() {
        let parsed = SerieFolio::parse("AB12CD00099").unwrap();
        assert_eq!(parsed.serie, "AB12CD");
        assert_eq!(parsed.folio, "00099");
    }

    #[test]
    fn serie_folio_rejects_degenerate_numbers() {
        assert!(SerieFolio::parse("00000001").is_err());
        assert!(SerieFolio::parse("T001-").is_err());
        assert!(SerieFolio::parse("").is_err());
    }
}
