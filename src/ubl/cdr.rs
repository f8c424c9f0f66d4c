//! CDR (constancia de recepción) reading.
//!
//! The CDR is an UBL `ApplicationResponse`; the fields that matter locally
//! are the response code (0 = accepted), the description, and any notes.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::DespatchError;

/// Status extracted from a CDR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdrStatus {
    /// `ResponseCode` text; "0" means accepted.
    pub code: String,
    /// `Description` text.
    pub description: String,
    /// Any `Note` texts, in document order.
    pub notes: Vec<String>,
}

impl CdrStatus {
    pub fn is_accepted(&self) -> bool {
        self.code == "0"
    }
}

/// Parse a CDR and extract its response status.
///
/// Takes the first `ResponseCode` and `Description` in document order and
/// collects every `Note`.
pub fn extract_cdr_status(cdr: &[u8]) -> Result<CdrStatus, DespatchError> {
    let text = decode_xml_bytes(cdr);
    let mut reader = Reader::from_str(&text);

    let mut code: Option<String> = None;
    let mut description: Option<String> = None;
    let mut notes: Vec<String> = Vec::new();
    let mut current: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = match e.local_name().as_ref() {
                    b"ResponseCode" if code.is_none() => Some(Field::Code),
                    b"Description" if description.is_none() => Some(Field::Description),
                    b"Note" => Some(Field::Note),
                    _ => None,
                };
            }
            Ok(Event::Text(e)) => {
                if let Some(field) = current {
                    let value = e
                        .unescape()
                        .map_err(|err| DespatchError::Xml(format!("CDR text error: {err}")))?
                        .into_owned();
                    match field {
                        Field::Code => code = Some(value),
                        Field::Description => description = Some(value),
                        Field::Note => notes.push(value),
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DespatchError::Xml(format!("CDR parse error: {e}")));
            }
        }
    }

    Ok(CdrStatus {
        code: code.ok_or_else(|| {
            DespatchError::Xml("the CDR carries no ResponseCode".into())
        })?,
        description: description.unwrap_or_default(),
        notes,
    })
}

#[derive(Clone, Copy)]
enum Field {
    Code,
    Description,
    Note,
}

/// Decode CDR bytes to a string. SUNAT emits CDRs in ISO-8859-1; Latin-1
/// bytes map one-to-one onto the first 256 code points, so the fallback
/// decoding is exact for them.
fn decode_xml_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCEPTED: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<ApplicationResponse xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cac:DocumentResponse xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2">
    <cac:Response>
      <cbc:ResponseCode>0</cbc:ResponseCode>
      <cbc:Description>La Guia numero T001-00000001, ha sido aceptada</cbc:Description>
    </cac:Response>
  </cac:DocumentResponse>
</ApplicationResponse>"#;

    #[test]
    fn accepted_cdr() {
        let status = extract_cdr_status(ACCEPTED.as_bytes()).unwrap();
        assert!(status.is_accepted());
        assert_eq!(status.code, "0");
        assert!(status.description.contains("T001-00000001"));
        assert!(status.notes.is_empty());
    }

    #[test]
    fn notes_are_collected() {
        let xml = r#"<r><ResponseCode>0</ResponseCode><Description>ok</Description>
            <Note>first observation</Note><Note>second observation</Note></r>"#;
        let status = extract_cdr_status(xml.as_bytes()).unwrap();
        assert_eq!(status.notes.len(), 2);
        assert_eq!(status.notes[1], "second observation");
    }

    #[test]
    fn latin1_cdr_bytes_decode() {
        let mut bytes = b"<r><ResponseCode>0</ResponseCode><Description>aceptaci".to_vec();
        bytes.push(0xF3); // ó in Latin-1
        bytes.extend_from_slice(b"n</Description></r>");
        let status = extract_cdr_status(&bytes).unwrap();
        assert_eq!(status.description, "aceptación");
    }

    #[test]
    fn missing_response_code_is_an_error() {
        let err = extract_cdr_status(b"<r><Description>x</Description></r>").unwrap_err();
        assert!(matches!(err, DespatchError::Xml(_)));
    }
}
