//! Wire shapes and pure response classification for the GRE REST service.
//!
//! Classification is separated from I/O so the decision tables can be
//! exercised with literal bodies.

use serde::{Deserialize, Serialize};

use crate::core::DespatchError;
use crate::envelope::{self, Envelope};

/// Send request body: `{"archivo": {...}}`.
#[derive(Debug, Serialize)]
pub(crate) struct SendBody<'a> {
    pub archivo: Archivo<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Archivo<'a> {
    #[serde(rename = "nomArchivo")]
    pub nom_archivo: String,
    #[serde(rename = "arcGreZip")]
    pub arc_gre_zip: &'a str,
    #[serde(rename = "hashZip")]
    pub hash_zip: &'a str,
}

impl<'a> SendBody<'a> {
    pub fn new(envelope: &'a Envelope) -> Self {
        Self {
            archivo: Archivo {
                nom_archivo: format!("{}.zip", envelope.filename),
                arc_gre_zip: &envelope.zip_b64,
                hash_zip: &envelope.zip_sha256_hex,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "numTicket")]
    num_ticket: Option<String>,
    errors: Option<Vec<ApiError>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    cod: Option<String>,
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    #[serde(rename = "codRespuesta")]
    cod_respuesta: Option<String>,
    #[serde(rename = "arcCdr")]
    arc_cdr: Option<String>,
    error: Option<PollError>,
}

#[derive(Debug, Deserialize)]
struct PollError {
    #[serde(rename = "numError")]
    num_error: Option<String>,
    #[serde(rename = "desError")]
    des_error: Option<String>,
}

/// Response code meaning "still processing".
const CODE_PROCESSING: &str = "98";

/// Error number meaning "duplicate document number".
const CODE_DUPLICATE: &str = "1033";

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= 200 {
        trimmed.to_string()
    } else {
        let mut end = 200;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}

/// Classify the token endpoint response into a bearer token.
pub(crate) fn decode_token_response(body: &str) -> Result<String, DespatchError> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| DespatchError::Parse(e.to_string()))?;

    if parsed.error.is_some() || parsed.error_description.is_some() {
        let description = parsed
            .error_description
            .or(parsed.error)
            .unwrap_or_else(|| "authentication failed".into());
        return Err(DespatchError::Transport(description));
    }

    parsed
        .access_token
        .ok_or_else(|| DespatchError::UnknownResponse(snippet(body)))
}

/// Classify the send response into a ticket.
pub(crate) fn decode_send_response(status: u16, body: &str) -> Result<String, DespatchError> {
    if status == 401 {
        return Err(DespatchError::Unauthorized);
    }

    let parsed: SendResponse =
        serde_json::from_str(body).map_err(|e| DespatchError::Parse(e.to_string()))?;

    if let Some(first) = parsed.errors.as_ref().and_then(|e| e.first()) {
        return Err(DespatchError::ResponseCode {
            code: first.cod.clone().unwrap_or_default(),
            message: first.msg.clone().unwrap_or_default(),
        });
    }

    parsed
        .num_ticket
        .ok_or_else(|| DespatchError::UnknownResponse(snippet(body)))
}

/// Classify the poll response; on acceptance returns the unpacked CDR bytes.
pub(crate) fn decode_poll_response(status: u16, body: &str) -> Result<Vec<u8>, DespatchError> {
    if status == 401 {
        return Err(DespatchError::Unauthorized);
    }

    let parsed: PollResponse =
        serde_json::from_str(body).map_err(|e| DespatchError::Parse(e.to_string()))?;

    if parsed.cod_respuesta.as_deref() == Some(CODE_PROCESSING) {
        return Err(DespatchError::Processing);
    }

    if let Some(error) = &parsed.error {
        let message = error.des_error.clone().unwrap_or_default();
        if error.num_error.as_deref() == Some(CODE_DUPLICATE) {
            return Err(DespatchError::Duplicate { message });
        }
        return Err(DespatchError::Rejected {
            code: error.num_error.clone().unwrap_or_default(),
            message,
        });
    }

    match parsed.cod_respuesta.as_deref() {
        Some("0") => match parsed.arc_cdr.as_deref() {
            Some(cdr_b64) => envelope::unzip_b64(cdr_b64),
            None => Err(DespatchError::UnknownResponse(snippet(body))),
        },
        Some(code) => Err(DespatchError::Rejected {
            code: code.to_string(),
            message: "the document was not accepted".into(),
        }),
        None => Err(DespatchError::UnknownResponse(snippet(body))),
    }
}
