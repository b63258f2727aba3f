//! Versioned envelope for the persisted submission payload.
//!
//! Stored form: `{"schema_version": 1, "input": {...}}`. Readers check the
//! version before decoding the body, so the payload's optional sections can
//! evolve without guesswork on old rows.

use serde::{Deserialize, Serialize};

use super::input::TransformationInput;

pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema_version: u32,
    input: &'a TransformationInput,
}

#[derive(Deserialize)]
struct EnvelopeHeader {
    schema_version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    input: TransformationInput,
}

pub fn encode_payload(input: &TransformationInput) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef {
        schema_version: PAYLOAD_SCHEMA_VERSION,
        input,
    })
}

/// Decodes a stored payload. Corrupted blobs and unknown schema versions
/// yield `None`.
pub fn decode_payload(blob: &str) -> Option<TransformationInput> {
    let header: EnvelopeHeader = match serde_json::from_str(blob) {
        Ok(header) => header,
        Err(e) => {
            log::warn!("Stored transformation payload is not a valid envelope: {}", e);
            return None;
        }
    };

    if header.schema_version != PAYLOAD_SCHEMA_VERSION {
        log::warn!(
            "Unsupported transformation payload schema version {}",
            header.schema_version
        );
        return None;
    }

    match serde_json::from_str::<Envelope>(blob) {
        Ok(envelope) => Some(envelope.input),
        Err(e) => {
            log::warn!("Failed to decode transformation payload: {}", e);
            None
        }
    }
}
