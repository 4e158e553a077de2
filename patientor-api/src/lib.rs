//! Client for the patient REST API: payload decoding, HTTP transport and the
//! load/submit flows that feed the session store.

mod client;
mod error;
pub mod flow;

use serde::Deserialize;

use patientor_core::{Diagnosis, Patient};

pub use client::{HttpPatientApi, PatientApi};
pub use error::ApiError;
pub use flow::{
    ensure_patient_details, load_diagnoses, load_patient_details, load_patient_list,
    submit_new_entry, SubmitOutcome,
};

/// Decode a `GET /patients` response body.
pub fn parse_patients_str(body: &str) -> Result<Vec<Patient>, ApiError> {
    Ok(serde_json::from_str(body)?)
}

/// Decode a single patient, as returned by `GET /patients/{id}` and by entry creation.
pub fn parse_patient_str(body: &str) -> Result<Patient, ApiError> {
    Ok(serde_json::from_str(body)?)
}

/// Decode a `GET /diagnoses` response body.
pub fn parse_diagnoses_str(body: &str) -> Result<Vec<Diagnosis>, ApiError> {
    Ok(serde_json::from_str(body)?)
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Build the error for a non-2xx response. Bodies of the form `{"error": "..."}`
/// supply the message; anything else falls back to the status code.
pub fn parse_error_body(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| format!("Request failed with status code {status}"));
    ApiError::Server { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_supplies_message() {
        let err = parse_error_body(400, r#"{"error":"Incorrect or missing date"}"#);
        assert_eq!(err.user_message(), "Incorrect or missing date");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn unparseable_error_body_uses_status() {
        let err = parse_error_body(502, "<html>Bad gateway</html>");
        assert_eq!(err.user_message(), "Request failed with status code 502");
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        assert!(matches!(
            parse_patients_str(r#"{"not":"a list"}"#),
            Err(ApiError::Decode(_))
        ));
    }
}
