use patientor_core::{ClientConfig, Diagnosis, NewEntry, Patient};

use crate::{parse_diagnoses_str, parse_error_body, parse_patient_str, parse_patients_str, ApiError};

/// Operations the client needs from the patient API.
#[allow(async_fn_in_trait)]
pub trait PatientApi {
    /// `GET /patients`: summaries without entries.
    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError>;

    /// `GET /patients/{id}`: one patient with entries.
    async fn get_patient(&self, id: &str) -> Result<Patient, ApiError>;

    /// `GET /diagnoses`
    async fn list_diagnoses(&self) -> Result<Vec<Diagnosis>, ApiError>;

    /// `POST /patients/{id}/entries`, answered with the updated patient.
    async fn add_entry(&self, patient_id: &str, entry: &NewEntry) -> Result<Patient, ApiError>;
}

/// [`PatientApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpPatientApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPatientApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_body(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path);
        tracing::info!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        let err = parse_error_body(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), error = %err, "API request rejected");
        Err(err)
    }
}

impl PatientApi for HttpPatientApi {
    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        parse_patients_str(&self.get_body("/patients").await?)
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, ApiError> {
        parse_patient_str(&self.get_body(&format!("/patients/{id}")).await?)
    }

    async fn list_diagnoses(&self) -> Result<Vec<Diagnosis>, ApiError> {
        parse_diagnoses_str(&self.get_body("/diagnoses").await?)
    }

    async fn add_entry(&self, patient_id: &str, entry: &NewEntry) -> Result<Patient, ApiError> {
        let url = self.url(&format!("/patients/{patient_id}/entries"));
        tracing::info!(%url, entry_type = %entry.entry_type(), "POST");
        let response = self.client.post(&url).json(entry).send().await?;
        parse_patient_str(&read_body(response).await?)
    }
}
