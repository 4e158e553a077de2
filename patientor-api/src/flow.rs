//! Glue between API calls and the session store.

use patientor_core::store::{set_diagnoses, set_patient_list, update_patient};
use patientor_core::{EntryFormValues, FormErrors, PatientPage, RecordError, Store};

use crate::{ApiError, PatientApi};

pub async fn load_patient_list<A: PatientApi>(api: &A, store: &mut Store) -> Result<(), ApiError> {
    let patients = api.list_patients().await?;
    tracing::info!(count = patients.len(), "Loaded patient list");
    store.dispatch(set_patient_list(patients));
    Ok(())
}

pub async fn load_diagnoses<A: PatientApi>(api: &A, store: &mut Store) -> Result<(), ApiError> {
    let diagnoses = api.list_diagnoses().await?;
    tracing::info!(count = diagnoses.len(), "Loaded diagnoses");
    store.dispatch(set_diagnoses(diagnoses));
    Ok(())
}

pub async fn load_patient_details<A: PatientApi>(
    api: &A,
    store: &mut Store,
    patient_id: &str,
) -> Result<(), ApiError> {
    let patient = api.get_patient(patient_id).await?;
    store.dispatch(update_patient(patient));
    Ok(())
}

/// Fetch the patient unless the store already holds it with entries.
pub async fn ensure_patient_details<A: PatientApi>(
    api: &A,
    store: &mut Store,
    patient_id: &str,
) -> Result<(), ApiError> {
    if store.patient(patient_id).is_some_and(|p| p.has_details()) {
        return Ok(());
    }
    load_patient_details(api, store, patient_id).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The API stored the entry; the store holds the updated patient.
    Added,
    /// The form did not validate; nothing was sent.
    Invalid(FormErrors),
    /// The API refused the entry or could not be reached; the form stays open.
    Failed(String),
}

/// Validate `values` and, when they pass, post them as a new entry for the page's patient.
///
/// Calls are not de-duplicated: two submissions in flight both reach the API.
pub async fn submit_new_entry<A: PatientApi>(
    api: &A,
    store: &mut Store,
    page: &mut PatientPage,
    values: &EntryFormValues,
) -> SubmitOutcome {
    let entry = match values.to_new_entry() {
        Ok(entry) => entry,
        Err(RecordError::InvalidForm(errors)) => return SubmitOutcome::Invalid(errors),
        Err(other) => {
            let message = other.to_string();
            page.submission_failed(message.clone());
            return SubmitOutcome::Failed(message);
        }
    };

    match api.add_entry(page.patient_id(), &entry).await {
        Ok(patient) => {
            page.submission_succeeded(patient, store);
            SubmitOutcome::Added
        }
        Err(err) => {
            let message = err.user_message();
            page.submission_failed(message.clone());
            SubmitOutcome::Failed(message)
        }
    }
}
