//! State of the patient page around the add-entry modal.

use crate::config::ClientConfig;
use crate::model::Patient;
use crate::store::{update_patient, Store};
use crate::validation::FormErrors;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientPage {
    patient_id: String,
    modal_open: bool,
    error: Option<String>,
}

impl PatientPage {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Self::default()
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// The patient shown by this page, if the store knows it.
    pub fn resolve<'a>(&self, store: &'a Store) -> Option<&'a Patient> {
        store.patient(&self.patient_id)
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Last server error for the open form.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_modal(&mut self) {
        self.modal_open = true;
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
        self.error = None;
    }

    /// Store the patient returned by the API and close the form.
    pub fn submission_succeeded(&mut self, patient: Patient, store: &mut Store) {
        tracing::info!(
            patient_id = %patient.id,
            entries = patient.entries().len(),
            "Entry added"
        );
        store.dispatch(update_patient(patient));
        self.close_modal();
    }

    /// Keep the form open and show `message` next to it.
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(patient_id = %self.patient_id, error = %message, "Entry submission failed");
        self.error = Some(message);
    }

    pub fn submit_enabled(&self, errors: &FormErrors, config: &ClientConfig) -> bool {
        !config.disable_invalid_submit || errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;
    use crate::store::add_patient;
    use crate::validation::{validate_entry_form, EntryFormValues};

    fn patient() -> Patient {
        Patient {
            id: "d2773336".into(),
            name: "John McClane".into(),
            occupation: "New york city cop".into(),
            gender: Gender::Male,
            ssn: Some("090786-122X".into()),
            date_of_birth: Some("1986-07-09".into()),
            entries: Some(Vec::new()),
        }
    }

    #[test]
    fn resolves_patient_from_store() {
        let mut store = Store::new();
        let page = PatientPage::new("d2773336");
        assert!(page.resolve(&store).is_none());

        store.dispatch(add_patient(patient()));
        assert_eq!(page.resolve(&store).map(|p| p.name.as_str()), Some("John McClane"));
    }

    #[test]
    fn failure_keeps_modal_open_until_closed() {
        let mut page = PatientPage::new("d2773336");
        page.open_modal();
        page.submission_failed("Malformatted entry");

        assert!(page.is_modal_open());
        assert_eq!(page.error(), Some("Malformatted entry"));

        page.close_modal();
        assert!(!page.is_modal_open());
        assert_eq!(page.error(), None);
    }

    #[test]
    fn success_updates_store_and_closes() {
        let mut store = Store::new();
        store.dispatch(add_patient(patient()));
        let mut page = PatientPage::new("d2773336");
        page.open_modal();
        page.submission_failed("first try failed");

        let mut updated = patient();
        updated.occupation = "Retired".into();
        page.submission_succeeded(updated.clone(), &mut store);

        assert!(!page.is_modal_open());
        assert_eq!(page.error(), None);
        assert_eq!(store.patient("d2773336"), Some(&updated));
    }

    #[test]
    fn submit_stays_enabled_unless_configured() {
        let page = PatientPage::new("x");
        let errors = validate_entry_form(&EntryFormValues::default());
        assert!(!errors.is_empty());

        assert!(page.submit_enabled(&errors, &ClientConfig::default()));

        let strict = ClientConfig {
            disable_invalid_submit: true,
            ..ClientConfig::default()
        };
        assert!(!page.submit_enabled(&errors, &strict));
        assert!(page.submit_enabled(&FormErrors::default(), &strict));
    }
}
