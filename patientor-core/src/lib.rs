//! Core records, session store and form rules for the Patientor client.

pub mod config;
mod error;
pub mod model;
pub mod page;
pub mod render;
pub mod store;
pub mod validation;

pub use config::ClientConfig;
pub use error::RecordError;
pub use model::{
    Diagnosis, DiagnosisMap, Discharge, Entry, EntryKind, EntryType, Gender, HealthCheckRating,
    NewEntry, Patient, SickLeave,
};
pub use page::PatientPage;
pub use render::{render_entry, render_entry_value, CardDetails, DiagnosisLine, EntryCard};
pub use store::{Action, State, Store};
pub use validation::{parse_rating_input, validate_entry_form, EntryFormValues, FieldError, FormErrors};
