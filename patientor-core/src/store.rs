//! Session state: patients by id and diagnoses by code, changed only through [`Store::dispatch`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Diagnosis, DiagnosisMap, Patient};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct State {
    #[serde(default)]
    pub patients: HashMap<String, Patient>,
    #[serde(default)]
    pub diagnoses: DiagnosisMap,
}

/// State transitions. The wire form is `{ "type": "SET_PATIENT_LIST", "payload": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetPatientList(Vec<Patient>),
    AddPatient(Patient),
    UpdatePatient(Patient),
    SetDiagnoses(Vec<Diagnosis>),
}

const ACTION_TYPES: [&str; 4] = [
    "SET_PATIENT_LIST",
    "ADD_PATIENT",
    "UPDATE_PATIENT",
    "SET_DIAGNOSES",
];

impl Action {
    /// Decode an action document. Unknown `type` values yield `Ok(None)`.
    pub fn from_value(value: &Value) -> Result<Option<Action>, serde_json::Error> {
        let known = value
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| ACTION_TYPES.contains(&kind));
        if !known {
            return Ok(None);
        }
        Action::deserialize(value).map(Some)
    }

    fn name(&self) -> &'static str {
        match self {
            Action::SetPatientList(_) => ACTION_TYPES[0],
            Action::AddPatient(_) => ACTION_TYPES[1],
            Action::UpdatePatient(_) => ACTION_TYPES[2],
            Action::SetDiagnoses(_) => ACTION_TYPES[3],
        }
    }
}

pub fn set_patient_list(patients: Vec<Patient>) -> Action {
    Action::SetPatientList(patients)
}

pub fn add_patient(patient: Patient) -> Action {
    Action::AddPatient(patient)
}

pub fn update_patient(patient: Patient) -> Action {
    Action::UpdatePatient(patient)
}

pub fn set_diagnoses(diagnoses: Vec<Diagnosis>) -> Action {
    Action::SetDiagnoses(diagnoses)
}

/// Compute the next state. `state` is left untouched.
///
/// List loads merge into the existing maps and never replace a record that is
/// already present; single-patient actions overwrite.
pub fn reducer(state: &State, action: Action) -> State {
    let mut next = state.clone();
    match action {
        Action::SetPatientList(patients) => {
            merge_existing_wins(&mut next.patients, patients, |patient| patient.id.clone());
        }
        Action::AddPatient(patient) | Action::UpdatePatient(patient) => {
            next.patients.insert(patient.id.clone(), patient);
        }
        Action::SetDiagnoses(diagnoses) => {
            merge_existing_wins(&mut next.diagnoses, diagnoses, |diagnosis| {
                diagnosis.code.clone()
            });
        }
    }
    next
}

/// Reduce an optional action; `None` (an unrecognised action) returns the state unchanged.
pub fn reduce_optional(state: &State, action: Option<Action>) -> State {
    match action {
        Some(action) => reducer(state, action),
        None => state.clone(),
    }
}

fn merge_existing_wins<T>(
    target: &mut HashMap<String, T>,
    incoming: Vec<T>,
    key: impl Fn(&T) -> String,
) {
    // Later duplicates inside one payload replace earlier ones.
    let incoming: HashMap<String, T> = incoming
        .into_iter()
        .map(|item| (key(&item), item))
        .collect();
    for (id, item) in incoming {
        target.entry(id).or_insert(item);
    }
}

/// Owner of the session [`State`]; the only way to change it is [`Store::dispatch`].
#[derive(Debug, Clone, Default)]
pub struct Store {
    state: State,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: State) -> Self {
        Self { state }
    }

    pub fn dispatch(&mut self, action: Action) {
        let name = action.name();
        self.state = reducer(&self.state, action);
        tracing::debug!(
            action = name,
            patients = self.state.patients.len(),
            diagnoses = self.state.diagnoses.len(),
            "Dispatched store action"
        );
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn into_state(self) -> State {
        self.state
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.state.patients.get(id)
    }

    pub fn diagnoses(&self) -> &DiagnosisMap {
        &self.state.diagnoses
    }

    /// Patients ordered by name, then id, for listings.
    pub fn patients_sorted(&self) -> Vec<&Patient> {
        let mut patients: Vec<&Patient> = self.state.patients.values().collect();
        patients.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        patients
    }

    /// Diagnoses ordered by code.
    pub fn diagnoses_sorted(&self) -> Vec<&Diagnosis> {
        let mut diagnoses: Vec<&Diagnosis> = self.state.diagnoses.values().collect();
        diagnoses.sort_by(|a, b| a.code.cmp(&b.code));
        diagnoses
    }
}
