use std::fs;

use patientor_api::{parse_diagnoses_str, parse_patient_str, parse_patients_str};
use patientor_core::store::{set_diagnoses, update_patient};
use patientor_core::{render_entry, EntryType, Gender, Store};
use serde_json::Value;

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("cannot read fixture {path}: {err}"))
}

#[test]
fn patient_list_has_no_entries() {
    let patients = parse_patients_str(&fixture("patients.json")).expect("patients decode");

    assert_eq!(patients.len(), 3);
    assert!(patients.iter().all(|p| !p.has_details()));
    assert_eq!(patients[2].gender, Gender::Other);
    assert_eq!(patients[2].gender.icon(), "woman");
}

#[test]
fn patient_detail_reencodes_to_the_same_document() {
    let body = fixture("patient_detail.json");
    let patient = parse_patient_str(&body).expect("patient decodes");

    let kinds: Vec<EntryType> = patient.entries().iter().map(|e| e.entry_type()).collect();
    assert_eq!(
        kinds,
        [
            EntryType::Hospital,
            EntryType::OccupationalHealthcare,
            EntryType::HealthCheck
        ]
    );

    let reencoded = serde_json::to_value(&patient).expect("patient encodes");
    let original: Value = serde_json::from_str(&body).expect("fixture is JSON");
    assert_eq!(reencoded, original);
}

#[test]
fn patient_cards_match_golden() {
    let mut store = Store::new();
    store.dispatch(set_diagnoses(
        parse_diagnoses_str(&fixture("diagnoses.json")).expect("diagnoses decode"),
    ));
    store.dispatch(update_patient(
        parse_patient_str(&fixture("patient_detail.json")).expect("patient decodes"),
    ));

    let patient = store
        .patient("d2773598-f723-11e9-8f0b-362b9e155667")
        .expect("patient stored");
    let cards: Vec<String> = patient
        .entries()
        .iter()
        .map(|entry| render_entry(entry, store.diagnoses()).to_string())
        .collect();

    assert_eq!(cards.join("\n\n"), fixture("patient_cards.txt").trim_end());
}
