//! Field-level validation for the add-entry form.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{Discharge, EntryKind, EntryType, HealthCheckRating, NewEntry, SickLeave};
use crate::RecordError;

pub const REQUIRED_ERROR: &str = "Field is required";
pub const DATE_FORMAT_ERROR: &str = "Incorrect date format";
pub const RATING_RANGE_ERROR: &str = "Rating must be between 0 and 3";

const DISCHARGE: &str = "discharge";
const SICK_LEAVE: &str = "sickLeave";

// Searched, not anchored: a valid date anywhere in the value passes.
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([12][0-9]{3}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01]))").unwrap()
});

pub fn is_valid_date(value: &str) -> bool {
    DATE_PATTERN.is_match(value)
}

/// Everything the add-entry form can hold, whichever entry type is selected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryFormValues {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub date: String,
    pub description: String,
    pub specialist: String,
    pub diagnosis_codes: Vec<String>,
    pub discharge: Discharge,
    #[serde(deserialize_with = "lenient_rating")]
    pub health_check_rating: Option<i64>,
    pub sick_leave: SickLeave,
    pub employer_name: String,
}

impl Default for EntryFormValues {
    fn default() -> Self {
        Self {
            entry_type: EntryType::Hospital,
            date: String::new(),
            description: String::new(),
            specialist: String::new(),
            diagnosis_codes: Vec::new(),
            discharge: Discharge::default(),
            health_check_rating: Some(HealthCheckRating::Healthy.value().into()),
            sick_leave: SickLeave::default(),
            employer_name: String::new(),
        }
    }
}

impl EntryFormValues {
    pub fn validate(&self) -> FormErrors {
        validate_entry_form(self)
    }

    /// Build the request body for the selected entry type.
    ///
    /// Fields that belong to other entry types are dropped. Sick leave is only
    /// sent when both dates are filled in.
    pub fn to_new_entry(&self) -> Result<NewEntry, RecordError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(RecordError::InvalidForm(errors));
        }

        let kind = match self.entry_type {
            EntryType::Hospital => EntryKind::Hospital {
                discharge: self.discharge.clone(),
            },
            EntryType::HealthCheck => EntryKind::HealthCheck {
                health_check_rating: HealthCheckRating::try_from(
                    self.health_check_rating
                        .and_then(|rating| u8::try_from(rating).ok())
                        .unwrap_or_default(),
                )?,
            },
            EntryType::OccupationalHealthcare => EntryKind::OccupationalHealthcare {
                employer_name: self.employer_name.clone(),
                sick_leave: self
                    .sick_leave
                    .is_complete()
                    .then(|| self.sick_leave.clone()),
            },
        };

        Ok(NewEntry {
            description: self.description.clone(),
            date: self.date.clone(),
            specialist: (!self.specialist.is_empty()).then(|| self.specialist.clone()),
            diagnosis_codes: (!self.diagnosis_codes.is_empty())
                .then(|| self.diagnosis_codes.clone()),
            kind,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRating {
    Whole(i64),
    Number(f64),
    Text(String),
}

// Fractional or unreadable ratings land outside 0..=3 so the validator reports them.
const UNREADABLE_RATING: i64 = i64::MAX;

fn number_rating(value: f64) -> i64 {
    if value.fract() == 0.0 {
        value as i64
    } else {
        UNREADABLE_RATING
    }
}

/// Read the text of a rating input. Blank text means no rating.
pub fn parse_rating_input(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(match text.parse::<i64>() {
        Ok(rating) => rating,
        Err(_) => text.parse::<f64>().map_or(UNREADABLE_RATING, number_rating),
    })
}

fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<RawRating>::deserialize(deserializer)? {
        None => None,
        Some(RawRating::Whole(rating)) => Some(rating),
        Some(RawRating::Number(rating)) => Some(number_rating(rating)),
        Some(RawRating::Text(text)) => parse_rating_input(&text),
    })
}

/// Message for a single field, or for each field of a nested group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldError {
    Message(String),
    Nested(BTreeMap<String, String>),
}

/// Sparse error map keyed by field name; `discharge` and `sickLeave` nest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, FieldError>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Look up a message by path, e.g. `date` or `discharge.criteria`.
    pub fn get(&self, path: &str) -> Option<&str> {
        match path.split_once('.') {
            Some((group, field)) => match self.0.get(group)? {
                FieldError::Nested(fields) => fields.get(field).map(String::as_str),
                FieldError::Message(_) => None,
            },
            None => match self.0.get(path)? {
                FieldError::Message(message) => Some(message.as_str()),
                FieldError::Nested(_) => None,
            },
        }
    }

    /// Every message with its dotted path, in path order.
    pub fn paths(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        for (field, error) in &self.0 {
            match error {
                FieldError::Message(message) => out.push((field.clone(), message.as_str())),
                FieldError::Nested(fields) => {
                    for (sub, message) in fields {
                        out.push((format!("{field}.{sub}"), message.as_str()));
                    }
                }
            }
        }
        out
    }

    fn set(&mut self, field: &str, message: &str) {
        self.0
            .insert(field.to_string(), FieldError::Message(message.to_string()));
    }

    fn set_nested(&mut self, group: &str, field: &str, message: &str) {
        let entry = self
            .0
            .entry(group.to_string())
            .or_insert_with(|| FieldError::Nested(BTreeMap::new()));
        if let FieldError::Nested(fields) = entry {
            fields.insert(field.to_string(), message.to_string());
        }
    }

    fn drop_if_empty(&mut self, group: &str) {
        if matches!(self.0.get(group), Some(FieldError::Nested(fields)) if fields.is_empty()) {
            self.0.remove(group);
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .paths()
            .into_iter()
            .map(|(path, message)| format!("{path}: {message}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validate form values against the rules of the selected entry type.
///
/// An empty result means the values can be submitted.
pub fn validate_entry_form(values: &EntryFormValues) -> FormErrors {
    let mut errors = FormErrors::default();
    errors.0.insert(DISCHARGE.into(), FieldError::Nested(BTreeMap::new()));
    errors.0.insert(SICK_LEAVE.into(), FieldError::Nested(BTreeMap::new()));

    check_date(&mut errors, None, "date", &values.date, true);
    if values.description.is_empty() {
        errors.set("description", REQUIRED_ERROR);
    }

    match values.entry_type {
        EntryType::Hospital => {
            check_date(&mut errors, Some(DISCHARGE), "date", &values.discharge.date, true);
            if values.discharge.criteria.is_empty() {
                errors.set_nested(DISCHARGE, "criteria", REQUIRED_ERROR);
            }
        }
        EntryType::HealthCheck => match values.health_check_rating {
            None | Some(0) => errors.set("healthCheckRating", REQUIRED_ERROR),
            Some(rating) if !(0..=i64::from(HealthCheckRating::CriticalRisk.value()))
                .contains(&rating) =>
            {
                errors.set("healthCheckRating", RATING_RANGE_ERROR)
            }
            Some(_) => {}
        },
        EntryType::OccupationalHealthcare => {
            let sick_leave = &values.sick_leave;
            check_date(&mut errors, Some(SICK_LEAVE), "startDate", &sick_leave.start_date, false);
            check_date(&mut errors, Some(SICK_LEAVE), "endDate", &sick_leave.end_date, false);
            if values.employer_name.is_empty() {
                errors.set("employerName", REQUIRED_ERROR);
            }
        }
    }

    errors.drop_if_empty(DISCHARGE);
    errors.drop_if_empty(SICK_LEAVE);

    tracing::debug!(
        entry_type = %values.entry_type,
        error_count = errors.paths().len(),
        "Validated entry form"
    );
    errors
}

fn check_date(
    errors: &mut FormErrors,
    group: Option<&str>,
    field: &str,
    value: &str,
    required: bool,
) {
    let message = if value.is_empty() {
        if !required {
            return;
        }
        REQUIRED_ERROR
    } else if !is_valid_date(value) {
        DATE_FORMAT_ERROR
    } else {
        return;
    };

    match group {
        Some(group) => errors.set_nested(group, field, message),
        None => errors.set(field, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(entry_type: EntryType) -> EntryFormValues {
        EntryFormValues {
            entry_type,
            date: "2023-01-01".into(),
            description: "x".into(),
            ..EntryFormValues::default()
        }
    }

    #[test]
    fn bad_month_is_a_date_error_without_nested_groups() {
        let errors = validate_entry_form(&EntryFormValues {
            date: "2023-13-01".into(),
            health_check_rating: Some(1),
            ..values(EntryType::HealthCheck)
        });

        assert_eq!(errors.get("date"), Some(DATE_FORMAT_ERROR));
        assert!(!errors.contains("discharge"));
        assert!(!errors.contains("sickLeave"));
    }

    #[test]
    fn day_thirty_passes_the_pattern() {
        assert!(is_valid_date("2023-02-30"));
        assert!(!is_valid_date("2023-02-32"));
        assert!(!is_valid_date("3023-01-01"));
    }

    #[test]
    fn only_ascii_digits_make_a_date() {
        assert!(!is_valid_date("2\u{0660}\u{0662}\u{0663}-01-01"));
        assert!(!is_valid_date("2023-0\u{0661}-01"));
        let errors = validate_entry_form(&EntryFormValues {
            date: "2\u{0660}\u{0662}\u{0663}-01-01".into(),
            health_check_rating: Some(1),
            ..values(EntryType::HealthCheck)
        });
        assert_eq!(errors.get("date"), Some(DATE_FORMAT_ERROR));
    }

    #[test]
    fn date_pattern_is_not_anchored() {
        assert!(is_valid_date("on 2023-01-01 or so"));
        let errors = validate_entry_form(&EntryFormValues {
            date: "x2023-01-01x".into(),
            health_check_rating: Some(2),
            ..values(EntryType::HealthCheck)
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn hospital_requires_discharge_fields() {
        let errors = validate_entry_form(&values(EntryType::Hospital));

        assert_eq!(errors.get("discharge.date"), Some(REQUIRED_ERROR));
        assert_eq!(errors.get("discharge.criteria"), Some(REQUIRED_ERROR));
        assert!(!errors.contains("sickLeave"));
    }

    #[test]
    fn hospital_discharge_date_is_format_checked() {
        let errors = validate_entry_form(&EntryFormValues {
            discharge: Discharge {
                date: "16.01.2015".into(),
                criteria: "Healed".into(),
            },
            ..values(EntryType::Hospital)
        });

        assert_eq!(errors.get("discharge.date"), Some(DATE_FORMAT_ERROR));
        assert_eq!(errors.get("discharge.criteria"), None);
    }

    #[test]
    fn healthy_rating_counts_as_missing() {
        let errors = validate_entry_form(&EntryFormValues {
            health_check_rating: Some(0),
            ..values(EntryType::HealthCheck)
        });
        assert_eq!(errors.get("healthCheckRating"), Some(REQUIRED_ERROR));

        let errors = validate_entry_form(&EntryFormValues {
            health_check_rating: None,
            ..values(EntryType::HealthCheck)
        });
        assert_eq!(errors.get("healthCheckRating"), Some(REQUIRED_ERROR));
    }

    #[test]
    fn rating_above_range_is_reported() {
        let errors = validate_entry_form(&EntryFormValues {
            health_check_rating: Some(7),
            ..values(EntryType::HealthCheck)
        });
        assert_eq!(errors.get("healthCheckRating"), Some(RATING_RANGE_ERROR));
    }

    #[test]
    fn blank_rating_input_decodes_as_missing() {
        let decoded: EntryFormValues = serde_json::from_value(json!({
            "type": "HealthCheck",
            "date": "2023-01-01",
            "description": "x",
            "healthCheckRating": ""
        }))
        .expect("decodes");

        assert_eq!(decoded.health_check_rating, None);
        assert_eq!(decoded.validate().get("healthCheckRating"), Some(REQUIRED_ERROR));

        let decoded: EntryFormValues = serde_json::from_value(json!({
            "type": "HealthCheck",
            "healthCheckRating": null
        }))
        .expect("decodes");
        assert_eq!(decoded.health_check_rating, None);
    }

    #[test]
    fn unusual_rating_inputs_reach_the_validator() {
        let cases = [
            (json!("2"), Some(2)),
            (json!(2.0), Some(2)),
            (json!(300), Some(300)),
            (json!(-1), Some(-1)),
        ];
        for (raw, expected) in cases {
            let decoded: EntryFormValues =
                serde_json::from_value(json!({ "type": "HealthCheck", "healthCheckRating": raw }))
                    .expect("decodes");
            assert_eq!(decoded.health_check_rating, expected);
        }

        for raw in [json!(2.5), json!(300), json!(-1), json!("high")] {
            let decoded: EntryFormValues = serde_json::from_value(json!({
                "type": "HealthCheck",
                "date": "2023-01-01",
                "description": "x",
                "healthCheckRating": raw.clone()
            }))
            .expect("decodes");
            assert_eq!(
                decoded.validate().get("healthCheckRating"),
                Some(RATING_RANGE_ERROR),
                "rating {raw}"
            );
        }
    }

    #[test]
    fn rating_input_text_is_trimmed() {
        assert_eq!(parse_rating_input(" 3 "), Some(3));
        assert_eq!(parse_rating_input("   "), None);
        assert_eq!(parse_rating_input("1.5"), Some(UNREADABLE_RATING));
    }

    #[test]
    fn occupational_sick_leave_is_optional_but_checked() {
        let errors = validate_entry_form(&EntryFormValues {
            employer_name: "HyPD".into(),
            ..values(EntryType::OccupationalHealthcare)
        });
        assert!(errors.is_empty());

        let errors = validate_entry_form(&EntryFormValues {
            sick_leave: SickLeave {
                start_date: "2019-08-05".into(),
                end_date: "soon".into(),
            },
            ..values(EntryType::OccupationalHealthcare)
        });
        assert_eq!(errors.get("sickLeave.endDate"), Some(DATE_FORMAT_ERROR));
        assert_eq!(errors.get("sickLeave.startDate"), None);
        assert_eq!(errors.get("employerName"), Some(REQUIRED_ERROR));
    }

    #[test]
    fn base_fields_are_required() {
        let errors = validate_entry_form(&EntryFormValues::default());
        assert_eq!(errors.get("date"), Some(REQUIRED_ERROR));
        assert_eq!(errors.get("description"), Some(REQUIRED_ERROR));
    }

    #[test]
    fn errors_serialize_in_form_shape() {
        let errors = validate_entry_form(&EntryFormValues {
            description: String::new(),
            discharge: Discharge {
                date: "2015-01-16".into(),
                criteria: String::new(),
            },
            ..values(EntryType::Hospital)
        });

        assert_eq!(
            serde_json::to_value(&errors).expect("serialize"),
            json!({
                "description": "Field is required",
                "discharge": { "criteria": "Field is required" }
            })
        );
        assert_eq!(
            errors.to_string(),
            "description: Field is required; discharge.criteria: Field is required"
        );
    }

    #[test]
    fn form_values_decode_from_partial_json() {
        let decoded: EntryFormValues = serde_json::from_value(json!({
            "type": "OccupationalHealthcare",
            "date": "2019-08-05",
            "description": "Sore back",
            "employerName": "HyPD"
        }))
        .expect("decodes");

        assert_eq!(decoded.entry_type, EntryType::OccupationalHealthcare);
        assert_eq!(decoded.health_check_rating, Some(0));
        assert!(decoded.sick_leave.start_date.is_empty());
    }

    #[test]
    fn to_new_entry_keeps_only_selected_kind() {
        let entry = EntryFormValues {
            specialist: String::new(),
            diagnosis_codes: vec!["Z57.1".into()],
            employer_name: "HyPD".into(),
            sick_leave: SickLeave {
                start_date: "2019-08-05".into(),
                end_date: String::new(),
            },
            discharge: Discharge {
                date: "2015-01-16".into(),
                criteria: "ignored".into(),
            },
            ..values(EntryType::OccupationalHealthcare)
        }
        .to_new_entry()
        .expect("valid");

        assert_eq!(entry.specialist, None);
        assert_eq!(entry.diagnosis_codes(), ["Z57.1".to_string()]);
        assert_eq!(
            entry.kind,
            EntryKind::OccupationalHealthcare {
                employer_name: "HyPD".into(),
                sick_leave: None,
            }
        );
    }

    #[test]
    fn to_new_entry_rejects_invalid_values() {
        let result = values(EntryType::Hospital).to_new_entry();
        match result {
            Err(RecordError::InvalidForm(errors)) => assert!(errors.contains("discharge")),
            other => panic!("expected invalid form, got {other:?}"),
        }
    }

    #[test]
    fn to_new_entry_builds_health_check() {
        let entry = EntryFormValues {
            health_check_rating: Some(3),
            specialist: "Dr Byte House".into(),
            ..values(EntryType::HealthCheck)
        }
        .to_new_entry()
        .expect("valid");

        assert_eq!(entry.specialist.as_deref(), Some("Dr Byte House"));
        assert_eq!(
            entry.kind,
            EntryKind::HealthCheck {
                health_check_rating: HealthCheckRating::CriticalRisk
            }
        );
    }
}
