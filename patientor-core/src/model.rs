//! Patient, diagnosis and entry records as exchanged with the patient API.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::RecordError;

/// Coded diagnosis reference. Entries point at diagnoses by `code`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnosis {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latin: Option<String>,
}

/// Diagnoses keyed by code.
pub type DiagnosisMap = HashMap<String, Diagnosis>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Icon name used by the patient header.
    pub fn icon(self) -> &'static str {
        match self {
            Gender::Male => "man",
            Gender::Female | Gender::Other => "woman",
        }
    }
}

/// Ordinal risk score attached to a health check, encoded as 0..=3 on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum HealthCheckRating {
    Healthy = 0,
    LowRisk = 1,
    HighRisk = 2,
    CriticalRisk = 3,
}

impl HealthCheckRating {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn description(self) -> &'static str {
        match self {
            HealthCheckRating::Healthy => "The patient is in great shape",
            HealthCheckRating::LowRisk => "The patient has a low risk of getting sick",
            HealthCheckRating::HighRisk => "The patient has a high risk of getting sick",
            HealthCheckRating::CriticalRisk => "The patient has a diagnosed condition",
        }
    }
}

impl TryFrom<u8> for HealthCheckRating {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HealthCheckRating::Healthy),
            1 => Ok(HealthCheckRating::LowRisk),
            2 => Ok(HealthCheckRating::HighRisk),
            3 => Ok(HealthCheckRating::CriticalRisk),
            other => Err(RecordError::InvalidRating(other)),
        }
    }
}

impl From<HealthCheckRating> for u8 {
    fn from(rating: HealthCheckRating) -> Self {
        rating.value()
    }
}

/// Discriminant of [`EntryKind`], usable without a payload (form selection, icons).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EntryType {
    #[default]
    Hospital,
    HealthCheck,
    OccupationalHealthcare,
}

impl EntryType {
    pub const ALL: [EntryType; 3] = [
        EntryType::Hospital,
        EntryType::HealthCheck,
        EntryType::OccupationalHealthcare,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Hospital => "Hospital",
            EntryType::HealthCheck => "HealthCheck",
            EntryType::OccupationalHealthcare => "OccupationalHealthcare",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            EntryType::Hospital => "hospital",
            EntryType::HealthCheck => "check",
            EntryType::OccupationalHealthcare => "fork",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RecordError::UnknownEntryType(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Discharge {
    pub date: String,
    pub criteria: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SickLeave {
    pub start_date: String,
    pub end_date: String,
}

impl SickLeave {
    /// Both ends are needed for the range to mean anything.
    pub fn is_complete(&self) -> bool {
        !self.start_date.is_empty() && !self.end_date.is_empty()
    }
}

/// Kind-specific part of an entry, tagged by `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EntryKind {
    Hospital {
        discharge: Discharge,
    },
    #[serde(rename_all = "camelCase")]
    HealthCheck {
        health_check_rating: HealthCheckRating,
    },
    #[serde(rename_all = "camelCase")]
    OccupationalHealthcare {
        employer_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sick_leave: Option<SickLeave>,
    },
}

impl EntryKind {
    pub fn entry_type(&self) -> EntryType {
        match self {
            EntryKind::Hospital { .. } => EntryType::Hospital,
            EntryKind::HealthCheck { .. } => EntryType::HealthCheck,
            EntryKind::OccupationalHealthcare { .. } => EntryType::OccupationalHealthcare,
        }
    }
}

/// An entry before the server has assigned it an id; this is the POST body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub description: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Vec<String>>,
    #[serde(flatten)]
    pub kind: EntryKind,
}

impl NewEntry {
    pub fn entry_type(&self) -> EntryType {
        self.kind.entry_type()
    }

    pub fn diagnosis_codes(&self) -> &[String] {
        self.diagnosis_codes.as_deref().unwrap_or_default()
    }
}

/// A persisted entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    #[serde(flatten)]
    pub fields: NewEntry,
}

impl Entry {
    pub fn entry_type(&self) -> EntryType {
        self.fields.entry_type()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub occupation: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Entry>>,
}

impl Patient {
    pub fn entries(&self) -> &[Entry] {
        self.entries.as_deref().unwrap_or_default()
    }

    /// List responses carry patients without entries.
    pub fn has_details(&self) -> bool {
        self.entries.is_some()
    }

    /// Age in whole years on `today`, when the birth date parses and is not in the future.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth_date = self.date_of_birth.as_deref().and_then(parse_date)?;
        let mut age = today.year() - birth_date.year();
        if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
            age -= 1;
        }
        (age >= 0).then_some(age)
    }
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
