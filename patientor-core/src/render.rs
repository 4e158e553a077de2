//! Display model for a single entry card.
//!
//! [`render_entry`] turns an [`Entry`] into an [`EntryCard`]; the CLI prints the
//! card through its `Display` impl and the browser UI maps it to HTML.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::model::{DiagnosisMap, Entry, EntryKind, EntryType, HealthCheckRating};
use crate::RecordError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryCard {
    pub entry_type: EntryType,
    pub date: String,
    pub icon: &'static str,
    pub specialist: Option<String>,
    pub description: String,
    pub diagnoses: Vec<DiagnosisLine>,
    pub details: CardDetails,
}

/// A diagnosis code with its name when the code resolves.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DiagnosisLine {
    pub code: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardDetails {
    Discharge {
        date: String,
        criteria: String,
    },
    HealthRating {
        rating: HealthCheckRating,
        text: &'static str,
    },
    Employer {
        employer_name: String,
        sick_leave: Option<(String, String)>,
    },
}

pub fn render_entry(entry: &Entry, diagnoses: &DiagnosisMap) -> EntryCard {
    let fields = &entry.fields;
    let details = match &fields.kind {
        EntryKind::Hospital { discharge } => CardDetails::Discharge {
            date: discharge.date.clone(),
            criteria: discharge.criteria.clone(),
        },
        EntryKind::HealthCheck {
            health_check_rating,
        } => CardDetails::HealthRating {
            rating: *health_check_rating,
            text: health_check_rating.description(),
        },
        EntryKind::OccupationalHealthcare {
            employer_name,
            sick_leave,
        } => CardDetails::Employer {
            employer_name: employer_name.clone(),
            sick_leave: sick_leave
                .as_ref()
                .filter(|leave| leave.is_complete())
                .map(|leave| (leave.start_date.clone(), leave.end_date.clone())),
        },
    };

    let entry_type = entry.entry_type();
    EntryCard {
        entry_type,
        date: fields.date.clone(),
        icon: entry_type.icon(),
        specialist: fields.specialist.clone().filter(|s| !s.is_empty()),
        description: fields.description.clone(),
        diagnoses: fields
            .diagnosis_codes()
            .iter()
            .map(|code| DiagnosisLine {
                code: code.clone(),
                name: diagnoses.get(code).map(|d| d.name.clone()),
            })
            .collect(),
        details,
    }
}

/// Render an entry that has not been decoded yet.
///
/// # Panics
///
/// Panics unless `type` is one of the known entry kinds, including when it is
/// missing or not a string.
pub fn render_entry_value(value: &Value, diagnoses: &DiagnosisMap) -> Result<EntryCard, RecordError> {
    let known = value
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.parse::<EntryType>().is_ok());
    if !known {
        unhandled_entry_variant(value);
    }
    let entry: Entry = serde_json::from_value(value.clone())?;
    Ok(render_entry(&entry, diagnoses))
}

fn unhandled_entry_variant(value: &Value) -> ! {
    panic!("Unhandled discriminated union member: {value}")
}

impl fmt::Display for EntryCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.date, self.icon)?;
        if let Some(specialist) = &self.specialist {
            writeln!(f, "  Specialist: {specialist}")?;
        }
        writeln!(f, "  Description: {}", self.description)?;
        if !self.diagnoses.is_empty() {
            writeln!(f, "  Diagnoses:")?;
            for line in &self.diagnoses {
                match &line.name {
                    Some(name) => writeln!(f, "    - {} {name}", line.code)?,
                    None => writeln!(f, "    - {}", line.code)?,
                }
            }
        }
        match &self.details {
            CardDetails::Discharge { date, criteria } => {
                writeln!(f, "  Discharged: {date}")?;
                write!(f, "  Criteria: {criteria}")
            }
            CardDetails::HealthRating { rating, text } => {
                write!(f, "  Health rating: {} ({text})", rating.value())
            }
            CardDetails::Employer {
                employer_name,
                sick_leave,
            } => {
                write!(f, "  Employer: {employer_name}")?;
                if let Some((from, to)) = sick_leave {
                    write!(f, "\n  Sick leave: {from} to {to}")?;
                }
                Ok(())
            }
        }
    }
}
