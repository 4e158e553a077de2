//! Framework-neutral WASM <-> JavaScript bridge for the Patientor core.

use patientor_core::store::reduce_optional;
use patientor_core::{
    render_entry_value, Action, ClientConfig, DiagnosisMap, EntryFormValues, PatientPage,
    RecordError, State,
};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsClientConfig {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    disable_invalid_submit: Option<bool>,
}

impl From<JsClientConfig> for ClientConfig {
    fn from(cfg: JsClientConfig) -> Self {
        let mut base = match cfg.api_base_url {
            Some(url) => ClientConfig::with_base_url(&url),
            None => ClientConfig::default(),
        };
        if let Some(disable) = cfg.disable_invalid_submit {
            base.disable_invalid_submit = disable;
        }
        base
    }
}

fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

// Plain objects instead of ES `Map`s for the keyed collections.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Could not serialize result: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<ClientConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsClientConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            Ok(ClientConfig::from(cfg))
        }
        _ => Ok(ClientConfig::default()),
    }
}

fn read_form_values(values: JsValue) -> Result<EntryFormValues, JsValue> {
    from_value(values).map_err(|err| JsValue::from_str(&format!("Could not read form values: {err}")))
}

/// Field errors for the add-entry form; an empty object means valid.
#[wasm_bindgen(js_name = validateEntryForm)]
pub fn validate_entry_form(values: JsValue) -> Result<JsValue, JsValue> {
    init();
    let values = read_form_values(values)?;
    to_js(&values.validate())
}

/// Whether the submit button is enabled for `values` under `config`.
#[wasm_bindgen(js_name = submitEnabled)]
pub fn submit_enabled(values: JsValue, config: Option<JsValue>) -> Result<bool, JsValue> {
    init();
    let values = read_form_values(values)?;
    let config = read_config(config)?;
    Ok(PatientPage::default().submit_enabled(&values.validate(), &config))
}

/// Request body for `POST /patients/{id}/entries`; throws the field errors when invalid.
#[wasm_bindgen(js_name = toNewEntry)]
pub fn to_new_entry(values: JsValue) -> Result<JsValue, JsValue> {
    init();
    let values = read_form_values(values)?;
    match values.to_new_entry() {
        Ok(entry) => to_js(&entry),
        Err(RecordError::InvalidForm(errors)) => Err(to_js(&errors)?),
        Err(err) => Err(JsValue::from_str(&format_record_error(err))),
    }
}

/// Apply `{ type, payload }` to `state` and return the next state. Unknown
/// action types return the state unchanged.
#[wasm_bindgen]
pub fn reduce(state: JsValue, action: JsValue) -> Result<JsValue, JsValue> {
    init();
    let state: State = if state.is_undefined() || state.is_null() {
        State::default()
    } else {
        from_value(state).map_err(|err| JsValue::from_str(&format!("Could not read state: {err}")))?
    };
    let action_value = from_value::<serde_json::Value>(action)
        .map_err(|err| JsValue::from_str(&format!("Could not read action: {err}")))?;
    let action = Action::from_value(&action_value)
        .map_err(|err| JsValue::from_str(&format_record_error(err.into())))?;

    to_js(&reduce_optional(&state, action))
}

/// Display model for one entry. Unknown entry types abort.
#[wasm_bindgen(js_name = renderEntry)]
pub fn render_entry(entry: JsValue, diagnoses: JsValue) -> Result<JsValue, JsValue> {
    init();
    let entry = from_value::<serde_json::Value>(entry)
        .map_err(|err| JsValue::from_str(&format!("Could not read entry: {err}")))?;
    let diagnoses: DiagnosisMap = if diagnoses.is_undefined() || diagnoses.is_null() {
        DiagnosisMap::new()
    } else {
        from_value(diagnoses)
            .map_err(|err| JsValue::from_str(&format!("Could not read diagnoses: {err}")))?
    };

    let card = render_entry_value(&entry, &diagnoses)
        .map_err(|err| JsValue::from_str(&format_record_error(err)))?;
    to_js(&card)
}

fn format_record_error(err: RecordError) -> String {
    format!("Patientor error: {err}")
}
