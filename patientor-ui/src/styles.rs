#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use web_sys::Document;

const STYLE_TAG_SELECTOR: &str = "style[data-patientor-ui]";

/// Default CSS for the patient page along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --patientor-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --patientor-text: #1f2933;
  --patientor-muted: #52606d;
  --patientor-card-bg: #ffffff;
  --patientor-card-border: rgba(148, 163, 184, 0.28);
  --patientor-radius: 12px;
  --patientor-error: #b42318;
  --patientor-error-bg: rgba(180, 35, 24, 0.08);
  --patientor-accept: #047857;
  --patientor-cancel: #b42318;
  --patientor-rating-0: #16a34a;
  --patientor-rating-1: #ca8a04;
  --patientor-rating-2: #ea580c;
  --patientor-rating-3: #b42318;
}

.patient-page {
  font-family: var(--patientor-font-family);
  color: var(--patientor-text);
  max-width: 48rem;
  margin: 0 auto;
  padding: 1.5rem;
}

.patient-header h2 {
  margin: 0 0 0.5rem;
}

.patient-header p,
.entry-card-meta {
  margin: 0.2rem 0;
  color: var(--patientor-muted);
}

.patient-unknown {
  padding: 2rem;
  text-align: center;
  color: var(--patientor-muted);
}

.patient-error,
.field-error {
  color: var(--patientor-error);
  background: var(--patientor-error-bg);
  border-radius: 6px;
  padding: 0.4rem 0.6rem;
  margin: 0.4rem 0;
}

.field-error {
  font-size: 0.85rem;
}

.entry-card {
  background: var(--patientor-card-bg);
  border: 1px solid var(--patientor-card-border);
  border-radius: var(--patientor-radius);
  margin: 0.75rem 0;
}

.entry-card-content {
  padding: 0.75rem 1rem;
}

.entry-card-content + .entry-card-content {
  border-top: 1px solid var(--patientor-card-border);
}

.entry-card-header {
  margin: 0 0 0.4rem;
  font-size: 1.05rem;
}

.health-rating {
  display: flex;
  align-items: center;
  gap: 0.5rem;
}

.health-rating-bar {
  display: inline-block;
  width: 3rem;
  height: 0.5rem;
  border-radius: 999px;
}

.health-rating[data-rating="0"] .health-rating-bar { background: var(--patientor-rating-0); }
.health-rating[data-rating="1"] .health-rating-bar { background: var(--patientor-rating-1); }
.health-rating[data-rating="2"] .health-rating-bar { background: var(--patientor-rating-2); }
.health-rating[data-rating="3"] .health-rating-bar { background: var(--patientor-rating-3); }

.entry-modal {
  border: 1px solid var(--patientor-card-border);
  border-radius: var(--patientor-radius);
  padding: 1rem 1.25rem;
  margin-top: 1rem;
}

.entry-form .form-field {
  display: flex;
  flex-direction: column;
  margin-bottom: 0.75rem;
}

.entry-form fieldset {
  border: 1px solid var(--patientor-card-border);
  border-radius: 8px;
  margin-bottom: 0.75rem;
}

.entry-form .has-error input {
  border-color: var(--patientor-error);
}

.diagnosis-option {
  display: block;
  font-size: 0.9rem;
}

.form-actions {
  display: flex;
  justify-content: space-between;
}

.button-add {
  background: var(--patientor-accept);
  color: #ffffff;
}

.button-cancel {
  background: var(--patientor-cancel);
  color: #ffffff;
}

.button-add[disabled] {
  opacity: 0.5;
}
"#;

/// Add the default stylesheet to `<head>` once per document.
pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }
    let Some(head) = document.head() else {
        return Err(JsValue::from_str("patientor: cannot inject styles without a <head>"));
    };

    let sheet = document.create_element("style")?;
    sheet.set_attribute("data-patientor-ui", env!("CARGO_PKG_VERSION"))?;
    sheet.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&sheet)?;
    Ok(())
}
