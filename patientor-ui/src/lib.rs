//! Patient page for the browser: entry cards plus the add-entry form, built with Yew.

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::collections::BTreeSet;

    use crate::styles;
    use chrono::Utc;
    use patientor_api::{ensure_patient_details, load_diagnoses, submit_new_entry, HttpPatientApi};
    use patientor_core::{
        parse_rating_input, render_entry, CardDetails, ClientConfig, Diagnosis, EntryCard, EntryFormValues, EntryType,
        Patient, PatientPage, Store,
    };
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, HtmlInputElement, HtmlSelectElement, Window};
    use yew::events::{Event, InputEvent};
    use yew::platform::spawn_local;
    use yew::prelude::*;
    use yew::TargetCast;

    #[derive(Properties, PartialEq)]
    pub struct PatientPageProps {
        pub patient_id: String,
        pub config: ClientConfig,
    }

    #[function_component(PatientPageView)]
    fn patient_page_view(props: &PatientPageProps) -> Html {
        let store = use_state(Store::new);
        let page = use_state(|| PatientPage::new(props.patient_id.clone()));
        let load_error = use_state(|| None::<String>);

        {
            let store = store.clone();
            let load_error = load_error.clone();
            let config = props.config.clone();
            let patient_id = props.patient_id.clone();
            use_effect_with(patient_id, move |patient_id| {
                if let Some(window) = web_sys::window() {
                    if let Some(document) = window.document() {
                        if let Err(err) = styles::ensure_styles(&document) {
                            console::error_1(&err);
                        }
                    }
                }

                let patient_id = patient_id.clone();
                spawn_local(async move {
                    let api = HttpPatientApi::new(&config);
                    let mut next = (*store).clone();
                    let loaded = match load_diagnoses(&api, &mut next).await {
                        Ok(()) => ensure_patient_details(&api, &mut next, &patient_id).await,
                        Err(err) => Err(err),
                    };
                    if let Err(err) = loaded {
                        console::error_1(&JsValue::from_str(&err.to_string()));
                        load_error.set(Some(err.user_message()));
                    }
                    store.set(next);
                });
                || ()
            });
        }

        let on_open = {
            let page = page.clone();
            Callback::from(move |_: MouseEvent| {
                let mut next = (*page).clone();
                next.open_modal();
                page.set(next);
            })
        };

        let on_cancel = {
            let page = page.clone();
            Callback::from(move |_: ()| {
                let mut next = (*page).clone();
                next.close_modal();
                page.set(next);
            })
        };

        let on_submit = {
            let store = store.clone();
            let page = page.clone();
            let config = props.config.clone();
            Callback::from(move |values: EntryFormValues| {
                let store = store.clone();
                let page = page.clone();
                let config = config.clone();
                spawn_local(async move {
                    let api = HttpPatientApi::new(&config);
                    let mut next_store = (*store).clone();
                    let mut next_page = (*page).clone();
                    submit_new_entry(&api, &mut next_store, &mut next_page, &values).await;
                    store.set(next_store);
                    page.set(next_page);
                });
            })
        };

        let Some(patient) = page.resolve(&store) else {
            return html! {
                <div class="patient-page">
                    { (*load_error).clone().map(render_load_error).unwrap_or_default() }
                    <div class="patient-unknown">{"Unknown patient"}</div>
                </div>
            };
        };

        let diagnoses = store.diagnoses_sorted().into_iter().cloned().collect::<Vec<_>>();
        let cards: Vec<EntryCard> = patient
            .entries()
            .iter()
            .map(|entry| render_entry(entry, store.diagnoses()))
            .collect();

        html! {
            <div class="patient-page">
                { render_header(patient) }
                {
                    if patient.has_details() {
                        html! {
                            <section class="patient-entries">
                                <h4>{"entries"}</h4>
                                { for cards.iter().map(render_card) }
                            </section>
                        }
                    } else {
                        html! {}
                    }
                }
                <button type="button" class="patient-add-entry" onclick={on_open}>{"Add entry"}</button>
                {
                    if page.is_modal_open() {
                        html! {
                            <div class="entry-modal" role="dialog" aria-label="Add a new entry">
                                <header><h3>{"Add a new entry"}</h3></header>
                                { page.error().map(render_submit_error).unwrap_or_default() }
                                <AddEntryForm
                                    diagnoses={diagnoses}
                                    config={props.config.clone()}
                                    on_submit={on_submit}
                                    on_cancel={on_cancel}
                                />
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
            </div>
        }
    }

    fn render_load_error(message: String) -> Html {
        html! { <div class="patient-error">{ message }</div> }
    }

    fn render_submit_error(message: &str) -> Html {
        html! { <div class="patient-error">{ format!("Error: {message}") }</div> }
    }

    fn render_header(patient: &Patient) -> Html {
        let age = patient
            .age_on(Utc::now().date_naive())
            .map(|age| html! { <p>{ format!("age: {age}") }</p> })
            .unwrap_or_default();
        html! {
            <header class="patient-header">
                <h2>
                    { patient.name.clone() }{" "}
                    <i class={classes!("icon", patient.gender.icon())} aria-hidden="true"></i>
                </h2>
                <p>{ format!("ssn: {}", patient.ssn.clone().unwrap_or_default()) }</p>
                <p>{ format!("occupation: {}", patient.occupation) }</p>
                { age }
            </header>
        }
    }

    fn render_card(card: &EntryCard) -> Html {
        html! {
            <article class="entry-card" data-type={card.entry_type.as_str()}>
                <div class="entry-card-content">
                    <h3 class="entry-card-header">
                        { card.date.clone() }{" "}
                        <i class={classes!("icon", card.icon)} aria-hidden="true"></i>
                    </h3>
                    {
                        card.specialist
                            .as_ref()
                            .map(|s| html! { <p class="entry-card-meta">{ format!("Specialist: {s}") }</p> })
                            .unwrap_or_default()
                    }
                    <p class="entry-card-description">{ format!("Description: {}", card.description) }</p>
                    {
                        if card.diagnoses.is_empty() {
                            html! {}
                        } else {
                            html! {
                                <div class="entry-card-diagnoses">
                                    {"Diagnoses:"}
                                    <ul>
                                        {
                                            for card.diagnoses.iter().map(|line| html! {
                                                <li>{ line.code.clone() }{" "}{ line.name.clone().unwrap_or_default() }</li>
                                            })
                                        }
                                    </ul>
                                </div>
                            }
                        }
                    }
                </div>
                <div class="entry-card-content">{ render_details(&card.details) }</div>
            </article>
        }
    }

    fn render_details(details: &CardDetails) -> Html {
        match details {
            CardDetails::Discharge { date, criteria } => html! {
                <div>
                    <p>{ format!("Discharged: {date}") }</p>
                    <p>{ format!("Criteria: {criteria}") }</p>
                </div>
            },
            CardDetails::HealthRating { rating, text } => html! {
                <div class="health-rating" data-rating={rating.value().to_string()}>
                    <span class="health-rating-bar" aria-hidden="true"></span>
                    <span class="health-rating-text">{ *text }</span>
                </div>
            },
            CardDetails::Employer {
                employer_name,
                sick_leave,
            } => html! {
                <div>
                    <p>{ format!("Employer: {employer_name}") }</p>
                    {
                        sick_leave
                            .as_ref()
                            .map(|(from, to)| html! {
                                <div>
                                    {"Sick leave:"}
                                    <ul>
                                        <li>{ format!("From: {from}") }</li>
                                        <li>{ format!("To: {to}") }</li>
                                    </ul>
                                </div>
                            })
                            .unwrap_or_default()
                    }
                </div>
            },
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct AddEntryFormProps {
        pub diagnoses: Vec<Diagnosis>,
        pub config: ClientConfig,
        pub on_submit: Callback<EntryFormValues>,
        pub on_cancel: Callback<()>,
    }

    type Setter = fn(&mut EntryFormValues, String);

    #[function_component(AddEntryForm)]
    fn add_entry_form(props: &AddEntryFormProps) -> Html {
        let values = use_state(EntryFormValues::default);
        let touched = use_state(BTreeSet::<&'static str>::new);
        let submitted = use_state(|| false);

        let errors = values.validate();
        let page = PatientPage::default();
        let submit_enabled = page.submit_enabled(&errors, &props.config);

        let bind = |path: &'static str, apply: Setter| {
            let values = values.clone();
            let touched = touched.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                let mut next = (*values).clone();
                apply(&mut next, input.value());
                values.set(next);
                let mut marked = (*touched).clone();
                marked.insert(path);
                touched.set(marked);
            })
        };

        let on_type = {
            let values = values.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                if let Ok(entry_type) = select.value().parse::<EntryType>() {
                    let mut next = (*values).clone();
                    next.entry_type = entry_type;
                    values.set(next);
                }
            })
        };

        let on_submit = {
            let values = values.clone();
            let submitted = submitted.clone();
            let on_submit = props.on_submit.clone();
            Callback::from(move |event: SubmitEvent| {
                event.prevent_default();
                submitted.set(true);
                if values.validate().is_empty() {
                    on_submit.emit((*values).clone());
                }
            })
        };

        let on_cancel = {
            let on_cancel = props.on_cancel.clone();
            Callback::from(move |_: MouseEvent| on_cancel.emit(()))
        };

        let shown = |path: &'static str| -> Option<String> {
            if *submitted || touched.contains(path) {
                errors.get(path).map(str::to_string)
            } else {
                None
            }
        };

        let diagnosis_options = props.diagnoses.iter().map(|diagnosis| {
            let code = diagnosis.code.clone();
            let checked = values.diagnosis_codes.contains(&code);
            let onclick = {
                let values = values.clone();
                let code = code.clone();
                Callback::from(move |_: MouseEvent| {
                    let mut next = (*values).clone();
                    if let Some(pos) = next.diagnosis_codes.iter().position(|c| *c == code) {
                        next.diagnosis_codes.remove(pos);
                    } else {
                        next.diagnosis_codes.push(code.clone());
                    }
                    values.set(next);
                })
            };
            html! {
                <label class="diagnosis-option">
                    <input type="checkbox" checked={checked} onclick={onclick} />
                    { format!("{} {}", diagnosis.code, diagnosis.name) }
                </label>
            }
        });

        let kind_fields = match values.entry_type {
            EntryType::Hospital => html! {
                <fieldset>
                    <legend>{"Discharge"}</legend>
                    { text_field("Date", "YYYY-MM-DD", &values.discharge.date, shown("discharge.date"),
                        bind("discharge.date", |v, s| v.discharge.date = s)) }
                    { text_field("Criteria", "Criteria", &values.discharge.criteria, shown("discharge.criteria"),
                        bind("discharge.criteria", |v, s| v.discharge.criteria = s)) }
                </fieldset>
            },
            EntryType::HealthCheck => {
                let rating = values
                    .health_check_rating
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                html! {
                    <div class="form-field">
                        <label>{"Health check rating"}</label>
                        <input
                            type="number"
                            min="0"
                            max="3"
                            placeholder="Health check"
                            value={rating}
                            oninput={bind("healthCheckRating", |v, s| v.health_check_rating = parse_rating_input(&s))}
                        />
                        { shown("healthCheckRating").map(render_field_error).unwrap_or_default() }
                    </div>
                }
            }
            EntryType::OccupationalHealthcare => html! {
                <fieldset>
                    <legend>{"SickLeave"}</legend>
                    { text_field("Start Date", "YYYY-MM-DD", &values.sick_leave.start_date, shown("sickLeave.startDate"),
                        bind("sickLeave.startDate", |v, s| v.sick_leave.start_date = s)) }
                    { text_field("End Date", "YYYY-MM-DD", &values.sick_leave.end_date, shown("sickLeave.endDate"),
                        bind("sickLeave.endDate", |v, s| v.sick_leave.end_date = s)) }
                    { text_field("Employer", "Employer", &values.employer_name, shown("employerName"),
                        bind("employerName", |v, s| v.employer_name = s)) }
                </fieldset>
            },
        };

        html! {
            <form class="entry-form" onsubmit={on_submit}>
                <div class="form-field">
                    <label>{"Type"}</label>
                    <select onchange={on_type}>
                        {
                            for EntryType::ALL.into_iter().map(|kind| html! {
                                <option value={kind.as_str()} selected={kind == values.entry_type}>{ kind.as_str() }</option>
                            })
                        }
                    </select>
                </div>
                { text_field("Date", "YYYY-MM-DD", &values.date, shown("date"), bind("date", |v, s| v.date = s)) }
                { text_field("Description", "Description", &values.description, shown("description"),
                    bind("description", |v, s| v.description = s)) }
                { text_field("Specialist", "Specialist", &values.specialist, None,
                    bind("specialist", |v, s| v.specialist = s)) }
                <div class="form-field diagnosis-selection">
                    <label>{"Diagnoses"}</label>
                    { for diagnosis_options }
                </div>
                { kind_fields }
                <div class="form-actions">
                    <button type="button" class="button-cancel" onclick={on_cancel}>{"Cancel"}</button>
                    <button type="submit" class="button-add" disabled={!submit_enabled}>{"Add"}</button>
                </div>
            </form>
        }
    }

    fn text_field(
        label: &'static str,
        placeholder: &'static str,
        value: &str,
        error: Option<String>,
        oninput: Callback<InputEvent>,
    ) -> Html {
        html! {
            <div class={classes!("form-field", error.is_some().then_some("has-error"))}>
                <label>{ label }</label>
                <input type="text" placeholder={placeholder} value={value.to_string()} oninput={oninput} />
                { error.map(render_field_error).unwrap_or_default() }
            </div>
        }
    }

    fn render_field_error(message: String) -> Html {
        html! { <div class="field-error">{ message }</div> }
    }

    #[wasm_bindgen]
    pub fn mount_patient_page(
        selector: &str,
        patient_id: &str,
        config: JsValue,
    ) -> Result<(), JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Cannot access document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches selector"))?;

        let config: ClientConfig = if config.is_undefined() || config.is_null() {
            ClientConfig::default()
        } else {
            from_value(config)?
        };

        yew::Renderer::<PatientPageView>::with_root_and_props(
            target,
            PatientPageProps {
                patient_id: patient_id.to_string(),
                config,
            },
        )
        .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_patient_page;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_patient_page(
    _: &str,
    _: &str,
    _: wasm_bindgen::JsValue,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "patientor-ui only supports the wasm32 target",
    ))
}
