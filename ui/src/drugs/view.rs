//! The drug explorer: name list, fetch trigger, card slots, and the
//! credential panel.

use dioxus::prelude::*;
use tracing::{info, warn};

use super::card::{DrugCard, DrugCardLoading};
use super::join::{fetch_drug, DrugOutcome, JoinProgress, SOURCE_COUNT};
use super::model::DrugName;
use super::source::FdaClient;
use crate::core::config::AppConfig;
use crate::core::platform::Platform;
use crate::t;

/// State of one card slot. `run_id` stamps the fetch round that owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum CardSlot {
    Loading { progress: JoinProgress, run_id: u64 },
    Ready { outcome: DrugOutcome, run_id: u64 },
}

impl CardSlot {
    pub fn run_id(&self) -> u64 {
        match self {
            CardSlot::Loading { run_id, .. } | CardSlot::Ready { run_id, .. } => *run_id,
        }
    }
}

/// Card slots keyed by drug name, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardSlots {
    slots: Vec<(DrugName, CardSlot)>,
}

impl CardSlots {
    pub fn iter(&self) -> impl Iterator<Item = &(DrugName, CardSlot)> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, name: &DrugName) -> Option<&CardSlot> {
        self.slots
            .iter()
            .find(|(slot_name, _)| slot_name == name)
            .map(|(_, slot)| slot)
    }

    fn get_mut(&mut self, name: &DrugName) -> Option<&mut CardSlot> {
        self.slots
            .iter_mut()
            .find(|(slot_name, _)| slot_name == name)
            .map(|(_, slot)| slot)
    }

    /// Put `name` into the loading state for round `run_id`. Existing slots
    /// keep their position.
    pub fn begin(&mut self, name: &DrugName, run_id: u64) {
        let loading = CardSlot::Loading {
            progress: JoinProgress {
                completed: 0,
                total: SOURCE_COUNT,
            },
            run_id,
        };
        match self.get_mut(name) {
            Some(slot) => *slot = loading,
            None => self.slots.push((name.clone(), loading)),
        }
    }

    /// Returns false when the slot belongs to a newer round.
    pub fn progress(&mut self, name: &DrugName, run_id: u64, progress: JoinProgress) -> bool {
        match self.get_mut(name) {
            Some(CardSlot::Loading {
                progress: current,
                run_id: owner,
            }) if *owner == run_id => {
                *current = progress;
                true
            }
            _ => false,
        }
    }

    /// Returns false when the slot belongs to a newer round.
    pub fn finish(&mut self, name: &DrugName, run_id: u64, outcome: DrugOutcome) -> bool {
        match self.get_mut(name) {
            Some(slot) if slot.run_id() == run_id => {
                *slot = CardSlot::Ready { outcome, run_id };
                true
            }
            _ => false,
        }
    }

    /// Start one fetch per listed entry, repeats included, stamping each with
    /// the next run id. A repeated name shares its slot, so only its last
    /// entry's result is kept.
    pub fn begin_round(&mut self, names: &[DrugName], next_run: &mut u64) -> Vec<(DrugName, u64)> {
        names
            .iter()
            .map(|name| {
                *next_run += 1;
                self.begin(name, *next_run);
                (name.clone(), *next_run)
            })
            .collect()
    }
}

#[component]
pub fn DrugExplorer() -> Element {
    let config = use_context::<Signal<AppConfig>>();
    let mut draft = use_signal(String::new);
    let mut names = use_signal(Vec::<DrugName>::new);
    let slots = use_signal(CardSlots::default);
    let mut next_run = use_signal(|| 0u64);

    let mut add_drug = move || {
        if let Some(name) = DrugName::parse(&draft.peek()) {
            names.write().push(name);
        }
        draft.set(String::new());
    };

    let fetch_all = move |_| {
        let mut slots = slots;
        let round = {
            let mut counter = next_run.write();
            slots.write().begin_round(&names.peek(), &mut counter)
        };
        if round.is_empty() {
            return;
        }
        let client = FdaClient::new(&config.peek());
        info!(fetches = round.len(), "fetching drug info");

        for (name, run_id) in round {
            let client = client.clone();
            spawn(async move {
                let outcome = fetch_drug(&client, name.clone(), |progress| {
                    slots.write().progress(&name, run_id, progress);
                })
                .await;
                if !slots.write().finish(&name, run_id, outcome) {
                    warn!(drug = %name, run_id, "stale drug lookup dropped");
                }
            });
        }
    };

    let listed = names();
    let has_names = !listed.is_empty();
    let cards: Vec<(DrugName, CardSlot)> = slots.read().iter().cloned().collect();

    rsx! {
        div { class: "explorer",
            p { class: "explorer__intro", {t!("explorer-intro")} }

            div { class: "explorer__input",
                input {
                    r#type: "text",
                    class: "explorer__field",
                    placeholder: t!("explorer-placeholder"),
                    value: "{draft}",
                    oninput: move |evt| draft.set(evt.value()),
                    onkeydown: move |evt| {
                        if evt.key() == Key::Enter {
                            add_drug();
                        }
                    },
                }
                button {
                    r#type: "button",
                    class: "button button--accent",
                    onclick: move |_| add_drug(),
                    {t!("explorer-add")}
                }
            }

            if has_names {
                ul { class: "drug-list",
                    for (idx, name) in listed.into_iter().enumerate() {
                        li { key: "{idx}", class: "drug-list__item", "{name}" }
                    }
                }
            }

            button {
                r#type: "button",
                class: "button button--primary",
                disabled: !has_names,
                onclick: fetch_all,
                {t!("explorer-fetch")}
            }

            div { class: "cards-container",
                for (name, slot) in cards {
                    DrugSlot { key: "{name}", name, slot }
                }
            }

            CredentialPanel {}
        }
    }
}

/// One keyed slot. Props only change when this drug's slot changes, so
/// sibling cards are left alone.
#[component]
fn DrugSlot(name: DrugName, slot: CardSlot) -> Element {
    match slot {
        CardSlot::Loading { progress, .. } => rsx! {
            DrugCardLoading { name, progress }
        },
        CardSlot::Ready { outcome, .. } => rsx! {
            DrugCard { outcome }
        },
    }
}

#[derive(Clone, Debug, PartialEq)]
enum CredentialStatus {
    Idle,
    Saved,
    Cleared,
    Error(String),
}

/// Input for the OpenAI key. Browsers keep it in local storage; desktop keeps
/// it for the session.
#[component]
fn CredentialPanel() -> Element {
    let mut config = use_context::<Signal<AppConfig>>();
    let mut draft = use_signal(String::new);
    let mut status = use_signal(|| CredentialStatus::Idle);

    let configured = config.read().has_api_key();
    let hint = if Platform::current().persists_credentials() {
        t!("credential-hint-web")
    } else {
        t!("credential-hint-desktop")
    };

    let on_save = move |_| {
        let value = draft.peek().clone();
        let result = config.write().set_api_key(&value);
        match result {
            Ok(()) if value.trim().is_empty() => status.set(CredentialStatus::Cleared),
            Ok(()) => {
                info!("OpenAI credential updated");
                status.set(CredentialStatus::Saved);
            }
            Err(err) => {
                warn!("credential not persisted: {err}");
                status.set(CredentialStatus::Error(err.to_string()));
            }
        }
        draft.set(String::new());
    };

    let feedback = match status() {
        CredentialStatus::Idle => None,
        CredentialStatus::Saved => Some(t!("credential-saved")),
        CredentialStatus::Cleared => Some(t!("credential-cleared")),
        CredentialStatus::Error(err) => Some(t!("credential-error", reason = err)),
    };
    let state_label = if configured {
        t!("credential-configured")
    } else {
        t!("credential-missing")
    };

    rsx! {
        section { class: "credential-panel",
            h2 { class: "credential-panel__title", {t!("credential-title")} }
            p { class: "credential-panel__state", "{state_label}" }
            p { class: "credential-panel__hint", "{hint}" }
            div { class: "credential-panel__form",
                input {
                    r#type: "password",
                    class: "explorer__field",
                    autocomplete: "off",
                    placeholder: t!("credential-placeholder"),
                    value: "{draft}",
                    oninput: move |evt| draft.set(evt.value()),
                }
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    onclick: on_save,
                    {t!("credential-save")}
                }
            }
            if let Some(message) = feedback {
                p { class: "credential-panel__status", "{message}" }
            }
        }
    }
}
