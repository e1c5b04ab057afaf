use dioxus::prelude::*;

use crate::drugs::DrugExplorer;
use crate::t;

#[component]
pub fn Explorer() -> Element {
    rsx! {
        section { class: "page page-explorer",
            h1 { {t!("explorer-title")} }
            DrugExplorer {}
        }
    }
}
