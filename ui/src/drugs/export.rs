use dioxus::prelude::*;
use tracing::{error, info};

use crate::charts::ChartDatum;
use crate::core::platform;
use crate::t;

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working,
    Done(String),
    Error(String),
}

/// `term,count` per line, no header, trailing whitespace trimmed.
pub fn build_csv(data: &[ChartDatum]) -> String {
    data.iter()
        .map(|datum| format!("{},{}", escape_csv(&datum.term), datum.count))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

fn escape_csv(value: &str) -> String {
    let needs_quotes = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');
    if needs_quotes {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// `<kind> <drug>.csv`, e.g. `Adverse Events aspirin.csv`.
pub fn csv_filename(kind: &str, drug: &str) -> String {
    format!("{kind} {drug}.csv")
}

/// Download button that saves `data` as `filename`.
#[component]
pub fn DownloadCsvButton(data: Vec<ChartDatum>, filename: String) -> Element {
    let status = use_signal(|| ExportStatus::Idle);

    let feedback = match &status() {
        ExportStatus::Idle => None,
        ExportStatus::Working => Some(("export-status".to_string(), t!("export-working"))),
        ExportStatus::Done(message) => Some((
            "export-status export-status--success".to_string(),
            message.clone(),
        )),
        ExportStatus::Error(err) => Some((
            "export-status export-status--error".to_string(),
            format!("⚠️ {err}"),
        )),
    };
    let busy = status() == ExportStatus::Working;

    let on_click = {
        let mut status_signal = status;
        move |_| {
            if status_signal() == ExportStatus::Working {
                return;
            }
            status_signal.set(ExportStatus::Working);
            let csv = build_csv(&data);
            let filename = filename.clone();
            platform::spawn_future(async move {
                match download_bytes(&filename, "text/csv;charset=utf-8", csv.into_bytes()).await {
                    Ok(Some(path)) => {
                        info!(path = %path, "CSV saved");
                        status_signal.set(ExportStatus::Done(t!("export-saved", path = path)));
                    }
                    Ok(None) => status_signal.set(ExportStatus::Done(t!("export-started"))),
                    Err(err) => {
                        error!(filename = %filename, "CSV export failed: {err}");
                        status_signal.set(ExportStatus::Error(err));
                    }
                }
            });
        }
    };

    rsx! {
        div { class: "export",
            button {
                r#type: "button",
                class: "button button--ghost export__button",
                disabled: busy,
                onclick: on_click,
                span { class: "export__icon", aria_hidden: "true", "⤓" }
                {t!("export-download-csv")}
            }
            if let Some((class_name, message)) = feedback {
                span { class: "{class_name}", "{message}" }
            }
        }
    }
}

/// Hand `bytes` to the user as a file. The browser build triggers a download
/// and returns `None`; native builds write into the export directory and
/// return the saved path.
async fn download_bytes(
    filename: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<Option<String>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| "Failed to create blob".to_string())?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Unable to create download".to_string())?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("Document unavailable")?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| "Unable to create anchor")?
            .dyn_into()
            .map_err(|_| "Anchor cast failed")?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or("Missing body")?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::fs;
        use std::io::Write;

        let _ = mime;
        let dir = desktop_export_dir()?;
        fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let path = dir.join(file_name_on_disk(filename));
        let mut file = fs::File::create(&path).map_err(|err| err.to_string())?;
        file.write_all(&bytes).map_err(|err| err.to_string())?;
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

/// `filename` with path separators replaced, so a drug name cannot leave the
/// export directory.
#[cfg(not(target_arch = "wasm32"))]
fn file_name_on_disk(filename: &str) -> String {
    filename.replace(['/', '\\'], "-")
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Result<std::path::PathBuf, String> {
    let dirs = directories::ProjectDirs::from("com", "DrugLens", "DrugLens")
        .ok_or("Unable to determine export directory")?;
    Ok(dirs.data_dir().join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_joined_without_header_or_trailing_newline() {
        let data = vec![ChartDatum::new("X", 1), ChartDatum::new("Y", 2)];
        assert_eq!(build_csv(&data), "X,1\nY,2");
    }

    #[test]
    fn empty_data_gives_empty_file() {
        assert_eq!(build_csv(&[]), "");
    }

    #[test]
    fn awkward_terms_are_quoted() {
        let data = vec![
            ChartDatum::new("RASH, PRURITIC", 3),
            ChartDatum::new("SO-CALLED \"FLU\"", 1),
        ];
        assert_eq!(
            build_csv(&data),
            "\"RASH, PRURITIC\",3\n\"SO-CALLED \"\"FLU\"\"\",1"
        );
    }

    #[test]
    fn filenames_name_kind_and_drug() {
        assert_eq!(
            csv_filename("Adverse Events", "aspirin"),
            "Adverse Events aspirin.csv"
        );
        assert_eq!(
            csv_filename("Recall Frequency", "ibuprofen"),
            "Recall Frequency ibuprofen.csv"
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn separators_in_drug_names_stay_inside_the_export_dir() {
        let filename = csv_filename("Recall Frequency", "aspirin/caffeine");
        assert_eq!(
            file_name_on_disk(&filename),
            "Recall Frequency aspirin-caffeine.csv"
        );
        assert_eq!(file_name_on_disk("a\\b.csv"), "a-b.csv");
        let dir = std::path::Path::new("exports");
        let path = dir.join(file_name_on_disk(&filename));
        assert_eq!(path.parent(), Some(dir));
    }
}
