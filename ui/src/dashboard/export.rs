use dioxus::prelude::*;
use tracing::{error, info};

use super::DashboardHandle;
use crate::core::config::DashboardConfig;
use crate::core::error::ExportError;
use crate::core::platform;
use crate::core::records::Choice;
use crate::core::tabular::{self, ExportFile, ExportFormat};
use crate::t;

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working(&'static str),
    Done(String),
    Error(String),
}

/// XLSX / CSV buttons for the rows currently shown, in the order shown.
#[component]
pub fn ExportPanel() -> Element {
    let dashboard = use_context::<DashboardHandle>();
    let config = use_context::<DashboardConfig>();
    let basename = use_signal(|| config.export_basename.clone());

    let status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);
    let ready = dashboard.state.read().choices().ready().is_some();

    let feedback = status_line(&status());

    rsx! {
        div { class: "export",
            div { class: "export__actions",
                for format in ExportFormat::ALL {
                    button {
                        key: "{format.label()}",
                        r#type: "button",
                        class: if format == ExportFormat::Xlsx { "button button--primary" } else { "button" },
                        disabled: busy() || !ready,
                        onclick: move |_| start_export(format, dashboard, basename, status, busy),
                        {match format {
                            ExportFormat::Xlsx => t!("export-xlsx"),
                            ExportFormat::Csv => t!("export-csv"),
                        }}
                    }
                }
            }
            if let Some((class_name, message)) = feedback {
                p { class: "{class_name}", role: "status", "{message}" }
            }
        }
    }
}

/// CSS class and message for the status line under the buttons.
fn status_line(status: &ExportStatus) -> Option<(&'static str, String)> {
    match status {
        ExportStatus::Idle => None,
        ExportStatus::Working(format) => Some((
            "export__status",
            t!("export-working", format = format.to_string()),
        )),
        ExportStatus::Done(message) => Some((
            "export__status export__status--success",
            message.clone(),
        )),
        ExportStatus::Error(err) => Some((
            "export__status export__status--error",
            t!("export-failed", reason = err.clone()),
        )),
    }
}

fn start_export(
    format: ExportFormat,
    dashboard: DashboardHandle,
    basename: Signal<String>,
    mut status: Signal<ExportStatus>,
    mut busy: Signal<bool>,
) {
    if busy() {
        return;
    }
    busy.set(true);
    status.set(ExportStatus::Working(format.label()));

    let choices = dashboard.state.read().sorted_choices();
    let basename = basename();
    spawn(async move {
        match perform_export(format, choices, &basename).await {
            Ok(message) => status.set(ExportStatus::Done(message)),
            Err(err) => {
                error!(format = format.label(), %err, "export failed");
                status.set(ExportStatus::Error(err.to_string()));
            }
        }
        busy.set(false);
    });
}

async fn perform_export(
    format: ExportFormat,
    choices: Vec<Choice>,
    basename: &str,
) -> Result<String, ExportError> {
    let file =
        tabular::encode_yielding(format, &choices, platform::local_offset(), basename).await?;
    let delivery = download_bytes(&file).await?;
    info!(
        filename = %file.filename,
        rows = choices.len(),
        bytes = file.bytes.len(),
        "export delivered"
    );
    Ok(match delivery {
        Some(path) => t!("export-saved", path = path),
        None => t!("export-started", filename = file.filename.as_str()),
    })
}

/// Hands the file to the platform. Returns the saved path on desktop.
async fn download_bytes(file: &ExportFile) -> Result<Option<String>, ExportError> {
    let delivery_error = |reason: &str| ExportError::Delivery {
        filename: file.filename.clone(),
        reason: reason.to_string(),
    };

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let array = js_sys::Uint8Array::from(file.bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(file.mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| delivery_error("failed to create blob"))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| delivery_error("unable to create download"))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| delivery_error("document unavailable"))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| delivery_error("unable to create anchor"))?
            .dyn_into()
            .map_err(|_| delivery_error("anchor cast failed"))?;
        anchor.set_href(&url);
        anchor.set_download(&file.filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or_else(|| delivery_error("missing body"))?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let dir = desktop_export_dir().ok_or_else(|| delivery_error("no export directory"))?;
        let path = write_file(&dir, &file.filename, &file.bytes)?;
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

/// The user's download folder, or the app data `exports/` folder without one.
#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Option<std::path::PathBuf> {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(std::path::Path::to_path_buf))
        .or_else(|| {
            directories::ProjectDirs::from("com", "Vidboard", "Vidboard")
                .map(|dirs| dirs.data_dir().join("exports"))
        })
}

/// Writes through `<name>.part` and renames, so a failed export leaves nothing
/// under the final name.
#[cfg(not(target_arch = "wasm32"))]
fn write_file(
    dir: &std::path::Path,
    filename: &str,
    bytes: &[u8],
) -> Result<std::path::PathBuf, ExportError> {
    use std::fs;
    use std::io::Write;

    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    let partial = dir.join(format!("{filename}.part"));

    let written = fs::File::create(&partial)
        .and_then(|mut out| {
            out.write_all(bytes)?;
            out.sync_all()
        })
        .and_then(|()| fs::rename(&partial, &path));

    if let Err(err) = written {
        let _ = fs::remove_file(&partial);
        return Err(err.into());
    }
    Ok(path)
}
