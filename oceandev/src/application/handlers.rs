use std::path::{Path, PathBuf};
use std::time::Duration;

use ocean_core::envelope::handler::Outcome;
use ocean_core::error::{OceanError, Result};
use ocean_core::selection::Checkbox;
use ocean_core::{
    Callbacks, ChunkUploader, ClientConfig, FormRequest, FormUploader, HttpTransport, Method,
    PopupPolicy, ResponseContractHandler, SelectionList, TimeOffsetCalculator, UploadEvent,
    UploadField,
};
use tracing::info;
use walkdir::WalkDir;

use crate::presentation::cli::{FormArgs, GlobalOpts};
use crate::presentation::console::ConsoleNotifier;

/// Environment first, then explicit flags.
pub fn config_from_args(global: &GlobalOpts) -> Result<ClientConfig> {
    let mut cfg = ClientConfig::from_env()?;
    if let Some(url) = &global.base_url {
        cfg.base_url = url.clone();
    }
    if let Some(size) = global.chunk_size {
        cfg.chunk_size = size;
    }
    if let Some(ms) = global.ping_interval_ms {
        cfg.ping_interval = Duration::from_millis(ms);
    }
    if let Some(n) = global.retries {
        cfg.chunk_retries = n;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn collect_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for p in paths {
        if p.is_dir() {
            if !recursive {
                return Err(OceanError::Format(format!(
                    "{} is a directory (use --recursive)",
                    p.display()
                )));
            }
            for entry in WalkDir::new(p).sort_by_file_name() {
                let entry = entry.map_err(std::io::Error::from)?;
                if entry.file_type().is_file() {
                    out.push(entry.into_path());
                }
            }
        } else {
            out.push(p.clone());
        }
    }
    Ok(out)
}

fn split_pair(raw: &str) -> Result<(String, String)> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| OceanError::Format(format!("expected name=value, got `{raw}`")))
}

fn build_form(form: &FormArgs) -> Result<FormRequest> {
    let method: Method = form.method.parse()?;
    let mut req = FormRequest::new(&form.url, method);
    for raw in &form.fields {
        let (name, value) = split_pair(raw)?;
        req = req.field(name, value);
    }
    for raw in &form.files {
        let (name, path) = split_pair(raw)?;
        let path = Path::new(&path);
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        req = req.file(name, file_name, bytes);
    }
    Ok(req)
}

/// `3` is a plain click on position 3, `+3` a shift-click.
fn parse_click(raw: &str) -> Result<(usize, bool)> {
    let raw = raw.trim();
    let (shift, digits) = match raw.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let index = digits
        .parse()
        .map_err(|e| OceanError::Format(format!("bad click `{raw}`: {e}")))?;
    Ok((index, shift))
}

fn outcome_to_result(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Success(_) => Ok(()),
        Outcome::Errored(env) => Err(OceanError::Format(env.errors.join("; "))),
        Outcome::Malformed(reason) => Err(OceanError::InvalidEnvelope(reason)),
        Outcome::Transport(reason) => Err(OceanError::Format(reason)),
    }
}

pub async fn handle_upload(
    cfg: &ClientConfig,
    paths: Vec<PathBuf>,
    recursive: bool,
) -> Result<()> {
    let files = collect_files(&paths, recursive)?;
    if files.is_empty() {
        return Err(OceanError::Format("no files to upload".into()));
    }
    let uploader = ChunkUploader::new(HttpTransport::new(cfg)?, cfg);

    info!(files = files.len(), chunk_size = cfg.chunk_size, "uploading");
    for path in files {
        let mut field = UploadField::new();
        let receipt = uploader
            .upload_path(&path, |ev| {
                field.apply(ev);
                if let UploadEvent::ChunkAcknowledged {
                    index,
                    chunk_count,
                    progress,
                } = ev
                {
                    eprintln!(
                        "{}: chunk {}/{} ({progress:.0}%)",
                        path.display(),
                        index + 1,
                        chunk_count
                    );
                }
            })
            .await?;
        println!(
            "{}  file_id={}  server_name={}  bytes={}  chunks={}  blake3={}",
            field.display_text().unwrap_or_default(),
            receipt.file_id,
            field.file_name_store,
            receipt.bytes,
            receipt.chunks,
            receipt.digest
        );
    }
    Ok(())
}

pub async fn handle_upload_form(cfg: &ClientConfig, form: FormArgs) -> Result<()> {
    let req = build_form(&form)?;
    let uploader = FormUploader::new(HttpTransport::new(cfg)?, cfg);
    let mut notifier = ConsoleNotifier::default();
    let outcome = uploader
        .submit(&req, |pct| eprintln!("upload: {pct}%"), &mut notifier)
        .await?;
    if outcome.status != 200 {
        return Err(OceanError::Status {
            status: outcome.status,
            body: outcome.final_url.unwrap_or_default(),
        });
    }
    Ok(())
}

pub async fn handle_submit(
    cfg: &ClientConfig,
    form: FormArgs,
    no_error_popups: bool,
    no_message_popups: bool,
) -> Result<()> {
    let req = build_form(&form)?;
    let transport = HttpTransport::new(cfg)?;
    let handler = ResponseContractHandler::new(PopupPolicy {
        errors: !no_error_popups,
        messages: !no_message_popups,
    });
    let mut notifier = ConsoleNotifier::default();
    let callbacks = Callbacks::none().on_success(|env| {
        if !env.data.is_null() {
            println!("{}", env.data);
        }
    });
    let outcome = handler.request(&transport, &req, &mut notifier, callbacks).await;
    outcome_to_result(outcome)
}

pub fn handle_time_offset(
    timestamp: &str,
    source_offset: &str,
    target_offset: &str,
) -> Result<()> {
    let labels =
        TimeOffsetCalculator::default().calculate(timestamp, source_offset, target_offset);
    if let Some(source) = &labels.source {
        println!("{source}");
    }
    println!("{}", labels.gmt);
    println!("{}", labels.target);
    Ok(())
}

fn replay_selection(
    values: Vec<String>,
    clicks: &[String],
    select_all: bool,
) -> Result<SelectionList> {
    let mut boxes = Vec::with_capacity(values.len() + 1);
    if select_all {
        boxes.push(Checkbox::select_all_control());
    }
    boxes.extend(values.into_iter().map(Checkbox::new));
    let mut list = SelectionList::new(boxes);
    for raw in clicks {
        let (index, shift) = parse_click(raw)?;
        if index >= list.len() {
            return Err(OceanError::Format(format!(
                "click {index} outside list of {}",
                list.len()
            )));
        }
        list.click(index, shift);
    }
    Ok(list)
}

pub async fn handle_select(
    cfg: &ClientConfig,
    values: Vec<String>,
    clicks: Vec<String>,
    select_all: bool,
    submit: Option<String>,
    field: String,
) -> Result<()> {
    let list = replay_selection(values, &clicks, select_all)?;
    for b in list.boxes() {
        let mark = if b.checked { "x" } else { " " };
        let label = if b.select_all { "(select all)" } else { b.value.as_str() };
        println!("[{mark}] {label}");
    }

    let Some(action) = submit else {
        println!("{field}={}", list.joined_values());
        return Ok(());
    };
    let req = list.submission(&action, Method::Post, &field);
    let transport = HttpTransport::new(cfg)?;
    let mut notifier = ConsoleNotifier::default();
    let outcome = ResponseContractHandler::default()
        .request(&transport, &req, &mut notifier, Callbacks::none())
        .await;
    outcome_to_result(outcome)
}
