//! Human-readable error descriptions and structured JSON error formatting.

use acprio_core::error::ControllerError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ce) = err.downcast_ref::<ControllerError>() {
        return match ce {
            ControllerError::SampleRead { what, reason } => format!(
                "What happened: Could not read {what} ({reason}).\nLikely causes: The bus service is down, the object path does not exist, or it returned an invalid value.\nHow to fix: Check that the system and settings services are running; the controller stops rather than act on a missing reading."
            ),
            ControllerError::Write { item, reason } => format!(
                "What happened: Writing the discharge limit to {item} failed ({reason}).\nLikely causes: The settings service rejected the value or is unavailable.\nHow to fix: Check permissions on the settings service and that no other controller owns the setting."
            ),
            ControllerError::Calculation(msg) => format!(
                "What happened: The discharge calculation produced an invalid value ({msg}).\nLikely causes: Out-of-range measurements or configuration.\nHow to fix: Re-run with --log-level=debug to see the samples that led to it."
            ),
            ControllerError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            ControllerError::EndOfData(n) => format!(
                "What happened: No more samples after {n} rows.\nHow to fix: Nothing; the replay is complete."
            ),
        };
    }

    // String-based heuristics for errors that are not typed
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("trace csv must have headers") {
        return "Invalid headers in trace CSV. Expected 'pv_power_w,soc'.".to_string();
    }
    if lower.contains("trace csv") {
        return format!(
            "What happened: The trace file could not be used ({msg}).\nHow to fix: Check the path and that every row holds two finite numbers."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable process exit codes per error kind; untyped errors return 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<ControllerError>() {
        Some(ControllerError::Config(_)) => 2,
        Some(ControllerError::SampleRead { .. }) => 3,
        Some(ControllerError::Write { .. }) => 4,
        Some(ControllerError::Calculation(_)) => 5,
        Some(ControllerError::EndOfData(_)) | None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<ControllerError>() {
        Some(ControllerError::SampleRead { .. }) => "SampleRead",
        Some(ControllerError::Write { .. }) => "Write",
        Some(ControllerError::Calculation(_)) => "Calculation",
        Some(ControllerError::Config(_)) => "Config",
        Some(ControllerError::EndOfData(_)) => "EndOfData",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    });
    match err.downcast_ref::<ControllerError>() {
        Some(ControllerError::SampleRead { what, .. }) => {
            obj["details"] = json!({ "item": what });
        }
        Some(ControllerError::Write { item, .. }) => {
            obj["details"] = json!({ "item": item.to_string() });
        }
        _ => {}
    }
    obj.to_string()
}
