//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

use crate::cursor::CursorError;

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    let cursor_error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CursorError>());

    match cursor_error {
        Some(CursorError::Configuration(_)) => format_config_error(&mut output),
        Some(CursorError::Injection(_)) | Some(CursorError::Halted(_)) => {
            format_injection_error(&mut output)
        }
        Some(CursorError::Sensor(_)) => format_sensor_error(&mut output),
        _ if error.to_string().contains("config") => format_config_error(&mut output),
        _ => format_generic_error(&mut output),
    }

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(
        &mut output,
        "Run with --verbose for detailed logs: ir-cursor -vv"
    )
    .ok();

    output
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "The cursor settings could not be used.").ok();
    writeln!(output).ok();
    writeln!(output, "Check:").ok();
    writeln!(output, "  1. [cursor] smoothing is a whole number from 1 to 1024").ok();
    writeln!(
        output,
        "  2. [cursor] zones has at most four codes from 0-3 (top, right, bottom, left)"
    )
    .ok();
    writeln!(
        output,
        "  3. [cursor] poll_interval_us is above 0 and below 60000"
    )
    .ok();
    writeln!(output, "  4. [screen] width and height are not zero").ok();
}

fn format_injection_error(output: &mut String) {
    writeln!(output, "Pointer Injection Error").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "The pointer backend stopped accepting events; cursor control was halted."
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "Check:").ok();
    writeln!(output, "  1. The display session is still running").ok();
    writeln!(
        output,
        "  2. This user is allowed to inject input into the session"
    )
    .ok();
}

fn format_sensor_error(output: &mut String) {
    writeln!(output, "Sensor Error").ok();
    writeln!(output).ok();
    writeln!(output, "The pointing sensor could not deliver samples.").ok();
    writeln!(output).ok();
    writeln!(output, "Check:").ok();
    writeln!(output, "  1. The replay script path passed to --replay exists").ok();
    writeln!(
        output,
        "  2. Every script line reads `delay_ms x y` (delay is not negative)"
    )
    .ok();
}

fn format_generic_error(output: &mut String) {
    writeln!(output, "Cursor Control Error").ok();
    writeln!(output).ok();
    writeln!(output, "An error occurred while driving the cursor.").ok();
}
