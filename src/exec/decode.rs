// src/exec/decode.rs

use super::CommandOutcome;

/// Decode CLI output as UTF-8, replacing invalid sequences with U+FFFD and
/// dropping every carriage return.
pub fn decode_output(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\r', "")
}

/// Any stderr output wins over stdout, even when stdout is non-empty.
pub fn outcome_from_output(stdout: &[u8], stderr: &[u8]) -> CommandOutcome {
    if !stderr.is_empty() {
        return CommandOutcome::ExternalError(decode_output(stderr));
    }
    CommandOutcome::Success(decode_output(stdout))
}
