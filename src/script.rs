/// Average speaking pace of synthesized narration (150 words per minute).
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Spoken duration of `text` in seconds, estimated from its word count.
///
/// Good enough to preview a plan before the narration audio exists; once audio is available its
/// measured duration is authoritative.
pub fn estimate_narration_secs(text: &str) -> f64 {
    text.split_whitespace().count() as f64 / WORDS_PER_SECOND
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;
