//! Canned word-by-word responses for synthetic test sessions.
//!
//! A synthetic session emits the template below one word at a time, each
//! fragment carrying its trailing space, then a closing line. Concatenating
//! the fragments in order reproduces the full response byte for byte, which
//! is also what gets persisted as the assistant message.

/// Pause between emitted word fragments.
pub const WORD_DELAY_MS: u64 = 100;

const RESPONSE_SUFFIX: &str = "\n\n✅ Streaming başarıyla test edildi!";

fn response_template(text: &str) -> String {
    format!(
        "Bu bir test streaming yanıtıdır. Mesajınız: \"{}\"\n\nStreaming özelliği çalışıyor! Mesajlar kelime kelime geliyor. ",
        text
    )
}

/// Splits the templated response into its emission fragments.
///
/// Words are split on single spaces; trailing empty tokens are dropped but
/// interior ones survive, so the fragments concatenate back to the template
/// exactly even when `text` contains runs of spaces. The closing line is the
/// final fragment and carries no trailing space.
pub fn synthetic_fragments(text: &str) -> Vec<String> {
    let template = response_template(text);

    let mut words: Vec<&str> = template.split(' ').collect();
    while words.last() == Some(&"") {
        words.pop();
    }

    let mut fragments: Vec<String> = words.iter().map(|word| format!("{} ", word)).collect();
    fragments.push(RESPONSE_SUFFIX.to_string());
    fragments
}
