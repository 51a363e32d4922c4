//! Strips `<think>…</think>` regions from model output.
//!
//! Some generation backends emit an internal-reasoning region wrapped in
//! `<think>` tags ahead of their user-facing answer. [`clean`] removes it
//! from a complete string; [`ThinkFilter`] does the same incrementally for
//! streaming output, one token at a time, without ever emitting a character
//! that belongs to a think region (including the tags themselves) and
//! without dropping any character outside one.

const OPEN_TAG: &str = "<think>";
const CLOSE_TAG: &str = "</think>";

/// Incremental `<think>` tag filter for streaming generation.
///
/// Call [`ThinkFilter::push`] with each token as it arrives; it returns the
/// text, if any, that is now safe to show the user. Call
/// [`ThinkFilter::finish`] once the stream ends to flush whatever remains
/// buffered (text outside a think region is flushed; text still inside one
/// is discarded, since the region never closed).
#[derive(Debug, Clone)]
pub struct ThinkFilter {
    buffer: String,
    inside: bool,
    show_thinking: bool,
}

impl Default for ThinkFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ThinkFilter {
    /// Creates a filter that strips think regions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
            inside: false,
            show_thinking: false,
        }
    }

    /// Creates a filter with the given `show_thinking` behavior. When `true`
    /// the filter is the identity function: every pushed token is returned
    /// unchanged and tags are left in place.
    #[must_use]
    pub const fn with_show_thinking(show_thinking: bool) -> Self {
        Self {
            buffer: String::new(),
            inside: false,
            show_thinking,
        }
    }

    /// Feeds the next token and returns the text, if any, safe to emit now.
    pub fn push(&mut self, token: &str) -> String {
        if self.show_thinking {
            return token.to_string();
        }

        self.buffer.push_str(token);
        let mut emitted = String::new();

        loop {
            if self.inside {
                if let Some(pos) = self.buffer.find(CLOSE_TAG) {
                    self.buffer.drain(..pos + CLOSE_TAG.len());
                    self.inside = false;
                } else {
                    let keep = partial_suffix_len(&self.buffer, CLOSE_TAG);
                    self.buffer.drain(..self.buffer.len() - keep);
                    break;
                }
            } else if let Some(pos) = self.buffer.find(OPEN_TAG) {
                emitted.push_str(&self.buffer[..pos]);
                self.buffer.drain(..pos + OPEN_TAG.len());
                self.inside = true;
            } else {
                let keep = partial_suffix_len(&self.buffer, OPEN_TAG);
                let cut = self.buffer.len() - keep;
                emitted.push_str(&self.buffer[..cut]);
                self.buffer.drain(..cut);
                break;
            }
        }

        emitted
    }

    /// Flushes any text still buffered once the stream has ended.
    pub fn finish(&mut self) -> String {
        if self.inside {
            self.buffer.clear();
            String::new()
        } else {
            std::mem::take(&mut self.buffer)
        }
    }
}

/// Returns the length of the longest suffix of `buffer` that is also a
/// proper (non-full) prefix of `tag` — the part of `buffer`'s tail that
/// might still turn into `tag` once more tokens arrive, and so must not be
/// emitted or discarded yet.
fn partial_suffix_len(buffer: &str, tag: &str) -> usize {
    let max_len = (tag.len() - 1).min(buffer.len());
    for len in (1..=max_len).rev() {
        if buffer.ends_with(&tag[..len]) {
            return len;
        }
    }
    0
}

/// Strips every `<think>…</think>` region from a complete string.
///
/// For input with no `<think>` substrings, returns the input trimmed. When
/// `show_thinking` is true, returns the input unchanged (trimmed).
#[must_use]
pub fn clean(text: &str) -> String {
    clean_with(text, false)
}

/// Like [`clean`], but when `show_thinking` is true returns `text` unchanged
/// (still trimmed), matching the identity behavior streaming callers expect.
#[must_use]
pub fn clean_with(text: &str, show_thinking: bool) -> String {
    if show_thinking {
        return text.trim().to_string();
    }
    let mut filter = ThinkFilter::new();
    let mut out = filter.push(text);
    out.push_str(&filter.finish());
    out.trim().to_string()
}

/// Wraps a callback so it only ever receives non-think text.
///
/// Returns a closure suitable as the `on_chunk` sink for a streaming
/// [`crate::generation::Generator`] call; each invocation forwards the
/// filtered text for one incoming token to `callback`.
pub fn wrap<F>(show_thinking: bool, mut callback: F) -> impl FnMut(String) + Send
where
    F: FnMut(String) + Send,
{
    let mut filter = ThinkFilter::with_show_thinking(show_thinking);
    move |token: String| {
        let visible = filter.push(&token);
        if !visible.is_empty() {
            callback(visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_passes_through_text_without_think_tags() {
        assert_eq!(clean("  hello world  "), "hello world");
    }

    #[test]
    fn clean_strips_a_single_think_region() {
        assert_eq!(clean("a<think>hidden</think>b"), "ab");
    }

    #[test]
    fn clean_strips_multiple_think_regions() {
        assert_eq!(clean("x<think>one</think>y<think>two</think>z"), "xyz");
    }

    #[test]
    fn clean_with_show_thinking_is_identity() {
        let text = "a<think>hidden</think>b";
        assert_eq!(clean_with(text, true), text);
    }

    #[test]
    fn clean_handles_unterminated_think_region_by_dropping_rest() {
        assert_eq!(clean("before<think>never closes"), "before");
    }

    #[test]
    fn streaming_filter_emits_only_outside_text_one_char_at_a_time() {
        let mut filter = ThinkFilter::new();
        let input = "he<think>X</think>llo";
        let mut collected = String::new();
        for ch in input.chars() {
            collected.push_str(&filter.push(&ch.to_string()));
        }
        collected.push_str(&filter.finish());
        assert_eq!(collected, "hello");
        assert!(!collected.contains('X'));
        assert!(!collected.contains('<'));
        assert!(!collected.contains('>'));
    }

    #[test]
    fn streaming_filter_handles_tag_split_across_tokens() {
        let mut filter = ThinkFilter::new();
        let mut collected = String::new();
        for token in ["he", "<th", "ink>", "secret", "</th", "ink>", "llo"] {
            collected.push_str(&filter.push(token));
        }
        collected.push_str(&filter.finish());
        assert_eq!(collected, "hello");
    }

    #[test]
    fn streaming_filter_with_show_thinking_is_identity() {
        let mut filter = ThinkFilter::with_show_thinking(true);
        let mut collected = String::new();
        for token in ["a", "<think>", "hidden", "</think>", "b"] {
            collected.push_str(&filter.push(token));
        }
        assert_eq!(collected, "a<think>hidden</think>b");
    }

    #[test]
    fn streaming_filter_never_splits_emission_out_of_order() {
        let mut filter = ThinkFilter::new();
        let whole = clean("start<think>middle</think>end");
        let mut streamed = String::new();
        for token in ["start<th", "ink>mid", "dle</thi", "nk>end"] {
            streamed.push_str(&filter.push(token));
        }
        streamed.push_str(&filter.finish());
        assert_eq!(streamed, whole);
    }

    #[test]
    fn wrap_forwards_only_visible_text_to_callback() {
        let mut collected = String::new();
        {
            let mut sink = wrap(false, |chunk: String| collected.push_str(&chunk));
            for token in ["he", "<think>", "X", "</think>", "llo"] {
                sink(token.to_string());
            }
        }
        assert_eq!(collected, "hello");
    }

    #[test]
    fn wrap_with_show_thinking_forwards_everything() {
        let mut collected = String::new();
        {
            let mut sink = wrap(true, |chunk: String| collected.push_str(&chunk));
            sink("a<think>hidden</think>b".to_string());
        }
        assert_eq!(collected, "a<think>hidden</think>b");
    }
}
