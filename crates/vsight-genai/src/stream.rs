//! Server-sent event decoding for `streamGenerateContent?alt=sse`.

use futures_util::{Stream, StreamExt};

use crate::error::{GenAiError, GenAiResult};
use crate::types::GenerateResponse;

/// Incremental SSE decoder over raw response bytes.
///
/// Bytes are buffered until a blank line terminates an event, so multi-byte
/// UTF-8 sequences split across network chunks are decoded intact.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));
    }

    /// Pop the `data` payload of the next complete event.
    pub fn next_event(&mut self) -> Option<String> {
        loop {
            let end = self.buffer.windows(2).position(|w| w == b"\n\n")?;
            let raw: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(data) = event_data(&raw[..end]) {
                return Some(data);
            }
        }
    }

    /// Flush a trailing event that was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.buffer);
        event_data(&raw)
    }
}

/// Joined `data:` lines of one event, `None` for comments/keep-alives.
fn event_data(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Text carried by one event; empty chunks (usage metadata, thoughts) yield `None`.
fn event_text(data: &str) -> Option<GenAiResult<String>> {
    match serde_json::from_str::<GenerateResponse>(data) {
        Ok(response) => {
            let text = response.text();
            (!text.is_empty()).then_some(Ok(text))
        }
        Err(e) => Some(Err(GenAiError::invalid_response(format!(
            "Failed to parse stream event: {}",
            e
        )))),
    }
}

/// Turn a byte stream of SSE events into a stream of text chunks.
pub(crate) fn text_chunks<S, B>(bytes: S) -> impl Stream<Item = GenAiResult<String>> + Send
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send,
{
    let state = (Box::pin(bytes), SseDecoder::default(), false);

    futures_util::stream::unfold(state, |(mut bytes, mut decoder, mut done)| async move {
        loop {
            while let Some(data) = decoder.next_event() {
                if let Some(item) = event_text(&data) {
                    return Some((item, (bytes, decoder, done)));
                }
            }

            if done {
                let item = decoder.finish().and_then(|data| event_text(&data))?;
                return Some((item, (bytes, decoder, done)));
            }

            match bytes.next().await {
                Some(Ok(chunk)) => decoder.push(chunk.as_ref()),
                Some(Err(e)) => return Some((Err(GenAiError::from(e)), (bytes, decoder, true))),
                None => done = true,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_splits_events() {
        let mut decoder = SseDecoder::default();
        decoder.push(b"data: {\"a\":1}\r\n\r\ndata: {\"b\"");
        assert_eq!(decoder.next_event().as_deref(), Some("{\"a\":1}"));
        assert_eq!(decoder.next_event(), None);

        decoder.push(b":2}\n\n");
        assert_eq!(decoder.next_event().as_deref(), Some("{\"b\":2}"));
    }

    #[test]
    fn test_decoder_skips_comments() {
        let mut decoder = SseDecoder::default();
        decoder.push(b": keep-alive\n\ndata: x\n\n");
        assert_eq!(decoder.next_event().as_deref(), Some("x"));
    }

    #[test]
    fn test_decoder_keeps_split_utf8() {
        let text = "data: 笑话\n\n".as_bytes();
        let mut decoder = SseDecoder::default();
        decoder.push(&text[..8]);
        decoder.push(&text[8..]);
        assert_eq!(decoder.next_event().as_deref(), Some("笑话"));
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::default();
        decoder.push(b"data: tail");
        assert_eq!(decoder.next_event(), None);
        assert_eq!(decoder.finish().as_deref(), Some("tail"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_event_text_skips_empty_chunks() {
        assert!(event_text(r#"{"candidates":[],"usageMetadata":{}}"#).is_none());
        let item = event_text(r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#);
        assert_eq!(item.unwrap().unwrap(), "hi");
        assert!(event_text("not json").unwrap().is_err());
    }
}
