use crate::event::{EventKind, StreamEvent};

/// Label assigned to frames whose `event:` line is absent.
pub const DEFAULT_LABEL: &str = "message";

/// One decoded wire frame: an optional event-type label plus the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

impl SseFrame {
    /// Returns the frame's label, falling back to [`DEFAULT_LABEL`].
    pub fn label(&self) -> &str {
        self.event.as_deref().unwrap_or(DEFAULT_LABEL)
    }
}

/// Incremental splitter for the SSE byte stream.
///
/// Frames may straddle chunk boundaries, so the decoder buffers bytes until a
/// blank-line delimiter completes a frame.
#[derive(Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Consumes one transport chunk and returns every frame it completed.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..idx + delim_len);
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// Classifies one frame into a [`StreamEvent`], or `None` when the frame
/// carries no body or the body is not valid JSON.
///
/// Pure: no state, no I/O. Dropping a frame is not an error and must not
/// affect the subscription; the caller decides whether to log it.
pub fn classify_frame(frame: &SseFrame) -> Option<StreamEvent> {
    let data = frame.data.trim();
    if data.is_empty() {
        return None;
    }
    let payload: serde_json::Value = serde_json::from_str(data).ok()?;
    Some(StreamEvent::new(EventKind::from_label(frame.label()), payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(label: Option<&str>, data: &str) -> SseFrame {
        SseFrame {
            event: label.map(str::to_string),
            data: data.to_string(),
        }
    }

    #[test]
    fn decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        let part1 = b"event: node_update\ndata: {\"node\":\"supervisor\",\"times";
        let part2 = b"tamp\":1.5}\n\n";
        assert!(decoder.push_chunk(part1).is_empty());
        let frames = decoder.push_chunk(part2);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("node_update"));
        assert!(frames[0].data.contains("supervisor"));
    }

    #[test]
    fn decoder_accepts_crlf_delimiters() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"event: test\r\ndata: {\"message\":\"ping\"}\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("test"));
        assert_eq!(frames[0].data, "{\"message\":\"ping\"}");
    }

    #[test]
    fn decoder_skips_comment_lines_and_joins_data_lines() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b": keep-alive\ndata: line one\ndata: line two\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, None);
        assert_eq!(frames[0].data, "line one\nline two");
    }

    #[test]
    fn decoder_emits_multiple_frames_from_one_chunk() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"data: {\"a\":1}\n\nevent: error\ndata: {\"error\":\"x\"}\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event, None);
        assert_eq!(frames[1].event.as_deref(), Some("error"));
    }

    #[test]
    fn classify_defaults_unlabeled_frames_to_message() {
        let event = classify_frame(&frame(None, "{\"message\":\"hi\"}")).expect("classified");
        assert_eq!(event.kind, EventKind::Other("message".into()));
        assert_eq!(event.payload["message"], "hi");
    }

    #[test]
    fn classify_maps_known_labels() {
        let event = classify_frame(&frame(
            Some("start"),
            "{\"message\":\"go\",\"query\":\"X\",\"timestamp\":1}",
        ))
        .expect("classified");
        assert_eq!(event.kind, EventKind::Start);
        assert_eq!(event.payload["query"], "X");
    }

    #[test]
    fn classify_preserves_unknown_labels() {
        let event = classify_frame(&frame(Some("heartbeat"), "{}")).expect("classified");
        assert_eq!(event.kind, EventKind::Other("heartbeat".into()));
    }

    #[test]
    fn classify_drops_invalid_json() {
        assert_eq!(classify_frame(&frame(Some("start"), "not json")), None);
    }

    #[test]
    fn classify_drops_frames_without_data() {
        assert_eq!(classify_frame(&frame(Some("start"), "")), None);
        assert_eq!(classify_frame(&frame(Some("start"), "   ")), None);
    }
}
