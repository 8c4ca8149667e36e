//! Call-scoped log sink.
//!
//! Contract log messages are collected in call order and surfaced in the
//! call result. Appending never fails: past `max_lines` messages are
//! dropped, and a message longer than `max_line_len` bytes is cut at the
//! last UTF-8 character boundary that fits.

/// Append-only, ordered list of log messages for one call.
#[derive(Debug, Clone)]
pub struct LogSink {
    messages: Vec<String>,
    max_lines: usize,
    max_line_len: usize,
    dropped: usize,
}

impl LogSink {
    /// Create a sink with the given limits.
    pub fn new(max_lines: usize, max_line_len: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_lines,
            max_line_len,
            dropped: 0,
        }
    }

    /// Append a message.
    pub fn append(&mut self, message: &str) {
        if self.messages.len() >= self.max_lines {
            self.dropped += 1;
            return;
        }
        self.messages.push(truncate_utf8(message, self.max_line_len).to_owned());
    }

    /// Messages recorded so far, in call order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Number of messages dropped because the sink was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Take all messages, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(256, 1024)
    }
}

fn truncate_utf8(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut sink = LogSink::default();
        sink.append("first");
        sink.append("second");
        sink.append("third");
        assert_eq!(sink.messages(), &["first", "second", "third"]);
    }

    #[test]
    fn test_drain_empties_sink() {
        let mut sink = LogSink::default();
        sink.append("LOG: hello");
        let drained = sink.drain();
        assert_eq!(drained, vec!["LOG: hello".to_string()]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_line_limit_drops_silently() {
        let mut sink = LogSink::new(2, 1024);
        sink.append("msg1");
        sink.append("msg2");
        sink.append("msg3");
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.dropped(), 1);
    }

    #[test]
    fn test_long_line_truncated_on_char_boundary() {
        let mut sink = LogSink::new(10, 5);
        // 'é' is two bytes; a cut at byte 5 would split the third one
        sink.append("ééé");
        assert_eq!(sink.messages()[0], "éé");

        sink.append("abcdefgh");
        assert_eq!(sink.messages()[1], "abcde");
    }

    #[test]
    fn test_empty_message_kept() {
        let mut sink = LogSink::default();
        sink.append("");
        assert_eq!(sink.messages(), &[""]);
    }
}
