//! Line reassembly and cleaning for the raw serial text stream.
//!
//! Serial output arrives in arbitrarily-sized chunks that may split a line,
//! an escape sequence, or a `tag:value` token across chunk boundaries. The
//! [`LineReassembler`] buffers incomplete content and yields one cleaned line
//! per newline found, with terminal escape sequences and control characters
//! stripped.

/// Accumulates decoded text chunks and yields cleaned, newline-terminated
/// lines.
///
/// After each extraction pass the buffer holds at most one pending
/// (non-terminated) line. The buffer is reset at the start of each
/// monitoring session via [`LineReassembler::reset`].
#[derive(Debug, Default)]
pub struct LineReassembler {
    buffer: String,
}

impl LineReassembler {
    /// Create an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and lazily yield the cleaned lines it completes.
    ///
    /// Lines that become empty after cleaning are skipped. Content after the
    /// last newline stays buffered for the next call.
    pub fn feed<'a>(&'a mut self, chunk: &str) -> impl Iterator<Item = String> + 'a {
        self.buffer.push_str(chunk);
        std::iter::from_fn(move || self.next_line())
    }

    /// Extract the next complete line from the buffer, if any.
    fn next_line(&mut self) -> Option<String> {
        while let Some(idx) = self.buffer.find('\n') {
            let raw: String = self.buffer.drain(..=idx).collect();
            let cleaned = clean_line(&raw);
            if !cleaned.is_empty() {
                return Some(cleaned);
            }
        }
        None
    }

    /// Discard any buffered partial line.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// The buffered content not yet terminated by a newline.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

/// Clean one candidate line: drop escape sequences, then remaining control
/// characters, then trim surrounding whitespace.
///
/// Malformed escape sequences are handled best-effort: the ESC byte itself is
/// always dropped and whatever printable text follows it survives.
pub fn clean_line(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('\u{1b}') {
        push_printable(&mut out, &rest[..pos]);
        let after = &rest[pos + '\u{1b}'.len_utf8()..];
        rest = strip_escape(after).unwrap_or(after);
    }
    push_printable(&mut out, rest);
    out.trim().to_string()
}

/// Consume one recognized escape sequence from `s` (the text following an
/// ESC byte) and return the remainder. `None` means the bytes do not form a
/// complete CSI or OSC sequence and only the ESC itself should be dropped.
fn strip_escape(s: &str) -> Option<&str> {
    if let Some(body) = s.strip_prefix('[') {
        // CSI: parameters then a single letter final
        let end = body.find(|c: char| !(c.is_ascii_digit() || c == ';'))?;
        let fin = body[end..].chars().next()?;
        if fin.is_ascii_alphabetic() {
            Some(&body[end + fin.len_utf8()..])
        } else {
            None
        }
    } else if let Some(body) = s.strip_prefix("]0;") {
        // OSC title sequence, terminated by BEL or ESC-backslash
        let mut iter = body.char_indices();
        while let Some((_, c)) = iter.next() {
            match c {
                '\u{07}' => {
                    return match iter.next() {
                        Some((j, _)) => Some(&body[j..]),
                        None => Some(""),
                    };
                }
                '\u{1b}' => {
                    if let Some((j, c2)) = iter.next() {
                        if c2 == '\\' || c2 == '\u{07}' {
                            return Some(&body[j + c2.len_utf8()..]);
                        }
                    }
                }
                _ => {}
            }
        }
        None
    } else {
        None
    }
}

/// Append `s` to `out`, skipping control characters.
///
/// Keeps `\n` so that line separators survive until the final trim; `\r` and
/// everything else in the C0/C1 ranges is dropped.
fn push_printable(out: &mut String, s: &str) {
    for c in s.chars() {
        if !is_stripped_control(c) {
            out.push(c);
        }
    }
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{09}' | '\u{0b}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(reassembler: &mut LineReassembler, chunk: &str) -> Vec<String> {
        reassembler.feed(chunk).collect()
    }

    #[test]
    fn test_extracts_complete_lines() {
        let mut r = LineReassembler::new();
        let lines = collect(&mut r, "temp:21.5\nhum:60\npartial");
        assert_eq!(lines, vec!["temp:21.5", "hum:60"]);
        assert_eq!(r.pending(), "partial");
    }

    #[test]
    fn test_partial_line_completes_on_next_chunk() {
        let mut r = LineReassembler::new();
        assert!(collect(&mut r, "temp:2").is_empty());
        let lines = collect(&mut r, "1.5\n");
        assert_eq!(lines, vec!["temp:21.5"]);
        assert!(r.pending().is_empty());
    }

    #[test]
    fn test_strips_color_escape_sequences() {
        let mut r = LineReassembler::new();
        let lines = collect(&mut r, "\u{1b}[31mtemp:21.5\u{1b}[0m\n");
        assert_eq!(lines, vec!["temp:21.5"]);
    }

    #[test]
    fn test_strips_osc_title_sequences() {
        assert_eq!(clean_line("\u{1b}]0;my title\u{07}temp:1"), "temp:1");
        assert_eq!(clean_line("\u{1b}]0;my title\u{1b}\\temp:1"), "temp:1");
    }

    #[test]
    fn test_malformed_escape_keeps_printable_tail() {
        // No final letter: the ESC is dropped, the rest survives the sweep
        assert_eq!(clean_line("\u{1b}[31"), "[31");
        assert_eq!(clean_line("\u{1b}]0;never terminated"), "]0;never terminated");
        assert_eq!(clean_line("lone \u{1b} escape"), "lone  escape");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(clean_line("te\u{08}mp:1\u{7f}\r"), "temp:1");
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut r = LineReassembler::new();
        let lines = collect(&mut r, "temp:1\r\nhum:2\r\n");
        assert_eq!(lines, vec!["temp:1", "hum:2"]);
    }

    #[test]
    fn test_blank_lines_yield_nothing() {
        let mut r = LineReassembler::new();
        let lines = collect(&mut r, "\n   \n\u{1b}[0m\ntemp:1\n");
        assert_eq!(lines, vec!["temp:1"]);
    }

    #[test]
    fn test_chunk_boundary_independence() {
        // Splits landing inside an escape sequence and inside a token must
        // yield the same lines as a single feed
        let stream = "\u{1b}[32mtemp:21.5,hum:60\u{1b}[0m\r\nx:-3.2\npartial";

        let mut whole = LineReassembler::new();
        let expected: Vec<String> = whole.feed(stream).collect();
        assert_eq!(expected, vec!["temp:21.5,hum:60", "x:-3.2"]);

        for split in stream.char_indices().map(|(i, _)| i) {
            let mut r = LineReassembler::new();
            let mut lines: Vec<String> = r.feed(&stream[..split]).collect();
            lines.extend(r.feed(&stream[split..]));
            assert_eq!(lines, expected, "split at byte {split}");
            assert_eq!(r.pending(), whole.pending());
        }
    }

    #[test]
    fn test_reset_discards_pending() {
        let mut r = LineReassembler::new();
        let _ = collect(&mut r, "half a li");
        r.reset();
        let lines = collect(&mut r, "ne\n");
        assert_eq!(lines, vec!["ne"]);
    }
}
