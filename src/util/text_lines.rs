use std::io;

/// Line-oriented view of a file that writes back every byte it did not replace.
///
/// Invariants:
/// - `parse(b).build() == b` for any input, including mixed line endings and
///   bytes that are not valid UTF-8.
/// - Each line keeps its own terminator (`\n`, `\r\n` or none for the last line).
/// - Only lines that decode as UTF-8 are offered as text; the rest are opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLines {
    lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    body: Vec<u8>,
    ending: &'static [u8],
}

impl TextLines {
    pub fn parse(bytes: &[u8]) -> Self {
        let mut lines = Vec::new();
        let mut rest = bytes;
        while !rest.is_empty() {
            let (line, tail) = match rest.iter().position(|b| *b == b'\n') {
                Some(i) => (&rest[..=i], &rest[i + 1..]),
                None => (rest, &rest[rest.len()..]),
            };
            let (body, ending): (&[u8], &'static [u8]) =
                if let Some(body) = line.strip_suffix(b"\r\n") {
                    (body, b"\r\n")
                } else if let Some(body) = line.strip_suffix(b"\n") {
                    (body, b"\n")
                } else {
                    (line, b"")
                };
            lines.push(Line {
                body: body.to_vec(),
                ending,
            });
            rest = tail;
        }
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `(index, text)` for every line that is valid UTF-8, without its terminator.
    pub fn text_lines(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, l)| std::str::from_utf8(&l.body).ok().map(|t| (i, t)))
    }

    /// Replace the body of line `index`, keeping its terminator. Returns false
    /// when out of range; rejects lines with embedded CR, LF or NUL.
    pub fn replace(&mut self, index: usize, line: impl Into<String>) -> io::Result<bool> {
        let line = line.into();
        if line.contains(['\n', '\r', '\0']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("replacement for line {index} contains a newline or NUL"),
            ));
        }
        match self.lines.get_mut(index) {
            Some(slot) => {
                slot.body = line.into_bytes();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.lines
                .iter()
                .map(|l| l.body.len() + l.ending.len())
                .sum(),
        );
        for l in &self.lines {
            out.extend_from_slice(&l.body);
            out.extend_from_slice(l.ending);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_empty_is_empty() {
        let tl = TextLines::parse(b"");
        assert!(tl.is_empty());
        assert!(tl.build().is_empty());
    }

    #[test]
    fn parse_build_preserves_lf_and_missing_trailing_newline() {
        for s in ["a\nb\n", "a\nb", "\n\nx\n", "single"] {
            assert_eq!(TextLines::parse(s.as_bytes()).build(), s.as_bytes(), "input {s:?}");
        }
    }

    #[test]
    fn parse_build_preserves_crlf() {
        let s = b"export ZSH=x\r\nplugins=(git)\r\n";
        let tl = TextLines::parse(s);
        assert_eq!(tl.len(), 2);
        let texts: Vec<_> = tl.text_lines().collect();
        assert_eq!(texts[1], (1, "plugins=(git)"));
        assert_eq!(tl.build(), s);
    }

    #[test]
    fn parse_build_preserves_mixed_endings() {
        let s = b"a\r\nb\nc\n";
        assert_eq!(TextLines::parse(s).build(), s);
    }

    #[test]
    fn invalid_utf8_lines_are_kept_but_not_offered() {
        let s = b"# caf\xe9\nplugins=(git)\n";
        let tl = TextLines::parse(s);
        let texts: Vec<_> = tl.text_lines().collect();
        assert_eq!(texts, vec![(1, "plugins=(git)")]);
        assert_eq!(tl.build(), s);
    }

    #[test]
    fn replace_rewrites_single_line_and_keeps_terminator() {
        let mut tl = TextLines::parse(b"a\r\nb\r\nc");
        assert!(tl.replace(1, "B").unwrap());
        assert!(!tl.replace(9, "nope").unwrap());
        assert_eq!(tl.build(), b"a\r\nB\r\nc");
    }

    #[test]
    fn rejects_separators_in_replacement() {
        let mut tl = TextLines::parse(b"a\n");
        assert!(tl.replace(0, "bad\nline").is_err());
        assert!(tl.replace(0, "bad\rline").is_err());
        assert!(tl.replace(0, "bad\0line").is_err());
        assert_eq!(tl.build(), b"a\n");
    }
}
