//! Balanced block scanning
//!
//! Recovers the top-level `{...}` or `[...]` blocks embedded in free text by
//! tracking delimiter depth. Once a block is open, delimiters inside
//! double-quoted strings (with backslash escapes) are skipped, so
//! `{"name": "a}b"}` comes back whole.

/// Delimiter pair to scan for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `{` and `}`
    Brace,
    /// `[` and `]`
    Bracket,
}

impl Delimiter {
    const fn pair(self) -> (u8, u8) {
        match self {
            Self::Brace => (b'{', b'}'),
            Self::Bracket => (b'[', b']'),
        }
    }
}

/// Scan failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("Unbalanced '{open}' starting at offset {offset}")]
    Unbalanced { open: char, offset: usize },
}

/// Iterator over balanced top-level blocks, in order of appearance
///
/// Closing delimiters with no open block are ignored. If the text ends inside
/// an open block, the iterator yields one `ScanError::Unbalanced` and stops.
pub struct BlockScanner<'a> {
    text: &'a str,
    pos: usize,
    open: u8,
    close: u8,
    finished: bool,
}

impl<'a> BlockScanner<'a> {
    pub const fn new(text: &'a str, delimiter: Delimiter) -> Self {
        let (open, close) = delimiter.pair();
        Self {
            text,
            pos: 0,
            open,
            close,
            finished: false,
        }
    }
}

impl<'a> Iterator for BlockScanner<'a> {
    type Item = Result<&'a str, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let bytes = self.text.as_bytes();
        let mut depth = 0usize;
        let mut start = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        while self.pos < bytes.len() {
            let byte = bytes[self.pos];
            self.pos += 1;

            if in_string {
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                }
                continue;
            }

            if byte == b'"' && depth > 0 {
                in_string = true;
            } else if byte == self.open {
                if depth == 0 {
                    start = self.pos - 1;
                }
                depth += 1;
            } else if byte == self.close && depth > 0 {
                depth -= 1;
                if depth == 0 {
                    // Delimiters are ASCII, so both ends sit on char boundaries
                    return Some(Ok(&self.text[start..self.pos]));
                }
            }
        }

        self.finished = true;
        (depth > 0).then(|| {
            Err(ScanError::Unbalanced {
                open: char::from(self.open),
                offset: start,
            })
        })
    }
}
