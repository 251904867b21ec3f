/// Owned source text plus a line-start index.
///
/// The host hands us the text it already parsed; we only need fast
/// offset-to-position conversion and per-line access.
#[derive(Debug)]
pub struct SourceFile {
    content: Vec<u8>,
    /// Byte offsets where each line starts (0-indexed into content).
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn from_vec(content: Vec<u8>) -> Self {
        let line_starts = compute_line_starts(&content);
        Self {
            content,
            line_starts,
        }
    }

    pub fn from_str(content: &str) -> Self {
        Self::from_vec(content.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset at which the given 1-indexed line starts.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts[line - 1]
    }

    /// The given 1-indexed line as a byte slice, without its newline.
    pub fn line(&self, line: usize) -> &[u8] {
        if line == 0 || line > self.line_starts.len() {
            return &[];
        }
        let start = self.line_starts[line - 1];
        let end = if line < self.line_starts.len() {
            self.line_starts[line] - 1
        } else {
            self.content.len()
        };
        let bytes = &self.content[start..end];
        bytes.strip_suffix(b"\r").unwrap_or(bytes)
    }

    /// The given line as UTF-8 text. Invalid UTF-8 yields an empty string,
    /// which opts the line out of pattern and URI matching but not the
    /// length check itself.
    pub fn line_str(&self, line: usize) -> &str {
        std::str::from_utf8(self.line(line)).unwrap_or("")
    }

    /// Convert a byte offset into a (1-indexed line, 0-indexed column) pair.
    /// Column is a character offset within the line.
    pub fn offset_to_line_col(&self, byte_offset: usize) -> (usize, usize) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_bytes = &self.content[self.line_starts[line_idx]..byte_offset];
        // Counting non-continuation bytes equals counting character starts,
        // and stays well-defined on partial or invalid UTF-8.
        let col = line_bytes.iter().filter(|&&b| (b & 0xC0) != 0x80).count();
        (line_idx + 1, col)
    }

    /// 1-indexed line containing the byte offset.
    pub fn line_of(&self, byte_offset: usize) -> usize {
        self.offset_to_line_col(byte_offset).0
    }
}

fn compute_line_starts(content: &[u8]) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, &byte) in content.iter().enumerate() {
        if byte == b'\n' && i + 1 < content.len() {
            starts.push(i + 1);
        }
    }
    starts
}

/// Rendered width of a raw line. Lines that decode as UTF-8 are measured
/// like [`display_width`]; otherwise character starts (non-continuation
/// bytes) are counted so an undecodable line still has a width.
pub fn display_width_bytes(bytes: &[u8], tab_width: usize) -> usize {
    match std::str::from_utf8(bytes) {
        Ok(text) => display_width(text, tab_width),
        Err(_) => bytes.iter().filter(|&&b| (b & 0xC0) != 0x80).count(),
    }
}

/// Rendered width of a line in columns: one per character, with tabs
/// expanding to the next multiple of `tab_width`.
pub fn display_width(text: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut width = 0;
    for ch in text.chars() {
        if ch == '\t' {
            width += tab_width - (width % tab_width);
        } else {
            width += 1;
        }
    }
    width
}
