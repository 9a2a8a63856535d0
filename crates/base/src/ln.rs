//! Line, column and byte offset conversion

use crate::span::{LineColumn, Offset, Span};

/// Per-source table for offset → line/column lookup
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct LineTable {
    /// Always has at least one element for the first line
    lines: Vec<LineInfo>,
    end_offset: Offset,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct LineInfo {
    /// Offset of line start
    start: Offset,
    /// Spans of chars with utf8 length > 1
    wide_chars: Vec<Span>,
}

impl LineTable {
    pub fn new(source_text: &str) -> Self {
        let mut table = LineTable {
            lines: vec![LineInfo {
                start: Offset::from(0u32),
                wide_chars: Vec::new(),
            }],
            end_offset: Offset::from(source_text.len()),
        };
        for (i, c) in source_text.char_indices() {
            if c == '\n' {
                table.lines.push(LineInfo {
                    start: Offset::from(i + 1),
                    wide_chars: Vec::new(),
                })
            } else if c.len_utf8() > 1 {
                table.lines.last_mut().unwrap().wide_chars.push(Span {
                    start: Offset::from(i),
                    end: Offset::from(i + c.len_utf8()),
                });
            }
        }
        table
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn line_column(&self, position: Offset) -> LineColumn {
        match self.lines.binary_search_by_key(&position, |l| l.start) {
            Ok(line0) => LineColumn::new0(line0, 0u32),
            Err(next_line0) => {
                let line0 = next_line0 - 1;
                let line = &self.lines[line0];
                // byte offset from line start; adjust for wide characters in between
                let mut column0 = position - line.start;
                for wc in line.wide_chars.iter() {
                    if wc.start >= position {
                        break;
                    }
                    column0 -= wc.len() - 1;
                }
                LineColumn::new0(line0, column0)
            }
        }
    }

}
