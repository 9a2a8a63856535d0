//! Byte offsets, spans and line/column positions

use std::{fmt, ops};

/// Byte offset into a source string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Offset(u32);

impl Offset {
    pub fn into_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Offset {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

impl From<usize> for Offset {
    fn from(x: usize) -> Self {
        Self(x as u32)
    }
}

impl From<Offset> for u32 {
    fn from(x: Offset) -> Self {
        x.0
    }
}

impl ops::Add<u32> for Offset {
    type Output = Offset;

    fn add(self, rhs: u32) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl ops::AddAssign<u32> for Offset {
    fn add_assign(&mut self, rhs: u32) {
        self.0 += rhs;
    }
}

impl ops::Sub<Offset> for Offset {
    type Output = u32;

    fn sub(self, rhs: Offset) -> Self::Output {
        self.0 - rhs.0
    }
}

/// Half-open byte range `[start, end)` into a source string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: Offset,
    pub end: Offset,
}

impl Span {
    pub fn from(start: impl Into<Offset>, end: impl Into<Offset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", u32::from(self.start), u32::from(self.end))
    }
}

/// Zero-based line/column pair. The `Display` form is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineColumn {
    line0: u32,
    column0: u32,
}

impl LineColumn {
    pub fn new0(line0: impl TryInto<u32>, column0: impl TryInto<u32>) -> Self {
        let line0 = line0.try_into().unwrap_or_else(|_| unreachable!());
        let column0 = column0.try_into().unwrap_or_else(|_| unreachable!());
        Self { line0, column0 }
    }

    pub fn line0(&self) -> u32 {
        self.line0
    }

    pub fn column0(&self) -> u32 {
        self.column0
    }

    pub fn line1(&self) -> u32 {
        self.line0 + 1
    }

    pub fn column1(&self) -> u32 {
        self.column0 + 1
    }
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line1(), self.column1())
    }
}
