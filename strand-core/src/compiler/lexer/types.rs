//! 通用位置类型

/// 源代码坐标（1-based）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub line: usize,
    pub column: usize,
}

impl Default for Coordinate {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// 源代码范围（span）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Coordinate,
    pub end: Coordinate,
}

impl Span {
    pub fn new(start: Coordinate, end: Coordinate) -> Self {
        Self { start, end }
    }
}
