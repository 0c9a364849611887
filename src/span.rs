/// A byte range into a plan source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A placeholder span for diagnostics not tied to a source location.
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Span of the character at 1-based `line`/`column` in `source`.
    pub fn at_line_column(source: &str, line: usize, column: usize) -> Self {
        let mut offset = 0usize;
        for (i, text) in source.split_inclusive('\n').enumerate() {
            if i + 1 == line {
                let col = column.saturating_sub(1).min(text.len());
                let start = (offset + col) as u32;
                let end = if (offset + col) < source.len() {
                    start + 1
                } else {
                    start
                };
                return Self { start, end };
            }
            offset += text.len();
        }
        let end = source.len() as u32;
        Self { start: end, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_column_first_line() {
        let span = Span::at_line_column("{\"a\": 1}", 1, 3);
        assert_eq!(span, Span::new(2, 3));
    }

    #[test]
    fn test_at_line_column_later_line() {
        let source = "{\n  \"a\": ,\n}";
        let span = Span::at_line_column(source, 2, 8);
        assert_eq!(&source[span.start as usize..span.end as usize], ",");
    }

    #[test]
    fn test_at_line_column_past_end() {
        let span = Span::at_line_column("{}", 7, 1);
        assert_eq!(span, Span::new(2, 2));
    }
}
