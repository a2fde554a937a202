use serde::{Deserialize, Serialize};

/// Half-open range of character offsets into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Check whether `point` lies inside the span
    pub fn contains(&self, point: usize) -> bool {
        self.start <= point && point < self.end
    }

    /// Check whether `other` is fully enclosed by this span
    pub fn encloses(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let span = Span::new(2, 5);
        assert!(!span.contains(1));
        assert!(span.contains(2));
        assert!(span.contains(4));
        assert!(!span.contains(5));
    }

    #[test]
    fn test_encloses() {
        let outer = Span::new(0, 10);
        assert!(outer.encloses(&Span::new(0, 10)));
        assert!(outer.encloses(&Span::new(3, 4)));
        assert!(!outer.encloses(&Span::new(3, 11)));
    }
}
