use crate::error::{Error, Result};

/// Which content block of the installed result is focused.
///
/// Scoped to one result: a new result gets a fresh `Selection` at index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    len: usize,
}

impl Selection {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Focused block, or `None` when the result has no blocks.
    pub fn current(&self) -> Option<usize> {
        (self.index < self.len).then_some(self.index)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Out-of-range indices are rejected and leave the selection unchanged.
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(Error::SelectionOutOfRange {
                index,
                len: self.len,
            });
        }
        self.index = index;
        Ok(())
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.index + 1 < self.len {
            self.index += 1;
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<usize> {
        self.index = self.index.saturating_sub(1);
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_first_block() {
        assert_eq!(Selection::new(5).current(), Some(0));
    }

    #[test]
    fn empty_result_has_no_focus() {
        let mut selection = Selection::new(0);
        assert_eq!(selection.current(), None);
        assert!(selection.select(0).is_err());
        assert_eq!(selection.next(), None);
    }

    #[test]
    fn rejects_out_of_range() {
        let mut selection = Selection::new(5);
        selection.select(2).unwrap();

        let err = selection.select(5).unwrap_err();
        assert!(matches!(err, Error::SelectionOutOfRange { index: 5, len: 5 }));
        assert_eq!(selection.current(), Some(2));
    }

    #[test]
    fn stepping_is_clamped() {
        let mut selection = Selection::new(2);
        assert_eq!(selection.previous(), Some(0));
        assert_eq!(selection.next(), Some(1));
        assert_eq!(selection.next(), Some(1));
    }
}
