//! Cursor over a fixed-length list. Movement stops at either end.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    cursor: usize,
    count: usize,
}

impl SelectionState {
    /// A cursor on the first of `count` items.
    pub fn new(count: usize) -> Self {
        Self { cursor: 0, count }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn count(&self) -> usize {
        self.count
    }

    fn last(&self) -> Option<usize> {
        self.count.checked_sub(1)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if let Some(last) = self.last() {
            self.cursor = (self.cursor + 1).min(last);
        }
    }

    /// Jump to `index`, or to the last item when it is out of range.
    pub fn select(&mut self, index: usize) {
        if let Some(last) = self.last() {
            self.cursor = index.min(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walking_past_either_end_stays_put() {
        let mut cursor = SelectionState::new(3);
        cursor.move_up();
        assert_eq!(cursor.cursor(), 0);
        for _ in 0..5 {
            cursor.move_down();
        }
        assert_eq!(cursor.cursor(), 2);
        cursor.move_up();
        assert_eq!(cursor.cursor(), 1);
    }

    #[test]
    fn select_out_of_range_lands_on_last() {
        let mut cursor = SelectionState::new(7);
        cursor.select(4);
        assert_eq!(cursor.cursor(), 4);
        cursor.select(70);
        assert_eq!(cursor.cursor(), 6);
    }

    #[test]
    fn empty_list_never_moves() {
        let mut cursor = SelectionState::new(0);
        cursor.move_down();
        cursor.select(2);
        assert_eq!(cursor.cursor(), 0);
        assert_eq!(cursor.count(), 0);
    }
}
