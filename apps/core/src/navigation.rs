use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavCommand {
    Up,
    Down,
    PageUp,
    PageDown,
}

/// Selection over a result list of `len` rows. `None` while the list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    index: Option<usize>,
    len: usize,
    page_size: usize,
}

impl Selection {
    pub fn new(page_size: usize) -> Self {
        Self {
            index: None,
            len: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Called whenever the result list is replaced.
    pub fn reset(&mut self, len: usize) -> Option<usize> {
        self.len = len;
        self.index = if len == 0 { None } else { Some(0) };
        self.index
    }

    pub fn apply(&mut self, command: NavCommand) -> Option<usize> {
        let current = self.index?;
        let max = self.len - 1;

        let next = match command {
            NavCommand::Up => current.saturating_sub(1),
            NavCommand::Down => (current + 1).min(max),
            NavCommand::PageUp => current.saturating_sub(self.page_size),
            NavCommand::PageDown => current.saturating_add(self.page_size).min(max),
        };

        self.index = Some(next);
        self.index
    }

    /// Pointer selection; out-of-range rows clamp to the last one.
    pub fn select(&mut self, index: usize) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.index = Some(index.min(self.len - 1));
        self.index
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::{NavCommand, Selection};

    #[test]
    fn starts_empty() {
        let mut selection = Selection::default();
        assert_eq!(selection.index(), None);
        assert_eq!(selection.apply(NavCommand::Down), None);
        assert_eq!(selection.select(3), None);
    }

    #[test]
    fn reset_points_at_first_row_or_empties() {
        let mut selection = Selection::default();
        assert_eq!(selection.reset(3), Some(0));
        selection.apply(NavCommand::Down);
        assert_eq!(selection.reset(5), Some(0));
        assert_eq!(selection.reset(0), None);
        assert!(selection.is_empty());
    }

    #[test]
    fn steps_clamp_without_wrapping() {
        let mut selection = Selection::default();
        selection.reset(3);
        assert_eq!(selection.apply(NavCommand::Up), Some(0));
        assert_eq!(selection.apply(NavCommand::Down), Some(1));
        assert_eq!(selection.apply(NavCommand::Down), Some(2));
        assert_eq!(selection.apply(NavCommand::Down), Some(2));
        assert_eq!(selection.apply(NavCommand::Up), Some(1));
    }

    #[test]
    fn paging_snaps_to_boundaries() {
        let mut selection = Selection::new(10);
        selection.reset(25);
        assert_eq!(selection.apply(NavCommand::PageDown), Some(10));
        assert_eq!(selection.apply(NavCommand::PageDown), Some(20));
        assert_eq!(selection.apply(NavCommand::PageDown), Some(24));
        assert_eq!(selection.apply(NavCommand::PageUp), Some(14));
        assert_eq!(selection.apply(NavCommand::PageUp), Some(4));
        assert_eq!(selection.apply(NavCommand::PageUp), Some(0));
    }

    #[test]
    fn page_down_from_last_page_lands_on_last_row() {
        let mut selection = Selection::new(20);
        selection.reset(30);
        selection.select(15);
        assert_eq!(selection.apply(NavCommand::PageDown), Some(29));
    }

    #[test]
    fn zero_page_size_still_moves() {
        let mut selection = Selection::new(0);
        selection.reset(3);
        assert_eq!(selection.page_size(), 1);
        assert_eq!(selection.apply(NavCommand::PageDown), Some(1));
    }

    #[test]
    fn pointer_selection_clamps() {
        let mut selection = Selection::default();
        selection.reset(4);
        assert_eq!(selection.select(2), Some(2));
        assert_eq!(selection.select(99), Some(3));
        assert_eq!(selection.len(), 4);
    }
}
