/// What the modal dialog is showing, if anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogMode {
    #[default]
    None,
    /// Full text of a stored match file.
    ViewFile { name: String, content: String },
    /// Plain-text share payload ready to hand off.
    Share { subject: String, body: String },
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub is_error: bool,
    pub timestamp: std::time::Instant,
}

/// Selection and status shown by the file screen.
#[derive(Default)]
pub struct FileScreenState {
    pub files: Vec<String>,
    pub selected: usize,
    pub connected: bool,
    pub last_connected_ms: Option<i64>,
}

impl FileScreenState {
    pub fn selected_file(&self) -> Option<&str> {
        self.files.get(self.selected).map(String::as_str)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.files.len() {
            self.selected += 1;
        }
    }

    /// Replace the listing, keeping the selection on a valid row.
    pub fn set_files(&mut self, files: Vec<String>) {
        self.files = files;
        if self.selected >= self.files.len() {
            self.selected = self.files.len().saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_clamped_after_refresh() {
        let mut state = FileScreenState::default();
        state.set_files(vec!["B1".into(), "B2".into(), "B3".into()]);
        state.selected = 2;

        state.set_files(vec!["B1".into()]);
        assert_eq!(state.selected, 0);
        assert_eq!(state.selected_file(), Some("B1"));
    }

    #[test]
    fn test_move_bounds() {
        let mut state = FileScreenState::default();
        state.set_files(vec!["B1".into(), "B2".into()]);

        state.move_up();
        assert_eq!(state.selected, 0);
        state.move_down();
        assert_eq!(state.selected, 1);
        state.move_down();
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let state = FileScreenState::default();
        assert_eq!(state.selected_file(), None);
    }
}
