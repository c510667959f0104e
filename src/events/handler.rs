//! Event handler for processing input events.

use super::{InputEvent, Key};
use crate::config::KeyBindings;
use crate::error::Result;
use crate::state::{Action, Asset, AssetId, EditTarget, InputMode, Store, TimeInterval, View};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use std::time::Duration;

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Key bindings.
    keybindings: KeyBindings,
    /// How long to wait for input before yielding a tick.
    poll_timeout: Duration,
    /// Whether mouse scrolling is honoured.
    mouse_support: bool,
    /// Store reference for state-aware handling.
    store_snapshot: Option<StoreSnapshot>,
}

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone)]
struct StoreSnapshot {
    input_mode: InputMode,
    current_view: View,
    show_help: bool,
    has_error: bool,
    selected_bookmark: Option<AssetId>,
    selected_constraint_asset: Option<Asset>,
}

impl EventHandler {
    /// Create a new event handler.
    pub fn new(keybindings: KeyBindings, poll_timeout: Duration, mouse_support: bool) -> Self {
        Self {
            keybindings,
            poll_timeout,
            mouse_support,
            store_snapshot: None,
        }
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.store_snapshot = Some(StoreSnapshot {
            input_mode: store.app.input_mode,
            current_view: store.app.current_view,
            show_help: store.app.show_help,
            has_error: store.app.error.is_some(),
            selected_bookmark: store.bookmarks.selected_asset().map(|a| a.asset_id),
            selected_constraint_asset: store
                .constraints
                .selected_row
                .and_then(|row| store.assets.assets.get(row))
                .cloned(),
        });
    }

    /// Get the next action from user input.
    ///
    /// Returns `Ok(None)` when nothing arrived within the poll timeout.
    pub async fn next(&mut self) -> Result<Option<Action>> {
        if event::poll(self.poll_timeout)? {
            match event::read()? {
                CrosstermEvent::Key(key) => return Ok(self.handle_key(key)),
                CrosstermEvent::Mouse(mouse) => return Ok(self.handle_mouse(mouse)),
                CrosstermEvent::Paste(text) => return Ok(self.handle_paste(text)),
                // Terminal will automatically redraw
                _ => {}
            }
        }
        Ok(None)
    }

    /// Handle a key event and return an optional action.
    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let snapshot = self.store_snapshot.as_ref()?;
        let input = InputEvent::from(key);

        match snapshot.input_mode {
            InputMode::Normal => self.handle_normal_mode(input, snapshot),
            InputMode::Insert => self.handle_insert_mode(input),
        }
    }

    /// Handle a mouse event and return an optional action.
    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        if !self.mouse_support {
            return None;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        }
    }

    /// Paste in insert mode types its printable characters.
    fn handle_paste(&self, text: String) -> Option<Action> {
        let snapshot = self.store_snapshot.as_ref()?;
        if snapshot.input_mode != InputMode::Insert {
            return None;
        }
        let printable: String = text.chars().filter(|c| !c.is_control()).collect();
        (!printable.is_empty()).then_some(Action::InputText(printable))
    }

    fn handle_normal_mode(&self, input: InputEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        let kb = &self.keybindings;

        // Overlays swallow input until closed.
        if snapshot.show_help {
            if input.matches(&kb.help) || input.matches(&kb.back) || input.matches(&kb.quit) {
                return Some(Action::ToggleHelp);
            }
            return None;
        }
        if snapshot.has_error && input.matches(&kb.back) {
            return Some(Action::ClearError);
        }

        // Global shortcuts
        if input.matches(&kb.quit) {
            return Some(Action::Quit);
        }
        if input.matches(&kb.help) {
            return Some(Action::ToggleHelp);
        }
        if input.matches(&kb.refresh) {
            return Some(Action::RefreshAll);
        }

        // View switching
        if input.matches(&kb.portfolios) {
            return Some(Action::SetView(View::Portfolios));
        }
        if input.matches(&kb.backtest) {
            return Some(Action::SetView(View::Backtest));
        }
        if input.matches(&kb.bookmarks) {
            return Some(Action::SetView(View::Bookmarks));
        }
        if input.matches(&kb.constraints) {
            return Some(Action::SetView(View::Constraints));
        }
        if input.key == Key::Tab {
            return Some(Action::SetView(next_view(snapshot.current_view)));
        }

        // Navigation
        if input.matches(&kb.up) || input.key == Key::Up {
            return Some(Action::ScrollUp);
        }
        if input.matches(&kb.down) || input.key == Key::Down {
            return Some(Action::ScrollDown);
        }
        match input.key {
            Key::PageUp => return Some(Action::PageUp),
            Key::PageDown => return Some(Action::PageDown),
            Key::Home => return Some(Action::GoToTop),
            Key::End => return Some(Action::GoToBottom),
            _ => {}
        }

        // View-specific actions
        match snapshot.current_view {
            View::Portfolios => self.handle_portfolios_view(input),
            View::Backtest => self.handle_backtest_view(input),
            View::Bookmarks => self.handle_bookmarks_view(input, snapshot),
            View::Constraints => self.handle_constraints_view(input, snapshot),
        }
    }

    fn handle_portfolios_view(&self, input: InputEvent) -> Option<Action> {
        if input.matches(&self.keybindings.select) {
            return Some(Action::OpenSelectedPortfolio);
        }
        None
    }

    fn handle_backtest_view(&self, input: InputEvent) -> Option<Action> {
        if input.matches(&self.keybindings.measure) {
            return Some(Action::ToggleMeasure);
        }
        match input.char() {
            Some('d') => Some(Action::SetTimeInterval(TimeInterval::Day)),
            Some('w') => Some(Action::SetTimeInterval(TimeInterval::Week)),
            Some('m') => Some(Action::SetTimeInterval(TimeInterval::Month)),
            Some('y') => Some(Action::SetTimeInterval(TimeInterval::Year)),
            _ => None,
        }
    }

    fn handle_bookmarks_view(&self, input: InputEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        let kb = &self.keybindings;

        if input.matches(&kb.toggle_select) {
            return Some(Action::ToggleSelectedBookmark);
        }
        if input.matches(&kb.add_selection) {
            return Some(Action::ConfirmTempAssets);
        }
        if input.matches(&kb.sort) {
            return Some(Action::CycleBookmarkSort);
        }
        if input.matches(&kb.back) {
            return Some(Action::ResetTempAssets);
        }
        if input.matches(&kb.remove) {
            return snapshot.selected_bookmark.map(Action::RemoveBookmark);
        }
        if input.matches(&kb.select) {
            return snapshot.selected_bookmark.map(Action::LoadAssetDetail);
        }
        None
    }

    fn handle_constraints_view(&self, input: InputEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        let kb = &self.keybindings;

        if input.matches(&kb.left) || input.key == Key::Left {
            return Some(Action::ColumnLeft);
        }
        if input.matches(&kb.right) || input.key == Key::Right {
            return Some(Action::ColumnRight);
        }
        if input.matches(&kb.edit) || input.matches(&kb.select) {
            return Some(Action::BeginEditSelectedCell);
        }
        if input.matches(&kb.edit_cash) {
            return Some(Action::BeginEdit(EditTarget::TotalCash));
        }
        if input.matches(&kb.add_cash) {
            return Some(Action::AddCashUnit);
        }
        if input.matches(&kb.cash_unit) {
            return Some(Action::CycleCashUnit);
        }
        if input.matches(&kb.remove) {
            return Some(Action::RemoveSelectedAsset);
        }
        if input.matches(&kb.submit) {
            return Some(Action::SubmitPortfolio);
        }
        if input.matches(&kb.bookmark) {
            return snapshot.selected_constraint_asset.clone().map(Action::AddBookmark);
        }
        None
    }

    fn handle_insert_mode(&self, input: InputEvent) -> Option<Action> {
        if input.modifiers.ctrl || input.modifiers.alt {
            return None;
        }
        match input.key {
            Key::Escape => Some(Action::CancelEdit),
            Key::Enter => Some(Action::CommitEdit),
            Key::Backspace => Some(Action::InputBackspace),
            Key::Left => Some(Action::InputCursorLeft),
            Key::Right => Some(Action::InputCursorRight),
            Key::Char(c) => Some(Action::InputChar(c)),
            _ => None,
        }
    }
}

fn next_view(view: View) -> View {
    match view {
        View::Portfolios => View::Backtest,
        View::Backtest => View::Bookmarks,
        View::Bookmarks => View::Constraints,
        View::Constraints => View::Portfolios,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn handler_for(store: &Store) -> EventHandler {
        let mut handler = EventHandler::new(KeyBindings::default(), Duration::from_millis(10), true);
        handler.update_store_snapshot(store);
        handler
    }

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_view_switching() {
        let store = store();
        let handler = handler_for(&store);
        assert!(matches!(handler.handle_key(key('3')), Some(Action::SetView(View::Bookmarks))));
        assert!(matches!(
            handler.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
            Some(Action::SetView(View::Backtest))
        ));
    }

    #[test]
    fn test_remove_targets_selected_bookmark() {
        let mut store = store();
        store.app.current_view = View::Bookmarks;
        store.reduce(Action::BookmarksLoaded(vec![Asset::new(8, "A", "A", dec!(1))]));
        let handler = handler_for(&store);

        assert!(matches!(
            handler.handle_key(key('x')),
            Some(Action::RemoveBookmark(AssetId(8)))
        ));
        assert!(matches!(handler.handle_key(key(' ')), Some(Action::ToggleSelectedBookmark)));
    }

    #[test]
    fn test_insert_mode_captures_characters() {
        let mut store = store();
        store.app.input_mode = InputMode::Insert;
        let handler = handler_for(&store);

        // 'q' is typed, not quit.
        assert!(matches!(handler.handle_key(key('q')), Some(Action::InputChar('q'))));
        assert!(matches!(
            handler.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            Some(Action::CommitEdit)
        ));
        assert!(matches!(
            handler.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Action::CancelEdit)
        ));
    }

    #[test]
    fn test_paste_types_every_printable_char() {
        let mut store = store();
        let normal = handler_for(&store);
        assert!(normal.handle_paste("123".into()).is_none());

        store.app.input_mode = InputMode::Insert;
        let handler = handler_for(&store);
        match handler.handle_paste("12.5\t%\r\n".into()) {
            Some(Action::InputText(text)) => assert_eq!(text, "12.5%"),
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(handler.handle_paste("\n".into()).is_none());
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut store = store();
        store.app.show_help = true;
        let handler = handler_for(&store);

        assert!(handler.handle_key(key('3')).is_none());
        assert!(matches!(
            handler.handle_key(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT)),
            Some(Action::ToggleHelp)
        ));
    }

    #[test]
    fn test_backtest_interval_keys() {
        let mut store = store();
        store.app.current_view = View::Backtest;
        let handler = handler_for(&store);

        assert!(matches!(
            handler.handle_key(key('y')),
            Some(Action::SetTimeInterval(TimeInterval::Year))
        ));
        assert!(matches!(handler.handle_key(key('v')), Some(Action::ToggleMeasure)));
    }

    #[test]
    fn test_constraint_keys() {
        let mut store = store();
        store.app.current_view = View::Constraints;
        let handler = handler_for(&store);

        assert!(matches!(handler.handle_key(key('l')), Some(Action::ColumnRight)));
        assert!(matches!(
            handler.handle_key(KeyEvent::new(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Some(Action::AddCashUnit)
        ));
        assert!(matches!(handler.handle_key(key('p')), Some(Action::SubmitPortfolio)));
    }

    #[test]
    fn test_bookmark_key_targets_selected_constraint() {
        let mut store = store();
        store.app.current_view = View::Constraints;
        let handler = handler_for(&store);
        assert!(handler.handle_key(key('b')).is_none());

        store.reduce(Action::AddAsset(Asset::new(4, "B", "B", dec!(1))));
        let handler = handler_for(&store);
        assert!(matches!(
            handler.handle_key(key('b')),
            Some(Action::AddBookmark(asset)) if asset.asset_id == AssetId(4)
        ));
    }

    #[test]
    fn test_no_snapshot_no_action() {
        let handler = EventHandler::new(KeyBindings::default(), Duration::from_millis(10), true);
        assert!(handler.handle_key(key('q')).is_none());
    }
}
