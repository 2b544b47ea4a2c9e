use tracing::trace;

use tally_types::ViewportIntent;

use crate::store::{LogStore, RedrawHandle, View};

/// Applies navigation intents to the store's view state
///
/// Each intent is one locked read-modify-write. A transition that changes the
/// view requests exactly one redraw; a no-op requests none.
#[derive(Clone)]
pub struct ViewportController {
    store: LogStore,
    redraw: RedrawHandle,
}

impl ViewportController {
    pub fn new(store: LogStore, redraw: RedrawHandle) -> Self {
        Self { store, redraw }
    }

    /// Apply an intent, returning whether the view changed
    pub fn apply(&self, intent: ViewportIntent) -> bool {
        let changed = self.store.update_view(|view| {
            let before = *view;
            transition(view, intent);
            *view != before
        });

        trace!(?intent, changed, "viewport transition");

        if changed {
            self.redraw.request();
        }
        changed
    }

    pub fn move_up(&self) -> bool {
        self.apply(ViewportIntent::MoveUp)
    }

    pub fn move_down(&self) -> bool {
        self.apply(ViewportIntent::MoveDown)
    }

    pub fn resize(&self, height: usize) -> bool {
        self.apply(ViewportIntent::Resize(height))
    }
}

fn transition(view: &mut View, intent: ViewportIntent) {
    let last = view.len.checked_sub(1);

    match intent {
        ViewportIntent::MoveUp => {
            if let Some(selected) = view.selected_line.filter(|&s| s > 0) {
                let selected = selected - 1;
                view.selected_line = Some(selected);
                if selected < view.scroll_offset {
                    view.scroll_offset = selected;
                }
            }
        }
        ViewportIntent::MoveDown => {
            if let (Some(selected), Some(last)) = (view.selected_line, last) {
                if selected < last {
                    let selected = selected + 1;
                    view.selected_line = Some(selected);
                    if selected >= view.scroll_offset + view.viewport_height {
                        view.scroll_offset += 1;
                    }
                }
            }
        }
        ViewportIntent::PageUp => {
            if let Some(selected) = view.selected_line {
                view.selected_line = Some(selected.saturating_sub(view.viewport_height));
            }
        }
        ViewportIntent::PageDown => {
            if let (Some(selected), Some(last)) = (view.selected_line, last) {
                view.selected_line = Some((selected + view.viewport_height).min(last));
            }
        }
        ViewportIntent::Top => {
            if view.selected_line.is_some() {
                view.selected_line = Some(0);
                view.scroll_offset = 0;
            }
        }
        ViewportIntent::Bottom => {
            if view.selected_line.is_some() {
                view.follow_tail();
            }
        }
        ViewportIntent::Resize(height) => {
            view.viewport_height = height.max(1);
            let max_scroll = view.len.saturating_sub(view.viewport_height);
            view.scroll_offset = view.scroll_offset.min(max_scroll);
        }
    }

    view.reveal_selection();
}
