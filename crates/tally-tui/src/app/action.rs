use tally_types::ViewportIntent;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Navigate(ViewportIntent),
    Quit,

    // UI toggles
    ToggleHelp,
    ToggleTimestamps,
    ToggleSources,

    // Re-run ingestion now
    Reload,
}
