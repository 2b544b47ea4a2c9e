pub mod components;
mod highlight;
mod layout;
pub mod screens;
mod theme;

pub use highlight::{Highlighter, truncate_spans};
pub use layout::Layout;
pub use theme::Theme;
