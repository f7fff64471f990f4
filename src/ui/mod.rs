//! Widget tree, widget set and per-screen focus state.

pub mod element;
pub mod gui;
pub mod widgets;

pub use element::{shake_animation, Bounds, ClickListener, ElementId, FocusDirection, Tree};
pub use gui::{Gui, Screen, UiAction, UiEvents};
pub use widgets::{
    CustomDrawer, DebugRectangle, Frame, List, ListItem, ToggleListItem, Widget,
};
