//! veil - console overlay UI toolkit.
//!
//! A widget tree with directional focus navigation, rendered into a
//! double-buffered software framebuffer and driven by background input
//! pollers. The overlay lives inside a host process: host display and input
//! services stay behind narrow traits ([`gfx::DisplayBackend`],
//! [`input::poller::InputSource`], [`input::poller::ButtonWatch`]), so the
//! whole stack runs against software backends for tests and demos.

pub mod config;
pub mod gfx;
pub mod input;
pub mod overlay;
pub mod style;
pub mod ui;

pub use config::{Settings, Theme};
pub use gfx::{Color, Renderer, RendererOptions};
pub use input::{parse_combo, InputFrame, InputRig, Keys};
pub use overlay::{LaunchOptions, Overlay, OverlayOptions};
pub use ui::{
    Bounds, CustomDrawer, DebugRectangle, ElementId, FocusDirection, Frame, Gui, List, ListItem,
    Screen, ToggleListItem, Tree, UiEvents,
};
