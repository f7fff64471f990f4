//! Software rendering: packed colors, pixel-address translation, fonts and
//! the double-buffered framebuffer renderer.

pub mod color;
pub mod display;
pub mod font;
pub mod layout;
pub mod renderer;

pub use color::{blend_channel, Color};
pub use display::{DisplayBackend, NullDisplay};
pub use font::{FontFace, FontSet};
pub use layout::{BlockTiledLayout, LinearLayout, PixelLayout};
pub use renderer::{Renderer, RendererOptions};
