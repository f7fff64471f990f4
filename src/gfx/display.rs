//! Seam to the host's managed display layer.
//!
//! The renderer drives a [`DisplayBackend`] for everything that touches the
//! host: vsync pacing, presenting a finished buffer, and toggling input
//! foreground. A headless implementation backs tests and the demo binary.

use anyhow::Result;

/// Host display services consumed by the renderer.
pub trait DisplayBackend: Send {
    /// Blocks until the display's next vertical sync.
    fn wait_vsync(&mut self);

    /// Presents a finished pixel buffer to the layer.
    fn present(&mut self, pixels: &[u16]) -> Result<()>;

    /// Gives or takes input focus for the overlay process.
    fn request_foreground(&mut self, _enabled: bool) {}
}

/// Headless backend: vsync is immediate and presents are counted.
#[derive(Debug, Default)]
pub struct NullDisplay {
    presented: u64,
    foreground: bool,
}

impl NullDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    pub fn foreground(&self) -> bool {
        self.foreground
    }
}

impl DisplayBackend for NullDisplay {
    fn wait_vsync(&mut self) {}

    fn present(&mut self, _pixels: &[u16]) -> Result<()> {
        self.presented += 1;
        Ok(())
    }

    fn request_foreground(&mut self, enabled: bool) {
        self.foreground = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_display_counts_presents() {
        let mut d = NullDisplay::new();
        let buf = [0u16; 4];
        d.present(&buf).unwrap();
        d.present(&buf).unwrap();
        assert_eq!(d.presented_frames(), 2);

        d.request_foreground(true);
        assert!(d.foreground());
    }
}
