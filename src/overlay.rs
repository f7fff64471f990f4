//! The overlay: screen stack, fade lifecycle and the frame/input loop.
//!
//! One `Overlay` exists per session and owns everything the frame loop
//! touches: the renderer, the theme and the Gui stack. Input arrives from
//! the background pollers through a [`SharedInput`] snapshot taken once per
//! frame.
//!
//! Visibility follows `Hidden -> fade-in -> steady -> fade-out -> Hidden`,
//! driven by a 0..=5 animation counter whose value scales the renderer
//! opacity; orthogonally the overlay transitions to closing when the Gui
//! stack empties.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::Theme;
use crate::gfx::Renderer;
use crate::input::{poller, InputFrame, InputRig, SharedInput};
use crate::ui::gui::{Gui, Screen, UiAction, UiEvents};

/// Fully visible value of the fade counter.
const FADE_STEPS: u8 = 5;

/// Per-session behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayOptions {
    /// Close the overlay when the last Gui is popped instead of hiding.
    pub close_on_exit: bool,
}

/// Launch-time switches, derived from the process arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchOptions {
    /// Skip the initial combo wait and open immediately (used when another
    /// overlay hands control over). Also suppresses the first fade.
    pub skip_combo: bool,
}

pub struct Overlay {
    renderer: Renderer,
    theme: Theme,
    stack: Vec<Gui>,
    animation_counter: u8,
    fade_in_playing: bool,
    fade_out_playing: bool,
    should_hide: bool,
    should_close: bool,
    disable_next_animation: bool,
    close_on_exit: bool,
}

impl Overlay {
    pub fn new(renderer: Renderer, theme: Theme, options: OverlayOptions) -> Self {
        Self {
            renderer,
            theme,
            stack: Vec::new(),
            animation_counter: 0,
            fade_in_playing: false,
            fade_out_playing: false,
            should_hide: false,
            should_close: false,
            disable_next_animation: false,
            close_on_exit: options.close_on_exit,
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn current_gui(&self) -> Option<&Gui> {
        self.stack.last()
    }

    pub fn current_gui_mut(&mut self) -> Option<&mut Gui> {
        self.stack.last_mut()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn should_hide(&self) -> bool {
        self.should_hide
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }

    pub fn fade_animation_playing(&self) -> bool {
        self.fade_in_playing || self.fade_out_playing
    }

    /// Suppresses the next show/hide fade (one-shot).
    pub fn disable_next_animation(&mut self) {
        self.disable_next_animation = true;
    }

    /// Arms the fade-in, or jumps straight to visible when the next
    /// animation was suppressed.
    pub fn show(&mut self) {
        if self.disable_next_animation {
            self.animation_counter = FADE_STEPS;
            self.disable_next_animation = false;
        } else {
            self.fade_in_playing = true;
            self.animation_counter = 0;
        }
    }

    /// Arms the fade-out, or hides immediately when the next animation was
    /// suppressed.
    pub fn hide(&mut self) {
        if self.disable_next_animation {
            self.animation_counter = 0;
            self.disable_next_animation = false;
            self.should_hide = true;
        } else {
            self.fade_out_playing = true;
            self.animation_counter = FADE_STEPS;
        }
    }

    /// Requests shutdown; the run loop observes it at the next iteration.
    pub fn close(&mut self) {
        self.should_close = true;
    }

    /// Constructs the screen's widget tree, assigns initial focus and pushes
    /// it onto the stack.
    pub fn change_to(&mut self, screen: impl Screen + 'static) {
        self.change_to_boxed(Box::new(screen));
    }

    fn change_to_boxed(&mut self, screen: Box<dyn Screen>) {
        let gui = Gui::new(screen, self.renderer.dimensions(), self.theme);
        self.stack.push(gui);
        tracing::debug!(depth = self.stack.len(), "screen pushed");
    }

    /// Pops the current screen. An overlay configured to persist hides
    /// instead of popping its last screen; otherwise an empty stack closes
    /// the overlay.
    pub fn go_back(&mut self) {
        if !self.close_on_exit && self.stack.len() == 1 {
            self.hide();
            return;
        }

        self.stack.pop();
        if self.stack.is_empty() {
            self.close();
        }
    }

    /// Advances the fade by one step and pushes the resulting opacity into
    /// the renderer.
    fn animation_loop(&mut self) {
        if self.fade_in_playing {
            self.animation_counter += 1;
            if self.animation_counter >= FADE_STEPS {
                self.animation_counter = FADE_STEPS;
                self.fade_in_playing = false;
            }
        }

        if self.fade_out_playing {
            self.animation_counter = self.animation_counter.saturating_sub(1);
            if self.animation_counter == 0 {
                self.fade_out_playing = false;
                self.should_hide = true;
            }
        }

        self.renderer.set_opacity(0.2 * self.animation_counter as f32);
    }

    /// One render iteration: animation, screen update, draw, present.
    pub fn frame(&mut self) {
        self.renderer.start_frame();
        self.animation_loop();
        if let Some(gui) = self.stack.last_mut() {
            gui.update();
            gui.draw(&mut self.renderer);
        }
        self.renderer.end_frame();
    }

    /// Dispatches one frame's input into the current Gui, then applies the
    /// navigation actions its listeners queued.
    pub fn handle_input(&mut self, input: &InputFrame) {
        let mut events = UiEvents::new();
        if let Some(gui) = self.stack.last_mut() {
            gui.dispatch_input(&mut events, input);
        }

        for action in events.take() {
            match action {
                UiAction::ChangeTo(screen) => self.change_to_boxed(screen),
                UiAction::GoBack => self.go_back(),
                UiAction::Hide => self.hide(),
                UiAction::Close => self.close(),
            }
        }
    }

    /// Presents one blank frame.
    pub fn clear_screen(&mut self) {
        self.renderer.start_frame();
        self.renderer.clear_screen();
        self.renderer.end_frame();
    }

    fn reset_flags(&mut self) {
        self.should_hide = false;
        self.should_close = false;
    }

    /// The host loop: spawns the input pollers, then alternates between
    /// waiting for the launch combo and running the visible frame loop until
    /// the overlay closes. Fatal startup failures propagate; everything
    /// after startup degrades silently.
    pub fn run(
        &mut self,
        rig: InputRig,
        initial: impl Screen + 'static,
        launch: LaunchOptions,
    ) -> Result<()> {
        let shared = Arc::new(SharedInput::new());
        let handles = poller::spawn(shared.clone(), rig)?;

        self.change_to(initial);

        if launch.skip_combo {
            shared.fire_combo();
            self.disable_next_animation();
        }

        while shared.running() {
            if !shared.wait_combo(Duration::from_millis(100)) {
                continue;
            }
            shared.clear_combo();
            shared.set_overlay_open(true);

            self.renderer.request_foreground(true);
            self.show();
            self.clear_screen();
            tracing::debug!("overlay visible");

            while shared.running() {
                self.frame();

                let input = shared.take_frame_input();
                if shared.take_hide_request() {
                    self.hide();
                }
                if !self.fade_animation_playing() {
                    self.handle_input(&input);
                }

                if self.should_hide {
                    break;
                }
                if self.should_close {
                    shared.stop();
                }
            }

            self.clear_screen();
            self.reset_flags();
            self.renderer.request_foreground(false);
            shared.set_overlay_open(false);
            shared.clear_combo();
            tracing::debug!("overlay hidden");
        }

        for handle in handles {
            let _ = handle.join();
        }
        Ok(())
    }
}
