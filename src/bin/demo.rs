//! Demo overlay: two screens driven by a scripted controller on a software
//! surface. Shows the intended host wiring without any host services.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use veil::gfx::{BlockTiledLayout, FontSet, NullDisplay};
use veil::input::poller::{ButtonWatch, InputSource, PollerConfig};
use veil::input::InputSample;
use veil::ui::element::{ElementId, Tree};
use veil::{
    Color, CustomDrawer, DebugRectangle, Frame, InputRig, Keys, LaunchOptions, List, ListItem,
    Overlay, OverlayOptions, Renderer, RendererOptions, Screen, Settings, Theme, ToggleListItem,
};

#[derive(Parser)]
#[command(name = "veil-demo")]
#[command(about = "Scripted demo overlay on a software surface", long_about = None)]
struct Cli {
    /// Settings file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip the launch-combo wait and open immediately
    #[arg(long)]
    skip_combo: bool,
}

struct SecondaryScreen;

impl Screen for SecondaryScreen {
    fn create_ui(&mut self, tree: &mut Tree) -> ElementId {
        let frame = tree.insert(Frame::new("Veil Example", "Secondary screen"));
        let rect = tree.insert(DebugRectangle::new(Color::rgba4(0x8, 0x3, 0x8, 0xF)));
        tree.frame_set_content(frame, rect);
        tree.set_click_listener(frame, |events, keys| {
            if keys.contains(Keys::B) {
                events.go_back();
                return true;
            }
            false
        });
        frame
    }
}

struct MainScreen;

impl Screen for MainScreen {
    fn create_ui(&mut self, tree: &mut Tree) -> ElementId {
        let frame = tree.insert(Frame::new("Veil Example", "v0.1.0"));
        let list = tree.insert(List::default());

        let clickable = tree.insert(ListItem::new("Clickable List Item"));
        tree.set_click_listener(clickable, |events, keys| {
            if keys.contains(Keys::A) {
                events.change_to(SecondaryScreen);
                return true;
            }
            false
        });
        tree.list_add_item(list, clickable, None);

        let plain = tree.insert(ListItem::new("Default List Item"));
        tree.list_add_item(list, plain, None);

        let long = tree.insert(ListItem::new(
            "Default List Item with an extra long name to trigger truncation and scrolling",
        ));
        tree.list_add_item(list, long, None);

        let mut toggle = ToggleListItem::new("Toggle List Item", true);
        toggle.on_state_changed(|state| tracing::info!(state, "toggle flipped"));
        let toggle = tree.insert(toggle);
        tree.list_add_item(list, toggle, None);

        let marker = tree.insert(CustomDrawer::new(|renderer, bounds| {
            let color = renderer.alpha(Color::rgba4(0x3, 0x3, 0x3, 0xF));
            renderer.draw_empty_rect(
                bounds.x as i32,
                bounds.y as i32,
                bounds.width as i32 - 1,
                20,
                color,
            );
        }));
        tree.list_add_item(list, marker, Some(24));

        tree.frame_set_content(frame, list);
        tree.set_click_listener(frame, |events, keys| {
            if keys.contains(Keys::B) {
                events.go_back();
                return true;
            }
            false
        });
        frame
    }
}

/// Replays a canned controller session, then goes idle.
struct ScriptedPad {
    frames: Vec<InputSample>,
    at: usize,
}

impl ScriptedPad {
    fn demo_session(skip_combo: bool) -> Self {
        let mut frames = Vec::new();
        let press = |keys: Keys| InputSample {
            keys_down: keys,
            keys_held: keys,
            ..InputSample::default()
        };
        let idle = |frames: &mut Vec<InputSample>, n: usize| {
            frames.extend(std::iter::repeat_with(InputSample::default).take(n));
        };

        // The poller discards the first sample.
        idle(&mut frames, 1);
        if !skip_combo {
            frames.push(press(Keys::L | Keys::DDOWN | Keys::RSTICK));
        }
        // Let the fade-in finish.
        idle(&mut frames, 20);

        // Walk down to the toggle and flip it.
        for _ in 0..3 {
            frames.push(press(Keys::DDOWN));
            idle(&mut frames, 3);
        }
        frames.push(press(Keys::A));
        idle(&mut frames, 3);

        // Back up to the clickable item and open the secondary screen.
        for _ in 0..3 {
            frames.push(press(Keys::DUP));
            idle(&mut frames, 3);
        }
        frames.push(press(Keys::A));
        idle(&mut frames, 10);

        // Leave the secondary screen, then close the overlay.
        frames.push(press(Keys::B));
        idle(&mut frames, 5);
        frames.push(press(Keys::B));

        Self { frames, at: 0 }
    }
}

impl InputSource for ScriptedPad {
    fn poll(&mut self) -> InputSample {
        let sample = self.frames.get(self.at).copied().unwrap_or_default();
        self.at += 1;
        sample
    }
}

/// Dedicated hardware buttons never fire in the demo.
struct IdleButton;

impl ButtonWatch for IdleButton {
    fn wait_press(&mut self, timeout: Duration) -> bool {
        std::thread::sleep(timeout);
        false
    }
}

fn main() -> Result<()> {
    // The overlay owns the screen, so logs go to a file
    // (use RUST_LOG to control the level).
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("veil-demo.log")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(veil::config::default_settings_path);
    let settings = Settings::load(&settings_path);
    let theme = Theme::from_settings(&settings);

    let renderer = Renderer::new(
        Box::new(NullDisplay::new()),
        Box::new(BlockTiledLayout::new(veil::style::FRAMEBUFFER_WIDTH as u32)),
        FontSet::builtin(),
        RendererOptions::default(),
    )?;

    let rig = InputRig {
        source: Box::new(ScriptedPad::demo_session(cli.skip_combo)),
        home: Box::new(IdleButton),
        power: Box::new(IdleButton),
        config: PollerConfig {
            settings_path,
            ..PollerConfig::default()
        },
    };

    let mut overlay = Overlay::new(renderer, theme, OverlayOptions { close_on_exit: true });
    overlay.run(
        rig,
        MainScreen,
        LaunchOptions {
            skip_combo: cli.skip_combo,
        },
    )?;

    println!("overlay session ended");
    Ok(())
}
