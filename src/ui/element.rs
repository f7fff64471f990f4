//! The widget tree.
//!
//! Widgets live in an arena owned by their [`Gui`](super::gui::Gui); an
//! [`ElementId`] addresses one node. Containers own their children
//! exclusively (replacing or clearing a child drops its whole subtree) and
//! the parent link is a non-owning id used only for layout propagation and
//! click bubbling.
//!
//! Geometry is only valid after `layout` has run, which happens through
//! [`Tree::invalidate`] whenever the structure changes.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::Theme;
use crate::gfx::{Color, Renderer};
use crate::input::Keys;
use crate::style;

use super::gui::UiEvents;
use super::widgets::{self, Widget};

/// Direction in which focus moved before landing on the currently focused
/// element. `None` means the focus was placed programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    None,
    Up,
    Down,
    Left,
    Right,
}

/// Resolved geometry of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u32);

/// Closure invoked when a button press reaches an element. Returning `false`
/// passes the press on to the parent chain.
pub type ClickListener = Box<dyn FnMut(&mut UiEvents, Keys) -> bool>;

/// How long a shake nudge plays before it clears.
const SHAKE_DURATION: Duration = Duration::from_millis(100);

pub(crate) struct Shake {
    pub(crate) direction: FocusDirection,
    pub(crate) amplitude: i32,
    pub(crate) started: Instant,
}

pub(crate) struct Node {
    pub(crate) widget: Widget,
    pub(crate) bounds: Bounds,
    pub(crate) parent: Option<ElementId>,
    pub(crate) focused: bool,
    pub(crate) shake: Option<Shake>,
    pub(crate) click_listener: Option<ClickListener>,
}

/// One screen's widget arena.
pub struct Tree {
    nodes: Vec<Option<Node>>,
    surface: (u16, u16),
    theme: Theme,
    epoch: Instant,
}

impl Tree {
    pub fn new(surface: (u16, u16), theme: Theme) -> Self {
        Self {
            nodes: Vec::new(),
            surface,
            theme,
            epoch: Instant::now(),
        }
    }

    /// Inserts a widget without attaching it anywhere. Containers attach it
    /// via [`Tree::frame_set_content`] or [`Tree::list_add_item`].
    pub fn insert(&mut self, widget: impl Into<Widget>) -> ElementId {
        self.nodes.push(Some(Node {
            widget: widget.into(),
            bounds: Bounds::default(),
            parent: None,
            focused: false,
            shake: None,
            click_listener: None,
        }));
        ElementId(self.nodes.len() as u32 - 1)
    }

    pub(crate) fn get(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn widget(&self, id: ElementId) -> Option<&Widget> {
        self.get(id).map(|n| &n.widget)
    }

    pub fn widget_mut(&mut self, id: ElementId) -> Option<&mut Widget> {
        self.get_mut(id).map(|n| &mut n.widget)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub(crate) fn set_parent(&mut self, id: ElementId, parent: Option<ElementId>) {
        if let Some(node) = self.get_mut(id) {
            node.parent = parent;
        }
    }

    pub fn bounds(&self, id: ElementId) -> Bounds {
        self.get(id).map(|n| n.bounds).unwrap_or_default()
    }

    pub(crate) fn set_bounds(&mut self, id: ElementId, bounds: Bounds) {
        if let Some(node) = self.get_mut(id) {
            node.bounds = bounds;
        }
    }

    pub fn surface(&self) -> (u16, u16) {
        self.surface
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn is_focused(&self, id: ElementId) -> bool {
        self.get(id).map(|n| n.focused).unwrap_or(false)
    }

    pub(crate) fn set_focused(&mut self, id: ElementId, focused: bool) {
        if let Some(node) = self.get_mut(id) {
            node.focused = focused;
        }
    }

    /// Attaches a click listener called with the keys pressed last frame.
    pub fn set_click_listener(
        &mut self,
        id: ElementId,
        listener: impl FnMut(&mut UiEvents, Keys) -> bool + 'static,
    ) {
        if let Some(node) = self.get_mut(id) {
            node.click_listener = Some(Box::new(listener));
        }
    }

    // Structure

    /// Sets a frame's single content child, dropping any previous subtree.
    pub fn frame_set_content(&mut self, frame: ElementId, child: ElementId) {
        if !matches!(self.widget(frame), Some(Widget::Frame(_))) {
            self.remove_subtree(child);
            return;
        }

        let old = match self.widget_mut(frame) {
            Some(Widget::Frame(f)) => std::mem::replace(&mut f.content, Some(child)),
            _ => None,
        };
        if let Some(old) = old {
            self.remove_subtree(old);
        }
        self.set_parent(child, Some(frame));
        self.invalidate(frame);
    }

    /// Appends an entry to a list. Without an explicit height, plain and
    /// toggle list items get the standard row height; anything else is
    /// dropped.
    pub fn list_add_item(&mut self, list: ElementId, child: ElementId, height: Option<u16>) {
        if !matches!(self.widget(list), Some(Widget::List(_))) {
            self.remove_subtree(child);
            return;
        }

        let mut height = height.unwrap_or(0);
        if height == 0 {
            if let Some(Widget::ListItem(_) | Widget::Toggle(_)) = self.widget(child) {
                height = style::LIST_ITEM_HEIGHT;
            }
        }
        if height == 0 {
            tracing::warn!("list entry without a usable height dropped");
            self.remove_subtree(child);
            return;
        }

        if let Some(Widget::List(l)) = self.widget_mut(list) {
            l.push_entry(child, height);
        }
        self.set_parent(child, Some(list));
        self.invalidate(list);
    }

    /// Removes every entry of a list, dropping the entry subtrees.
    pub fn list_clear(&mut self, list: ElementId) {
        let entries = match self.widget_mut(list) {
            Some(Widget::List(l)) => l.take_entries(),
            _ => return,
        };
        for entry in entries {
            self.remove_subtree(entry);
        }
    }

    pub(crate) fn list_scroll(&mut self, list: ElementId, delta: i32) {
        if let Some(Widget::List(l)) = self.widget_mut(list) {
            if delta < 0 {
                l.offset = l.offset.saturating_sub(1);
            } else {
                l.offset += 1;
            }
        }
        self.invalidate(list);
    }

    /// Drops an element and its whole subtree.
    pub fn remove_subtree(&mut self, id: ElementId) {
        let children: Vec<ElementId> = match self.widget(id) {
            Some(Widget::Frame(f)) => f.content.into_iter().collect(),
            Some(Widget::List(l)) => l.entry_ids(),
            _ => Vec::new(),
        };
        for child in children {
            self.remove_subtree(child);
        }
        if let Some(slot) = self.nodes.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    // Layout

    /// Recomputes this element's boundaries from its parent's current
    /// bounds, or from the surface when it has no parent.
    pub fn invalidate(&mut self, id: ElementId) {
        let parent_bounds = match self.parent(id) {
            Some(parent) => self.bounds(parent),
            None => Bounds {
                x: 0,
                y: 0,
                width: self.surface.0,
                height: self.surface.1,
            },
        };
        self.layout(id, parent_bounds);
    }

    pub(crate) fn layout(&mut self, id: ElementId, parent: Bounds) {
        widgets::layout(self, id, parent);
    }

    // Drawing

    /// Draws the tree rooted at `id`. The root itself never draws a
    /// highlight; descendants draw theirs via [`Tree::draw_child`].
    pub fn render(&mut self, id: ElementId, renderer: &mut Renderer) {
        widgets::draw(self, id, renderer);
    }

    /// Draws one child element, highlight first when it holds focus.
    pub(crate) fn draw_child(&mut self, id: ElementId, renderer: &mut Renderer) {
        if self.is_focused(id) {
            self.draw_highlight(id, renderer);
        }
        widgets::draw(self, id, renderer);
    }

    // Focus

    /// Asks the element (or a descendant) to claim focus; returns the
    /// element that should receive it, if any.
    pub fn request_focus(
        &mut self,
        id: ElementId,
        old: Option<ElementId>,
        direction: FocusDirection,
    ) -> Option<ElementId> {
        widgets::request_focus(self, id, old, direction)
    }

    /// Offers a press to the element. Toggles consume their confirm key;
    /// everything else falls through to the click listener.
    pub fn on_click(&mut self, id: ElementId, events: &mut UiEvents, keys: Keys) -> bool {
        let Some(node) = self.get_mut(id) else {
            return false;
        };

        if let Widget::Toggle(toggle) = &mut node.widget {
            if keys.contains(Keys::A) {
                let state = !toggle.state();
                toggle.set_state(state);
                toggle.notify_state_changed(state);
                return true;
            }
            return false;
        }

        match node.click_listener.as_mut() {
            Some(listener) => listener(events, keys),
            None => false,
        }
    }

    /// Starts a shake nudge signaling that focus could not move in the
    /// given direction.
    pub fn shake(&mut self, id: ElementId, direction: FocusDirection) {
        let amplitude = rand::thread_rng().gen_range(5..=9);
        if let Some(node) = self.get_mut(id) {
            node.shake = Some(Shake {
                direction,
                amplitude,
                started: Instant::now(),
            });
        }
    }

    /// Animated focus border: color oscillates between the two theme
    /// highlight colors over a one second sine period; an active shake
    /// offsets the border along its axis.
    fn draw_highlight(&mut self, id: ElementId, renderer: &mut Renderer) {
        let secs = self.epoch.elapsed().as_secs_f32();
        let progress = ((secs * std::f32::consts::TAU).sin() + 1.0) / 2.0;

        let c1 = self.theme.highlight_color_1;
        let c2 = self.theme.highlight_color_2;
        let lerp = |a: u8, b: u8| ((a as f32 - b as f32) * progress + b as f32) as u8;
        let highlight = Color::rgba4(
            lerp(c1.r(), c2.r()),
            lerp(c1.g(), c2.g()),
            lerp(c1.b(), c2.b()),
            0xF,
        );

        let (mut dx, mut dy) = (0i32, 0i32);
        let mut clear_shake = false;
        if let Some(node) = self.get(id) {
            if let Some(shake) = &node.shake {
                let elapsed = shake.started.elapsed();
                if elapsed >= SHAKE_DURATION {
                    clear_shake = true;
                } else {
                    let offset = shake_animation(elapsed, shake.amplitude as f32);
                    match shake.direction {
                        FocusDirection::Up => dy -= offset,
                        FocusDirection::Down => dy += offset,
                        FocusDirection::Left => dx -= offset,
                        FocusDirection::Right => dx += offset,
                        FocusDirection::None => {}
                    }
                    dx = dx.clamp(-shake.amplitude, shake.amplitude);
                    dy = dy.clamp(-shake.amplitude, shake.amplitude);
                }
            }
        }
        if clear_shake {
            if let Some(node) = self.get_mut(id) {
                node.shake = None;
            }
        }

        let b = self.bounds(id);
        let (x, y) = (b.x as i32, b.y as i32);
        let (w, h) = (b.width as i32, b.height as i32);

        let backing = renderer.alpha(Color::rgba4(0, 0, 0, 0xF));
        renderer.draw_rect(x, y, w, h, backing);

        let hl = renderer.alpha(highlight);
        renderer.draw_rect(x + dx - 4, y + dy - 4, w + 8, 4, hl);
        renderer.draw_rect(x + dx - 4, y + dy + h, w + 8, 4, hl);
        renderer.draw_rect(x + dx - 4, y + dy, 4, h, hl);
        renderer.draw_rect(x + dx + w, y + dy, 4, h, hl);
    }
}

/// Damped-sine shake displacement for `elapsed` time into the nudge. The
/// magnitude never exceeds `amplitude` and decays as time approaches the
/// shake duration.
pub fn shake_animation(elapsed: Duration, amplitude: f32) -> i32 {
    const DECAY: f32 = 0.05;
    const OMEGA: f32 = 0.2;

    let t = elapsed.as_millis() as f32;
    (amplitude * (-DECAY * t).exp() * (OMEGA * t).sin()).round() as i32
}
