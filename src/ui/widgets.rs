//! The closed widget set.
//!
//! Widget kinds are fixed, so they dispatch through one tagged enum instead
//! of an open trait hierarchy. The free functions at the bottom implement
//! draw, layout and focus resolution for every kind against the owning
//! [`Tree`].

use crate::gfx::{Color, Renderer};
use crate::style;

use super::element::{Bounds, ElementId, FocusDirection, Tree};

/// Footer hint line drawn by a frame (icon face glyphs + labels).
const FOOTER_HINTS: &str = "\u{E0E1}  Back     \u{E0E0}  OK";

/// Separator rule above a list item row.
const SEPARATOR_TOP: Color = Color::rgba4(0x4, 0x4, 0x4, 0xF);
/// Separator rule below a list item row.
const SEPARATOR_BOTTOM: Color = Color::rgba4(0x0, 0x0, 0x0, 0xD);
/// Value text when drawn faint.
const VALUE_FAINT: Color = Color::rgba4(0x6, 0x6, 0x6, 0xF);
/// Value text in the accent color.
const VALUE_ACCENT: Color = Color::rgba4(0x5, 0xC, 0xA, 0xF);

/// A node's widget variant.
pub enum Widget {
    Frame(Frame),
    DebugRect(DebugRectangle),
    List(List),
    ListItem(ListItem),
    Toggle(ToggleListItem),
    Custom(CustomDrawer),
}

/// Top-level screen container: header, optional footer, one content child.
pub struct Frame {
    pub(crate) title: String,
    pub(crate) subtitle: String,
    pub(crate) content: Option<ElementId>,
    pub(crate) show_separator: bool,
    pub(crate) show_footer_hints: bool,
    pub(crate) background_alpha: u8,
}

impl Frame {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            content: None,
            show_separator: true,
            show_footer_hints: true,
            background_alpha: 0xD,
        }
    }

    pub fn with_separator(mut self, show: bool) -> Self {
        self.show_separator = show;
        self
    }

    pub fn with_footer_hints(mut self, show: bool) -> Self {
        self.show_footer_hints = show;
        self
    }
}

/// Single-color rectangle, mainly for visualizing boundaries.
pub struct DebugRectangle {
    pub(crate) color: Color,
}

impl DebugRectangle {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

pub(crate) struct ListEntry {
    pub(crate) element: ElementId,
    pub(crate) height: u16,
}

/// Scrollable, virtualized container of fixed-height entries. Only entries
/// inside `[offset, offset + entries_shown)` are laid out and drawn; the
/// rest keep whatever geometry they last had.
pub struct List {
    pub(crate) entries: Vec<ListEntry>,
    pub(crate) offset: usize,
    pub(crate) entries_shown: usize,
}

impl List {
    pub fn new(entries_shown: usize) -> Self {
        Self {
            entries: Vec::new(),
            offset: 0,
            entries_shown,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn entries_shown(&self) -> usize {
        self.entries_shown
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push_entry(&mut self, element: ElementId, height: u16) {
        self.entries.push(ListEntry { element, height });
    }

    pub(crate) fn take_entries(&mut self) -> Vec<ElementId> {
        self.offset = 0;
        self.entries.drain(..).map(|e| e.element).collect()
    }

    pub(crate) fn entry_ids(&self) -> Vec<ElementId> {
        self.entries.iter().map(|e| e.element).collect()
    }

    pub(crate) fn visible_entries(&self) -> Vec<ElementId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i >= self.offset && *i < self.offset + self.entries_shown)
            .map(|(_, e)| e.element)
            .collect()
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new(style::LIST_ENTRIES_SHOWN)
    }
}

/// Left-aligned label with a right-aligned value string.
pub struct ListItem {
    pub(crate) text: String,
    pub(crate) value: String,
    pub(crate) faint: bool,
    pub(crate) value_width: Option<u32>,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: String::new(),
            faint: false,
            value_width: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Sets the right-hand value. `faint` draws it gray instead of the
    /// accent color. The cached measurement is invalidated.
    pub fn set_value(&mut self, value: impl Into<String>, faint: bool) {
        self.value = value.into();
        self.faint = faint;
        self.value_width = None;
    }
}

/// List item that flips between two states on the confirm button.
pub struct ToggleListItem {
    pub(crate) item: ListItem,
    state: bool,
    on_value: String,
    off_value: String,
    on_change: Option<Box<dyn FnMut(bool)>>,
}

impl ToggleListItem {
    pub fn new(text: impl Into<String>, initial_state: bool) -> Self {
        Self::with_values(text, initial_state, "On", "Off")
    }

    pub fn with_values(
        text: impl Into<String>,
        initial_state: bool,
        on_value: impl Into<String>,
        off_value: impl Into<String>,
    ) -> Self {
        let mut toggle = Self {
            item: ListItem::new(text),
            state: initial_state,
            on_value: on_value.into(),
            off_value: off_value.into(),
            on_change: None,
        };
        toggle.set_state(initial_state);
        toggle
    }

    pub fn state(&self) -> bool {
        self.state
    }

    /// Sets the state and updates the displayed value.
    pub fn set_state(&mut self, state: bool) {
        self.state = state;
        if state {
            let value = self.on_value.clone();
            self.item.set_value(value, false);
        } else {
            let value = self.off_value.clone();
            self.item.set_value(value, true);
        }
    }

    /// Registers a callback fired whenever the confirm button flips the
    /// state.
    pub fn on_state_changed(&mut self, listener: impl FnMut(bool) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub(crate) fn notify_state_changed(&mut self, state: bool) {
        if let Some(listener) = self.on_change.as_mut() {
            listener(state);
        }
    }
}

/// Callback invoked once per frame with the renderer and the element's
/// resolved bounds.
pub type DrawFn = Box<dyn FnMut(&mut Renderer, Bounds)>;

/// Escape hatch handing the renderer to a caller-supplied closure. Never
/// focusable; draws static content only.
pub struct CustomDrawer {
    pub(crate) render: DrawFn,
}

impl CustomDrawer {
    pub fn new(render: impl FnMut(&mut Renderer, Bounds) + 'static) -> Self {
        Self {
            render: Box::new(render),
        }
    }
}

impl From<Frame> for Widget {
    fn from(w: Frame) -> Widget {
        Widget::Frame(w)
    }
}
impl From<DebugRectangle> for Widget {
    fn from(w: DebugRectangle) -> Widget {
        Widget::DebugRect(w)
    }
}
impl From<List> for Widget {
    fn from(w: List) -> Widget {
        Widget::List(w)
    }
}
impl From<ListItem> for Widget {
    fn from(w: ListItem) -> Widget {
        Widget::ListItem(w)
    }
}
impl From<ToggleListItem> for Widget {
    fn from(w: ToggleListItem) -> Widget {
        Widget::Toggle(w)
    }
}
impl From<CustomDrawer> for Widget {
    fn from(w: CustomDrawer) -> Widget {
        Widget::Custom(w)
    }
}

// Dispatch

enum Kind {
    Frame,
    DebugRect,
    List,
    Item,
    Custom,
}

fn kind_of(tree: &Tree, id: ElementId) -> Option<Kind> {
    Some(match tree.widget(id)? {
        Widget::Frame(_) => Kind::Frame,
        Widget::DebugRect(_) => Kind::DebugRect,
        Widget::List(_) => Kind::List,
        Widget::ListItem(_) | Widget::Toggle(_) => Kind::Item,
        Widget::Custom(_) => Kind::Custom,
    })
}

pub(crate) fn draw(tree: &mut Tree, id: ElementId, renderer: &mut Renderer) {
    match kind_of(tree, id) {
        Some(Kind::Frame) => draw_frame(tree, id, renderer),
        Some(Kind::DebugRect) => draw_debug_rect(tree, id, renderer),
        Some(Kind::List) => draw_list(tree, id, renderer),
        Some(Kind::Item) => draw_list_item(tree, id, renderer),
        Some(Kind::Custom) => draw_custom(tree, id, renderer),
        None => {}
    }
}

pub(crate) fn layout(tree: &mut Tree, id: ElementId, parent: Bounds) {
    match kind_of(tree, id) {
        Some(Kind::Frame) => layout_frame(tree, id, parent),
        Some(Kind::List) => layout_list(tree, id),
        // Leaves keep the bounds their container assigned.
        _ => {}
    }
}

pub(crate) fn request_focus(
    tree: &mut Tree,
    id: ElementId,
    old: Option<ElementId>,
    direction: FocusDirection,
) -> Option<ElementId> {
    enum Plan {
        Delegate(Option<ElementId>),
        List,
        Claim,
        Decline,
    }

    let plan = match tree.widget(id)? {
        Widget::Frame(f) => Plan::Delegate(f.content),
        Widget::List(_) => Plan::List,
        Widget::ListItem(_) | Widget::Toggle(_) => Plan::Claim,
        Widget::DebugRect(_) | Widget::Custom(_) => Plan::Decline,
    };

    match plan {
        Plan::Delegate(Some(child)) => request_focus(tree, child, old, direction),
        Plan::Delegate(None) => None,
        Plan::List => list_request_focus(tree, id, old, direction),
        Plan::Claim => Some(id),
        Plan::Decline => None,
    }
}

// Frame

fn draw_frame(tree: &mut Tree, id: ElementId, renderer: &mut Renderer) {
    let b = tree.bounds(id);
    let text_color = tree.theme().text_color;
    let (x, y) = (b.x as i32, b.y as i32);

    let content = {
        let Some(Widget::Frame(frame)) = tree.widget(id) else {
            return;
        };

        let background = renderer.alpha(Color::rgba4(0, 0, 0, frame.background_alpha));
        renderer.fill_screen(background);

        let tc = renderer.alpha(text_color);
        renderer.draw_string(&frame.title, false, x + 20, y + 50, 30.0, tc);
        renderer.draw_string(&frame.subtitle, false, x + 20, y + 70, 15.0, tc);

        if frame.show_separator {
            renderer.draw_rect(x + 15, y + b.height as i32 - 73, b.width as i32 - 30, 1, tc);
        }
        if frame.show_footer_hints {
            renderer.draw_string(FOOTER_HINTS, false, x + 30, y + b.height as i32 - 27, 23.0, tc);
        }

        frame.content
    };

    if let Some(child) = content {
        tree.draw_child(child, renderer);
    }
}

fn layout_frame(tree: &mut Tree, id: ElementId, parent: Bounds) {
    tree.set_bounds(id, parent);

    let content = match tree.widget(id) {
        Some(Widget::Frame(f)) => f.content,
        _ => None,
    };
    if let Some(child) = content {
        tree.set_bounds(
            child,
            Bounds {
                x: parent.x + 35,
                y: parent.y + 140,
                width: parent.width.saturating_sub(85),
                height: parent.height.saturating_sub(178),
            },
        );
        tree.layout(child, parent);
    }
}

// DebugRectangle

fn draw_debug_rect(tree: &mut Tree, id: ElementId, renderer: &mut Renderer) {
    let b = tree.bounds(id);
    let Some(Widget::DebugRect(rect)) = tree.widget(id) else {
        return;
    };
    let color = renderer.alpha(rect.color);
    renderer.draw_rect(b.x as i32, b.y as i32, b.width as i32, b.height as i32, color);
}

// List

fn draw_list(tree: &mut Tree, id: ElementId, renderer: &mut Renderer) {
    let visible = match tree.widget(id) {
        Some(Widget::List(list)) => list.visible_entries(),
        _ => return,
    };
    for child in visible {
        tree.draw_child(child, renderer);
    }
}

fn layout_list(tree: &mut Tree, id: ElementId) {
    let b = tree.bounds(id);
    let (snapshot, offset, shown) = match tree.widget(id) {
        Some(Widget::List(list)) => (
            list.entries
                .iter()
                .map(|e| (e.element, e.height))
                .collect::<Vec<_>>(),
            list.offset,
            list.entries_shown,
        ),
        _ => return,
    };

    let mut y = b.y;
    for (i, (child, height)) in snapshot.into_iter().enumerate() {
        if i >= offset && i < offset + shown {
            tree.set_bounds(
                child,
                Bounds {
                    x: b.x,
                    y,
                    width: b.width,
                    height,
                },
            );
            tree.layout(child, b);
            y = y.saturating_add(height);
        }
    }
}

/// The directional focus transfer inside a list, including the peek-ahead
/// scroll: moving onto the window's edge row nudges `offset` by one so the
/// row beyond stays visible.
///
/// The scroll probes compare the old focus against the entries at
/// `offset + 1` (up) and `offset + entries_shown - 2` (down); for
/// `entries_shown <= 2` those indices alias or fall outside the window and
/// are evaluated with checked arithmetic so the probe simply never matches.
fn list_request_focus(
    tree: &mut Tree,
    id: ElementId,
    old: Option<ElementId>,
    direction: FocusDirection,
) -> Option<ElementId> {
    let (entries, offset, shown) = match tree.widget(id) {
        Some(Widget::List(list)) => (list.entry_ids(), list.offset, list.entries_shown),
        _ => return None,
    };

    if entries.is_empty() {
        return None;
    }

    let old_index = old.and_then(|o| entries.iter().position(|&e| e == o));
    let (Some(index), true) = (old_index, direction != FocusDirection::None) else {
        return Some(entries[0]);
    };

    match direction {
        FocusDirection::Up => {
            if index == 0 {
                return Some(entries[0]);
            }
            // Old focus on the second visible row with rows hidden above:
            // scroll up before handing focus to the previous entry.
            let probe = offset.checked_add(1).and_then(|i| entries.get(i)).copied();
            if probe == old && offset > 0 {
                tree.list_scroll(id, -1);
            }
            Some(entries[index - 1])
        }
        FocusDirection::Down => {
            if index == entries.len() - 1 {
                return Some(entries[entries.len() - 1]);
            }
            // Old focus on the second-to-last visible row with entries
            // hidden below: scroll down before handing focus on.
            let probe = (offset + shown)
                .checked_sub(2)
                .and_then(|i| entries.get(i))
                .copied();
            if probe == old && entries.len() > offset + shown {
                tree.list_scroll(id, 1);
            }
            Some(entries[index + 1])
        }
        _ => Some(entries[index]),
    }
}

// ListItem / ToggleListItem

fn draw_list_item(tree: &mut Tree, id: ElementId, renderer: &mut Renderer) {
    let b = tree.bounds(id);
    let text_color = tree.theme().text_color;

    let Some(widget) = tree.widget_mut(id) else {
        return;
    };
    let item = match widget {
        Widget::ListItem(item) => item,
        Widget::Toggle(toggle) => &mut toggle.item,
        _ => return,
    };

    if item.value_width.is_none() {
        // Transparent draw measures without touching pixels.
        let (width, _) = renderer.draw_string(&item.value, false, 0, 0, 20.0, Color::TRANSPARENT);
        item.value_width = Some(width);
    }
    let value_width = item.value_width.unwrap_or(0);

    let (x, y) = (b.x as i32, b.y as i32);

    let top = renderer.alpha(SEPARATOR_TOP);
    renderer.draw_rect(x, y, b.width as i32, 1, top);
    let bottom = renderer.alpha(SEPARATOR_BOTTOM);
    renderer.draw_rect(x, y + b.height as i32, b.width as i32, 1, bottom);

    let tc = renderer.alpha(text_color);
    renderer.draw_string(&item.text, false, x + 20, y + 45, 23.0, tc);

    let value_color = renderer.alpha(if item.faint { VALUE_FAINT } else { VALUE_ACCENT });
    renderer.draw_string(
        &item.value,
        false,
        x + b.width as i32 - value_width as i32 - 20,
        y + 45,
        20.0,
        value_color,
    );
}

// CustomDrawer

fn draw_custom(tree: &mut Tree, id: ElementId, renderer: &mut Renderer) {
    let b = tree.bounds(id);
    if let Some(Widget::Custom(custom)) = tree.widget_mut(id) {
        (custom.render)(renderer, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::ui::element::Tree;

    fn list_fixture(items: usize, shown: usize) -> (Tree, ElementId, Vec<ElementId>) {
        let mut tree = Tree::new((448, 720), Theme::default());
        let list = tree.insert(List::new(shown));
        let ids: Vec<ElementId> = (0..items)
            .map(|i| {
                let id = tree.insert(ListItem::new(format!("item {i}")));
                tree.list_add_item(list, id, None);
                id
            })
            .collect();
        (tree, list, ids)
    }

    fn offset_of(tree: &Tree, list: ElementId) -> usize {
        match tree.widget(list) {
            Some(Widget::List(l)) => l.offset(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_initial_focus_is_first_entry() {
        let (mut tree, list, ids) = list_fixture(10, 6);
        assert_eq!(tree.request_focus(list, None, FocusDirection::None), Some(ids[0]));
    }

    #[test]
    fn test_unknown_old_focus_lands_on_first_entry() {
        let (mut tree, list, ids) = list_fixture(4, 6);
        let stranger = tree.insert(ListItem::new("elsewhere"));
        assert_eq!(
            tree.request_focus(list, Some(stranger), FocusDirection::Down),
            Some(ids[0])
        );
    }

    #[test]
    fn test_empty_list_declines_focus() {
        let mut tree = Tree::new((448, 720), Theme::default());
        let list = tree.insert(List::default());
        assert_eq!(tree.request_focus(list, None, FocusDirection::None), None);
    }

    #[test]
    fn test_horizontal_directions_keep_focus() {
        let (mut tree, list, ids) = list_fixture(5, 6);
        assert_eq!(
            tree.request_focus(list, Some(ids[2]), FocusDirection::Left),
            Some(ids[2])
        );
        assert_eq!(
            tree.request_focus(list, Some(ids[2]), FocusDirection::Right),
            Some(ids[2])
        );
        assert_eq!(offset_of(&tree, list), 0);
    }

    #[test]
    fn test_full_walk_down_then_up() {
        let (mut tree, list, ids) = list_fixture(10, 6);

        let mut focus = ids[0];
        for _ in 0..9 {
            focus = tree
                .request_focus(list, Some(focus), FocusDirection::Down)
                .unwrap();
        }
        assert_eq!(focus, ids[9]);
        assert_eq!(offset_of(&tree, list), 4); // max(0, 10 - 6)

        for _ in 0..9 {
            focus = tree
                .request_focus(list, Some(focus), FocusDirection::Up)
                .unwrap();
        }
        assert_eq!(focus, ids[0]);
        assert_eq!(offset_of(&tree, list), 0);
    }

    #[test]
    fn test_peek_ahead_scroll_points() {
        // 10 items, 6 visible. Walking down, the window starts moving when
        // focus leaves the second-to-last visible row, keeping one row of
        // look-ahead visible.
        let (mut tree, list, ids) = list_fixture(10, 6);

        let mut focus = ids[0];
        let mut offsets = Vec::new();
        for _ in 0..7 {
            focus = tree
                .request_focus(list, Some(focus), FocusDirection::Down)
                .unwrap();
            offsets.push(offset_of(&tree, list));
        }
        // Moves 1..=4 stay inside the window; the 5th (from the
        // second-to-last visible row) starts scrolling.
        assert_eq!(offsets, vec![0, 0, 0, 0, 1, 2, 3]);
        assert_eq!(focus, ids[7]);
    }

    #[test]
    fn test_up_at_top_stays_put() {
        let (mut tree, list, ids) = list_fixture(5, 6);
        assert_eq!(
            tree.request_focus(list, Some(ids[0]), FocusDirection::Up),
            Some(ids[0])
        );
        assert_eq!(offset_of(&tree, list), 0);
    }

    #[test]
    fn test_down_at_bottom_stays_put() {
        let (mut tree, list, ids) = list_fixture(5, 6);
        assert_eq!(
            tree.request_focus(list, Some(ids[4]), FocusDirection::Down),
            Some(ids[4])
        );
        assert_eq!(offset_of(&tree, list), 0);
    }

    #[test]
    fn test_window_of_two_scrolls_on_every_step() {
        // entries_shown == 2 aliases the down probe onto the first visible
        // row; the unguarded comparisons then scroll on every step.
        let (mut tree, list, ids) = list_fixture(4, 2);

        let mut focus = ids[0];
        let mut offsets = Vec::new();
        for _ in 0..3 {
            focus = tree
                .request_focus(list, Some(focus), FocusDirection::Down)
                .unwrap();
            offsets.push(offset_of(&tree, list));
        }
        assert_eq!(focus, ids[3]);
        assert_eq!(offsets, vec![1, 2, 2]);

        for _ in 0..3 {
            focus = tree
                .request_focus(list, Some(focus), FocusDirection::Up)
                .unwrap();
        }
        assert_eq!(focus, ids[0]);
        assert_eq!(offset_of(&tree, list), 0);
    }

    #[test]
    fn test_tiny_windows_never_scroll_or_panic() {
        for shown in [0usize, 1] {
            let (mut tree, list, ids) = list_fixture(4, shown);
            let mut focus = ids[0];
            for _ in 0..3 {
                focus = tree
                    .request_focus(list, Some(focus), FocusDirection::Down)
                    .unwrap();
            }
            assert_eq!(focus, ids[3]);
            assert_eq!(offset_of(&tree, list), 0, "entries_shown={shown}");

            for _ in 0..3 {
                focus = tree
                    .request_focus(list, Some(focus), FocusDirection::Up)
                    .unwrap();
            }
            assert_eq!(focus, ids[0]);
        }
    }

    #[test]
    fn test_frame_delegates_focus_to_content() {
        let mut tree = Tree::new((448, 720), Theme::default());
        let frame = tree.insert(Frame::new("T", "S"));
        let list = tree.insert(List::default());
        let item = tree.insert(ListItem::new("row"));
        tree.list_add_item(list, item, None);
        tree.frame_set_content(frame, list);

        assert_eq!(
            tree.request_focus(frame, None, FocusDirection::None),
            Some(item)
        );
    }

    #[test]
    fn test_undecorated_widgets_decline_focus() {
        let mut tree = Tree::new((448, 720), Theme::default());
        let rect = tree.insert(DebugRectangle::new(Color::WHITE));
        let custom = tree.insert(CustomDrawer::new(|_, _| {}));
        assert_eq!(tree.request_focus(rect, None, FocusDirection::None), None);
        assert_eq!(tree.request_focus(custom, None, FocusDirection::None), None);
    }

    #[test]
    fn test_list_layout_positions_visible_window_only() {
        let (mut tree, list, ids) = list_fixture(10, 3);
        tree.set_bounds(
            list,
            Bounds {
                x: 35,
                y: 140,
                width: 363,
                height: 542,
            },
        );
        tree.layout(
            list,
            Bounds {
                x: 0,
                y: 0,
                width: 448,
                height: 720,
            },
        );

        assert_eq!(tree.bounds(ids[0]).y, 140);
        assert_eq!(tree.bounds(ids[1]).y, 212);
        assert_eq!(tree.bounds(ids[2]).y, 284);
        // Outside the window: geometry untouched (still zeroed).
        assert_eq!(tree.bounds(ids[3]), Bounds::default());
    }

    #[test]
    fn test_toggle_state_drives_value_text() {
        let toggle = ToggleListItem::new("Wi-Fi", true);
        assert_eq!(toggle.item.value(), "On");
        assert!(!toggle.item.faint);

        let mut toggle = ToggleListItem::with_values("Mode", false, "Docked", "Handheld");
        assert_eq!(toggle.item.value(), "Handheld");
        assert!(toggle.item.faint);
        toggle.set_state(true);
        assert_eq!(toggle.item.value(), "Docked");
        assert!(!toggle.item.faint);
    }

    #[test]
    fn test_set_value_invalidates_cached_width() {
        let mut item = ListItem::new("row");
        item.value_width = Some(40);
        item.set_value("longer", false);
        assert_eq!(item.value_width, None);
    }

    #[test]
    fn test_custom_drawer_sees_resolved_bounds() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut tree = Tree::new((448, 720), Theme::default());
        let seen = Rc::new(Cell::new(Bounds::default()));
        let seen_in = seen.clone();
        let custom = tree.insert(CustomDrawer::new(move |_, bounds| {
            seen_in.set(bounds);
        }));
        let bounds = Bounds {
            x: 5,
            y: 6,
            width: 70,
            height: 80,
        };
        tree.set_bounds(custom, bounds);

        let mut renderer = Renderer::headless(128, 128);
        tree.render(custom, &mut renderer);
        assert_eq!(seen.get(), bounds);
    }
}
