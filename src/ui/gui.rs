//! One screen: a widget tree plus its focused element.

use crate::gfx::Renderer;
use crate::input::{InputFrame, Keys};

use super::element::{ElementId, FocusDirection, Tree};

/// A screen pushed onto the overlay's stack.
///
/// `create_ui` builds the widget tree; it runs exactly once, when the
/// overlay transitions to the screen, not when the screen object is
/// constructed.
pub trait Screen {
    /// Builds this screen's widget tree and returns its root element.
    fn create_ui(&mut self, tree: &mut Tree) -> ElementId;

    /// Called once per frame before drawing.
    fn update(&mut self, _tree: &mut Tree) {}

    /// Handles input not consumed by the focused element or its parents.
    /// Return `true` to stop the directional focus fallback.
    fn handle_input(&mut self, _tree: &mut Tree, _input: &InputFrame) -> bool {
        false
    }
}

/// Navigation requests queued by click listeners during input dispatch and
/// applied by the overlay afterwards.
#[derive(Default)]
pub struct UiEvents {
    actions: Vec<UiAction>,
}

pub enum UiAction {
    ChangeTo(Box<dyn Screen>),
    GoBack,
    Hide,
    Close,
}

impl UiEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a new screen after this dispatch completes.
    pub fn change_to(&mut self, screen: impl Screen + 'static) {
        self.actions.push(UiAction::ChangeTo(Box::new(screen)));
    }

    /// Pops the current screen.
    pub fn go_back(&mut self) {
        self.actions.push(UiAction::GoBack);
    }

    /// Starts the fade-out.
    pub fn hide(&mut self) {
        self.actions.push(UiAction::Hide);
    }

    /// Shuts the overlay down.
    pub fn close(&mut self) {
        self.actions.push(UiAction::Close);
    }

    pub(crate) fn take(&mut self) -> Vec<UiAction> {
        std::mem::take(&mut self.actions)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// A live screen: the boxed [`Screen`], its tree and the focus pointer.
pub struct Gui {
    screen: Box<dyn Screen>,
    tree: Tree,
    root: ElementId,
    focused: Option<ElementId>,
}

impl Gui {
    /// Builds the screen's tree and assigns initial focus. This is the only
    /// place a tree is created.
    pub(crate) fn new(
        mut screen: Box<dyn Screen>,
        surface: (u16, u16),
        theme: crate::config::Theme,
    ) -> Self {
        let mut tree = Tree::new(surface, theme);
        let root = screen.create_ui(&mut tree);
        let mut gui = Self {
            screen,
            tree,
            root,
            focused: None,
        };
        gui.request_focus(Some(root), FocusDirection::None);
        gui
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Asks `element` (or a descendant it delegates to) to claim focus.
    /// When the request leaves focus where it was, the still-focused element
    /// shakes as feedback that navigation that way is not possible.
    pub fn request_focus(&mut self, element: Option<ElementId>, direction: FocusDirection) {
        let old = self.focused;

        if let Some(target) = element {
            let new = self.tree.request_focus(target, old, direction);
            if let Some(old) = old {
                self.tree.set_focused(old, false);
            }
            self.focused = new;
            if let Some(new) = new {
                self.tree.set_focused(new, true);
            }
        }

        if old == self.focused {
            if let Some(focused) = self.focused {
                self.tree.shake(focused, direction);
            }
        }
    }

    /// Clears focus unconditionally (`None`) or only when the given element
    /// currently holds it.
    pub fn remove_focus(&mut self, element: Option<ElementId>) {
        match element {
            None => self.focused = None,
            Some(e) if self.focused == Some(e) => self.focused = None,
            Some(_) => {}
        }
    }

    pub(crate) fn update(&mut self) {
        self.screen.update(&mut self.tree);
    }

    pub(crate) fn draw(&mut self, renderer: &mut Renderer) {
        self.tree.render(self.root, renderer);
    }

    /// Dispatches one frame's input: offer the press to the focused element
    /// and bubble it up the parent chain, then the screen itself, then fall
    /// back to directional focus navigation against the focused element's
    /// parent.
    pub(crate) fn dispatch_input(&mut self, events: &mut UiEvents, input: &InputFrame) {
        let current = self.focused.unwrap_or(self.root);

        let mut handled = false;
        let mut cursor = Some(current);
        while !handled {
            let Some(id) = cursor else {
                break;
            };
            handled = self.tree.on_click(id, events, input.keys_down);
            cursor = self.tree.parent(id);
        }

        handled |= self.screen.handle_input(&mut self.tree, input);
        if handled {
            return;
        }

        let direction = if input.keys_down.contains(Keys::DUP) {
            Some(FocusDirection::Up)
        } else if input.keys_down.contains(Keys::DDOWN) {
            Some(FocusDirection::Down)
        } else if input.keys_down.contains(Keys::DLEFT) {
            Some(FocusDirection::Left)
        } else if input.keys_down.contains(Keys::DRIGHT) {
            Some(FocusDirection::Right)
        } else {
            None
        };

        if let Some(direction) = direction {
            let parent = self.tree.parent(current);
            self.request_focus(parent, direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::ui::widgets::{Frame, List, ListItem};

    struct ListScreen {
        items: usize,
    }

    impl Screen for ListScreen {
        fn create_ui(&mut self, tree: &mut Tree) -> ElementId {
            let frame = tree.insert(Frame::new("Test", "v0"));
            let list = tree.insert(List::default());
            for i in 0..self.items {
                let item = tree.insert(ListItem::new(format!("item {i}")));
                tree.list_add_item(list, item, None);
            }
            tree.frame_set_content(frame, list);
            frame
        }
    }

    fn gui(items: usize) -> Gui {
        Gui::new(Box::new(ListScreen { items }), (448, 720), Theme::default())
    }

    fn press(gui: &mut Gui, keys: Keys) -> UiEvents {
        let mut events = UiEvents::new();
        let input = InputFrame {
            keys_down: keys,
            ..InputFrame::default()
        };
        gui.dispatch_input(&mut events, &input);
        events
    }

    #[test]
    fn test_initial_focus_is_first_item() {
        let gui = gui(3);
        let focused = gui.focused().unwrap();
        assert!(gui.tree().is_focused(focused));
        // The first list item claims focus through the frame delegate.
        assert!(matches!(
            gui.tree().widget(focused),
            Some(crate::ui::widgets::Widget::ListItem(item)) if item.text() == "item 0"
        ));
    }

    #[test]
    fn test_directional_press_moves_focus() {
        let mut gui = gui(3);
        let first = gui.focused().unwrap();
        press(&mut gui, Keys::DDOWN);
        let second = gui.focused().unwrap();
        assert_ne!(first, second);
        assert!(!gui.tree().is_focused(first));
        assert!(gui.tree().is_focused(second));
    }

    #[test]
    fn test_blocked_navigation_shakes() {
        let mut gui = gui(3);
        let first = gui.focused().unwrap();
        press(&mut gui, Keys::DUP);
        // Focus did not move, so the element got a shake as feedback.
        assert_eq!(gui.focused(), Some(first));
        assert!(gui.tree().get(first).unwrap().shake.is_some());
    }

    #[test]
    fn test_remove_focus_matches_holder_only() {
        let mut gui = gui(2);
        let focused = gui.focused().unwrap();
        let other = gui.root();

        gui.remove_focus(Some(other));
        assert_eq!(gui.focused(), Some(focused));

        gui.remove_focus(Some(focused));
        assert_eq!(gui.focused(), None);

        gui.request_focus(Some(gui.root()), FocusDirection::None);
        assert!(gui.focused().is_some());
        gui.remove_focus(None);
        assert_eq!(gui.focused(), None);
    }

    #[test]
    fn test_click_bubbles_to_parent_chain() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut gui = gui(2);
        let root = gui.root();
        let hits = Rc::new(Cell::new(0));
        let hits_in = hits.clone();
        gui.tree_mut().set_click_listener(root, move |_, keys| {
            hits_in.set(hits_in.get() + 1);
            keys.contains(Keys::A)
        });

        // The focused item declines, so the press climbs to the root frame.
        press(&mut gui, Keys::A);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_consumed_click_stops_directional_fallback() {
        let mut gui = gui(3);
        let first = gui.focused().unwrap();
        gui.tree_mut()
            .set_click_listener(first, |_, keys| keys.contains(Keys::DDOWN));

        press(&mut gui, Keys::DDOWN);
        // The listener consumed the press, so focus never moved.
        assert_eq!(gui.focused(), Some(first));
    }

    #[test]
    fn test_screen_handle_input_blocks_navigation() {
        struct Consuming;
        impl Screen for Consuming {
            fn create_ui(&mut self, tree: &mut Tree) -> ElementId {
                let frame = tree.insert(Frame::new("T", "S"));
                let list = tree.insert(List::default());
                for i in 0..3 {
                    let item = tree.insert(ListItem::new(format!("{i}")));
                    tree.list_add_item(list, item, None);
                }
                tree.frame_set_content(frame, list);
                frame
            }

            fn handle_input(&mut self, _tree: &mut Tree, _input: &InputFrame) -> bool {
                true
            }
        }

        let mut gui = Gui::new(Box::new(Consuming), (448, 720), Theme::default());
        let first = gui.focused().unwrap();
        press(&mut gui, Keys::DDOWN);
        assert_eq!(gui.focused(), Some(first));
    }

    #[test]
    fn test_toggle_confirm_is_always_consumed() {
        struct ToggleScreen;
        impl Screen for ToggleScreen {
            fn create_ui(&mut self, tree: &mut Tree) -> ElementId {
                let frame = tree.insert(Frame::new("T", "S"));
                let list = tree.insert(List::default());
                let toggle = tree.insert(crate::ui::widgets::ToggleListItem::new("flag", false));
                tree.list_add_item(list, toggle, None);
                tree.frame_set_content(frame, list);
                frame
            }
        }

        let mut gui = Gui::new(Box::new(ToggleScreen), (448, 720), Theme::default());
        let toggle_id = gui.focused().unwrap();

        press(&mut gui, Keys::A);
        match gui.tree().widget(toggle_id) {
            Some(crate::ui::widgets::Widget::Toggle(t)) => assert!(t.state()),
            _ => panic!("focused element is not the toggle"),
        }

        press(&mut gui, Keys::A);
        match gui.tree().widget(toggle_id) {
            Some(crate::ui::widgets::Widget::Toggle(t)) => assert!(!t.state()),
            _ => panic!("focused element is not the toggle"),
        }
    }
}
