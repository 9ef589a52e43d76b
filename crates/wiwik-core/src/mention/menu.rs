//! Mention menu view model.
//!
//! The widget renders into a [`MenuView`], a plain value describing what the
//! menu should show. [`MenuView::apply`] pushes it onto any [`MenuSurface`].

use crate::search::SearchResult;

/// Absolute position of the menu's top-left corner, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub top: u16,
    pub left: u16,
}

/// Handle that commits the candidate it was created for.
///
/// Hand it back to [`super::MentionWidget::select`] when the item is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectItem {
    index: usize,
}

impl SelectItem {
    pub(crate) const fn new(index: usize) -> Self {
        Self { index }
    }

    pub const fn index(self) -> usize {
        self.index
    }
}

/// One rendered menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    /// Secondary text, usually the username.
    pub detail: String,
    pub avatar_url: String,
    /// Accessibility role, `"option"` for listbox entries.
    pub role: &'static str,
    /// Visual and `aria-selected` state.
    pub selected: bool,
    pub select: SelectItem,
}

/// Builds a menu row for a candidate.
pub type MenuItemTemplate = Box<dyn Fn(&SearchResult, SelectItem, bool) -> MenuItem + Send + Sync>;

/// Produces the text inserted for a committed candidate.
pub type ReplaceFn = Box<dyn Fn(&SearchResult, char) -> String + Send + Sync>;

/// Default row: display name, avatar and username.
pub fn default_menu_item(candidate: &SearchResult, select: SelectItem, is_active: bool) -> MenuItem {
    MenuItem {
        label: candidate.display_name().to_string(),
        detail: candidate.username.clone(),
        avatar_url: candidate.avatar_url(),
        role: "option",
        selected: is_active,
        select,
    }
}

/// Default insertion: trigger, username and a trailing space.
pub fn default_replace(candidate: &SearchResult, trigger: char) -> String {
    format!("{trigger}{} ", candidate.username)
}

/// What the menu shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MenuView {
    #[default]
    Hidden,
    Shown {
        anchor: Anchor,
        items: Vec<MenuItem>,
    },
}

impl MenuView {
    pub const fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub fn items(&self) -> &[MenuItem] {
        match self {
            Self::Hidden => &[],
            Self::Shown { items, .. } => items,
        }
    }

    /// Index of the selected row, if any.
    pub fn selected_index(&self) -> Option<usize> {
        self.items().iter().position(|item| item.selected)
    }

    /// Replace the surface's contents with this view.
    pub fn apply(&self, surface: &mut impl MenuSurface) {
        surface.clear();
        match self {
            Self::Hidden => surface.hide(),
            Self::Shown { anchor, items } => {
                surface.move_to(*anchor);
                for item in items {
                    surface.append(item.clone());
                }
                surface.show();
            }
        }
    }
}

/// Something a menu can be drawn onto.
pub trait MenuSurface {
    fn clear(&mut self);
    fn move_to(&mut self, anchor: Anchor);
    fn append(&mut self, item: MenuItem);
    fn show(&mut self);
    fn hide(&mut self);
}

/// A plain in-memory surface; the terminal front end draws from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuBuffer {
    pub visible: bool,
    pub anchor: Anchor,
    pub items: Vec<MenuItem>,
}

impl MenuSurface for MenuBuffer {
    fn clear(&mut self) {
        self.items.clear();
    }

    fn move_to(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    fn append(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// First visible row of a scrolling window of `visible` rows that keeps
/// `selected` in view, given the previous `offset`.
pub const fn scroll_window(selected: usize, visible: usize, offset: usize) -> usize {
    if visible == 0 || selected < offset {
        selected
    } else if selected >= offset + visible {
        selected + 1 - visible
    } else {
        offset
    }
}
