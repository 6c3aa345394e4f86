//! Categorized display items: portfolio projects, skill cards and photos.

use std::fmt;

/// Opaque grouping key. `"all"` matches every item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    pub const ALL: &'static str = "all";

    pub fn new(key: impl Into<String>) -> Self {
        Category(key.into())
    }

    pub fn all() -> Self {
        Category(Self::ALL.to_string())
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an item tagged `item` passes this filter.
    pub fn matches(&self, item: &Category) -> bool {
        self.is_all() || self == item
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::all()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(key: &str) -> Self {
        Category::new(key)
    }
}

impl From<String> for Category {
    fn from(key: String) -> Self {
        Category(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    pub fn from_shown(shown: bool) -> Self {
        if shown {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Visible,
    Hidden,
    Transitioning { toward: Visibility },
}

impl DisplayState {
    /// The visibility this state is at, or is heading to.
    pub fn target(self) -> Visibility {
        match self {
            DisplayState::Visible => Visibility::Shown,
            DisplayState::Hidden => Visibility::Hidden,
            DisplayState::Transitioning { toward } => toward,
        }
    }

    pub fn settled(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Shown => DisplayState::Visible,
            Visibility::Hidden => DisplayState::Hidden,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub category: Category,
    pub display: DisplayState,
    /// Lowercased text the search box matches against.
    pub search_text: String,
    /// Proficiency for skill cards, absent elsewhere.
    pub level: Option<u8>,
}

impl Item {
    pub fn new(id: impl Into<String>, category: impl Into<Category>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            display: DisplayState::Visible,
            search_text: String::new(),
            level: None,
        }
    }

    /// Adds searchable text; each fragment is lowercased and space-joined.
    pub fn with_text<'a>(mut self, fragments: impl IntoIterator<Item = &'a str>) -> Self {
        for fragment in fragments {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            if !self.search_text.is_empty() {
                self.search_text.push(' ');
            }
            self.search_text.push_str(&fragment.to_lowercase());
        }
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.display = DisplayState::Hidden;
        self
    }
}

/// Category plus free-text query; both must pass for an item to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Criteria {
    pub category: Category,
    /// Trimmed and lowercased; empty matches everything.
    pub query: String,
}

impl Criteria {
    pub fn normalize_query(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    pub fn admits(&self, item: &Item) -> bool {
        self.category.matches(&item.category)
            && (self.query.is_empty() || item.search_text.contains(&self.query))
    }
}

/// Items in page order. The set never grows or shrinks after construction.
#[derive(Debug, Clone, Default)]
pub struct ItemCollection {
    items: Vec<Item>,
}

impl ItemCollection {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub(crate) fn set_display(&mut self, index: usize, display: DisplayState) {
        if let Some(item) = self.items.get_mut(index) {
            item.display = display;
        }
    }

    /// Indices currently settled as visible.
    pub fn visible(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.display == DisplayState::Visible)
            .map(|(i, _)| i)
            .collect()
    }
}

impl FromIterator<Item> for ItemCollection {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
