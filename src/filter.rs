//! Category filtering over an [`ItemCollection`].
//!
//! The controller does no I/O. Each request produces a [`Transition`]: a list
//! of per-item [`Step`]s the caller animates, stamped with a [`Generation`].
//! Every deferred completion comes back through [`FilterController::settle`],
//! which drops completions from superseded generations. Whatever order the
//! timers fire in, the last request decides what is visible at rest.

use std::time::Duration;

use crate::collection::{Category, Criteria, DisplayState, Item, ItemCollection, Visibility};
use crate::config::FilterTiming;

/// Monotonic stamp identifying one filter or navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Return to layout at once, fade in after `delay`.
    Show,
    /// Fade out, then leave the layout.
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub kind: StepKind,
    pub delay: Duration,
    pub duration: Duration,
}

impl Step {
    /// When the caller should report this step through `settle`.
    pub fn settles_after(&self) -> Duration {
        self.delay + self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub generation: Generation,
    pub steps: Vec<Step>,
    /// Text for the assistive-technology announcement of this operation.
    pub announcement: String,
}

impl Transition {
    /// No item changes visibility; announce immediately.
    pub fn is_settled(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settle {
    /// Superseded generation, unknown index, or an already settled item.
    Ignored,
    Pending { remaining: usize },
    /// Last step of the current transition; announce once.
    Complete { announcement: String },
}

#[derive(Debug)]
pub struct FilterController {
    items: ItemCollection,
    criteria: Criteria,
    timing: FilterTiming,
    generation: Generation,
    pending: usize,
    announcement: Option<String>,
    noun: String,
}

impl FilterController {
    pub fn new(items: ItemCollection, timing: FilterTiming) -> Self {
        Self {
            items,
            criteria: Criteria::default(),
            timing,
            generation: Generation::default(),
            pending: 0,
            announcement: None,
            noun: "items".to_string(),
        }
    }

    /// Word used in announcements ("Showing web projects").
    pub fn with_noun(mut self, noun: impl Into<String>) -> Self {
        self.noun = noun.into();
        self
    }

    /// Start from `category` instead of `all`. Call [`reconcile`] afterwards
    /// to bring the items in line.
    ///
    /// [`reconcile`]: FilterController::reconcile
    pub fn with_category(mut self, category: impl Into<Category>) -> Self {
        self.criteria.category = category.into();
        self
    }

    pub fn active_category(&self) -> &Category {
        &self.criteria.category
    }

    pub fn query(&self) -> &str {
        &self.criteria.query
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_settled(&self) -> bool {
        self.pending == 0
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn display_state(&self, index: usize) -> Option<DisplayState> {
        self.items.get(index).map(|item| item.display)
    }

    /// Snapshot of settled visible indices.
    pub fn visible_items(&self) -> Vec<usize> {
        self.items.visible()
    }

    /// Switch category. `None` when it is already active.
    pub fn set_filter(&mut self, category: impl Into<Category>) -> Option<Transition> {
        let category = category.into();
        if category == self.criteria.category {
            return None;
        }
        let announcement = self.category_announcement(&category);
        let criteria = Criteria {
            category,
            query: self.criteria.query.clone(),
        };
        Some(self.begin(criteria, announcement))
    }

    /// Narrow by free text within the active category. `None` when the
    /// normalized query is unchanged.
    pub fn search(&mut self, raw: &str) -> Option<Transition> {
        let query = Criteria::normalize_query(raw);
        if query == self.criteria.query {
            return None;
        }
        let criteria = Criteria {
            category: self.criteria.category.clone(),
            query,
        };
        let announcement = if criteria.query.is_empty() {
            self.category_announcement(&criteria.category)
        } else {
            let matches = self.items.iter().filter(|item| criteria.admits(item)).count();
            if matches == 1 {
                let noun = self.noun.strip_suffix('s').unwrap_or(&self.noun);
                format!("1 {noun} matches \"{}\"", criteria.query)
            } else {
                format!("{matches} {} match \"{}\"", self.noun, criteria.query)
            }
        };
        Some(self.begin(criteria, announcement))
    }

    /// Snap every item to what the current criteria admit, without
    /// animation, and drop anything in flight. Returns the indices whose
    /// state changed. Used once the markup has been read, which may disagree
    /// with the starting category.
    pub fn reconcile(&mut self) -> Vec<usize> {
        self.generation = self.generation.next();
        self.pending = 0;
        self.announcement = None;

        let mut changed = Vec::new();
        for index in 0..self.items.len() {
            let Some(item) = self.items.get(index) else { continue };
            let want = DisplayState::settled(Visibility::from_shown(self.criteria.admits(item)));
            if item.display != want {
                self.items.set_display(index, want);
                changed.push(index);
            }
        }
        if !changed.is_empty() {
            log::debug!(
                "filter reconciled {} items to category={}",
                changed.len(),
                self.criteria.category
            );
        }
        changed
    }

    fn category_announcement(&self, category: &Category) -> String {
        if category.is_all() {
            format!("Showing all {}", self.noun)
        } else {
            format!("Showing {category} {}", self.noun)
        }
    }

    fn begin(&mut self, criteria: Criteria, announcement: String) -> Transition {
        self.generation = self.generation.next();
        self.criteria = criteria;

        let mut steps = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            let want = Visibility::from_shown(self.criteria.admits(item));
            let in_flight = matches!(item.display, DisplayState::Transitioning { .. });
            // Settled items already where they belong are left alone; items
            // still moving belong to a dead generation and are re-issued.
            if !in_flight && item.display.target() == want {
                continue;
            }
            let step = match want {
                Visibility::Shown => Step {
                    index,
                    kind: StepKind::Show,
                    delay: self.timing.stagger() * index as u32,
                    duration: self.timing.show(),
                },
                Visibility::Hidden => Step {
                    index,
                    kind: StepKind::Hide,
                    delay: Duration::ZERO,
                    duration: self.timing.hide(),
                },
            };
            steps.push(step);
        }

        for step in &steps {
            let toward = match step.kind {
                StepKind::Show => Visibility::Shown,
                StepKind::Hide => Visibility::Hidden,
            };
            self.items
                .set_display(step.index, DisplayState::Transitioning { toward });
        }

        self.pending = steps.len();
        self.announcement = (!steps.is_empty()).then(|| announcement.clone());
        log::debug!(
            "filter generation {:?}: category={} query={:?} steps={}",
            self.generation,
            self.criteria.category,
            self.criteria.query,
            steps.len()
        );

        Transition {
            generation: self.generation,
            steps,
            announcement,
        }
    }

    /// Report a finished step. The item's final state is recomputed from the
    /// criteria active now, never from what the step was issued for.
    pub fn settle(&mut self, generation: Generation, index: usize) -> Settle {
        if generation != self.generation {
            return Settle::Ignored;
        }
        let Some(item) = self.items.get(index) else {
            return Settle::Ignored;
        };
        if !matches!(item.display, DisplayState::Transitioning { .. }) {
            return Settle::Ignored;
        }
        let shown = Visibility::from_shown(self.criteria.admits(item));
        self.items.set_display(index, DisplayState::settled(shown));
        self.pending = self.pending.saturating_sub(1);

        if self.pending > 0 {
            return Settle::Pending {
                remaining: self.pending,
            };
        }
        match self.announcement.take() {
            Some(announcement) => Settle::Complete { announcement },
            None => Settle::Ignored,
        }
    }

    /// Circular neighbour of `index` among visible items, for arrow-key focus.
    pub fn neighbor(&self, index: usize, forward: bool) -> Option<usize> {
        let visible = self.visible_items();
        let n = visible.len();
        if n == 0 {
            return None;
        }
        let next = match visible.iter().position(|&i| i == index) {
            Some(pos) if forward => visible[(pos + 1) % n],
            Some(pos) => visible[(pos + n - 1) % n],
            // Focus sits on an item that is no longer visible.
            None if forward => visible
                .iter()
                .copied()
                .find(|&i| i > index)
                .unwrap_or(visible[0]),
            None => visible
                .iter()
                .rev()
                .copied()
                .find(|&i| i < index)
                .unwrap_or(visible[n - 1]),
        };
        Some(next)
    }

    /// Indices whose level is at least `min_level`.
    pub fn highlighted(&self, min_level: u8) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.level.is_some_and(|level| level >= min_level))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(categories: &[&str]) -> FilterController {
        let items = categories
            .iter()
            .enumerate()
            .map(|(i, c)| Item::new(format!("item-{i}"), *c))
            .collect();
        FilterController::new(items, FilterTiming::default())
    }

    fn settle_all(ctl: &mut FilterController, t: &Transition) -> Vec<Settle> {
        t.steps
            .iter()
            .map(|s| ctl.settle(t.generation, s.index))
            .collect()
    }

    #[test]
    fn same_category_is_a_no_op() {
        let mut ctl = controller(&["a", "b"]);
        assert!(ctl.set_filter("all").is_none());
        let t = ctl.set_filter("a").unwrap();
        settle_all(&mut ctl, &t);
        assert!(ctl.set_filter("a").is_none());
    }

    #[test]
    fn steps_touch_only_changing_items() {
        let mut ctl = controller(&["a", "b", "a", "c", "b"]);
        let t = ctl.set_filter("b").unwrap();
        let hides: Vec<_> = t.steps.iter().map(|s| (s.index, s.kind)).collect();
        assert_eq!(
            hides,
            vec![(0, StepKind::Hide), (2, StepKind::Hide), (3, StepKind::Hide)]
        );
        assert_eq!(ctl.display_state(1), Some(DisplayState::Visible));
    }

    #[test]
    fn show_steps_are_staggered_by_position() {
        let mut ctl = controller(&["a", "b", "a"]);
        let t = ctl.set_filter("b").unwrap();
        settle_all(&mut ctl, &t);
        let t = ctl.set_filter("a").unwrap();
        let shows: Vec<_> = t
            .steps
            .iter()
            .filter(|s| s.kind == StepKind::Show)
            .map(|s| (s.index, s.delay))
            .collect();
        assert_eq!(
            shows,
            vec![
                (0, Duration::ZERO),
                (2, Duration::from_millis(200)),
            ]
        );
        let hide = t.steps.iter().find(|s| s.kind == StepKind::Hide).unwrap();
        assert_eq!(hide.settles_after(), Duration::from_millis(300));
    }

    #[test]
    fn announcement_fires_once_on_last_settle() {
        let mut ctl = controller(&["a", "b", "a"]).with_noun("projects");
        let t = ctl.set_filter("b").unwrap();
        let results = settle_all(&mut ctl, &t);
        assert_eq!(results[0], Settle::Pending { remaining: 1 });
        assert_eq!(
            results[1],
            Settle::Complete {
                announcement: "Showing b projects".into()
            }
        );
        assert!(ctl.is_settled());
        // A repeated completion is ignored rather than announced again.
        assert_eq!(ctl.settle(t.generation, 0), Settle::Ignored);
    }

    #[test]
    fn unknown_category_hides_everything_without_error() {
        let mut ctl = controller(&["a", "b"]);
        let t = ctl.set_filter("zzz").unwrap();
        settle_all(&mut ctl, &t);
        assert!(ctl.visible_items().is_empty());
    }

    #[test]
    fn transition_with_no_changes_is_settled() {
        let mut ctl = controller(&["a", "a"]);
        let t = ctl.set_filter("a").unwrap();
        assert!(t.is_settled());
        assert_eq!(t.announcement, "Showing a items");
        assert!(ctl.is_settled());
    }

    #[test]
    fn stale_settles_are_ignored() {
        let mut ctl = controller(&["a", "b", "c"]);
        let first = ctl.set_filter("a").unwrap();
        let second = ctl.set_filter("b").unwrap();
        for step in &first.steps {
            assert_eq!(ctl.settle(first.generation, step.index), Settle::Ignored);
        }
        settle_all(&mut ctl, &second);
        assert_eq!(ctl.visible_items(), vec![1]);
    }

    #[test]
    fn in_flight_items_are_reissued_by_newer_generation() {
        let mut ctl = controller(&["a", "b"]);
        let first = ctl.set_filter("a").unwrap();
        assert_eq!(first.steps.len(), 1);
        // Back to all before item 1 finished hiding: it must come back.
        let second = ctl.set_filter("all").unwrap();
        assert_eq!(second.steps.len(), 1);
        assert_eq!(second.steps[0].index, 1);
        assert_eq!(second.steps[0].kind, StepKind::Show);
        settle_all(&mut ctl, &second);
        assert_eq!(ctl.visible_items(), vec![0, 1]);
    }

    #[test]
    fn search_narrows_within_category() {
        let items = vec![
            Item::new("p0", "web").with_text(["Shop", "react"]),
            Item::new("p1", "web").with_text(["Blog", "rust"]),
            Item::new("p2", "mobile").with_text(["Tracker", "rust"]),
        ]
        .into_iter()
        .collect();
        let mut ctl = FilterController::new(items, FilterTiming::default()).with_noun("projects");
        let t = ctl.set_filter("web").unwrap();
        settle_all(&mut ctl, &t);

        let t = ctl.search("  RUST ").unwrap();
        assert_eq!(t.announcement, "1 project matches \"rust\"");
        settle_all(&mut ctl, &t);
        assert_eq!(ctl.visible_items(), vec![1]);
        assert!(ctl.search("rust").is_none());

        let t = ctl.search("").unwrap();
        assert_eq!(t.announcement, "Showing web projects");
        settle_all(&mut ctl, &t);
        assert_eq!(ctl.visible_items(), vec![0, 1]);
    }

    #[test]
    fn search_counts_agree_with_noun() {
        let items = vec![
            Item::new("p0", "web").with_text(["rust"]),
            Item::new("p1", "web").with_text(["rust"]),
        ]
        .into_iter()
        .collect();
        let mut ctl = FilterController::new(items, FilterTiming::default()).with_noun("projects");
        assert_eq!(ctl.search("rust").unwrap().announcement, "2 projects match \"rust\"");
        assert_eq!(ctl.search("go").unwrap().announcement, "0 projects match \"go\"");
    }

    #[test]
    fn reconcile_shows_items_hidden_by_markup() {
        let items = vec![Item::new("x", "a"), Item::new("y", "b").hidden()]
            .into_iter()
            .collect();
        let mut ctl = FilterController::new(items, FilterTiming::default());
        assert_eq!(ctl.display_state(1), Some(DisplayState::Hidden));

        assert_eq!(ctl.reconcile(), vec![1]);
        assert_eq!(ctl.display_state(1), Some(DisplayState::Visible));
        assert_eq!(ctl.visible_items(), vec![0, 1]);
        assert!(ctl.reconcile().is_empty());
        assert!(ctl.set_filter("all").is_none());
    }

    #[test]
    fn reconcile_applies_starting_category() {
        let items = vec![Item::new("x", "a"), Item::new("y", "b").hidden()]
            .into_iter()
            .collect();
        let mut ctl = FilterController::new(items, FilterTiming::default()).with_category("b");
        assert_eq!(ctl.reconcile(), vec![0, 1]);
        assert_eq!(ctl.visible_items(), vec![1]);
        assert_eq!(ctl.active_category().as_str(), "b");
    }

    #[test]
    fn reconcile_supersedes_in_flight_steps() {
        let mut ctl = controller(&["a", "b"]);
        let t = ctl.set_filter("a").unwrap();
        ctl.reconcile();
        assert_eq!(ctl.settle(t.generation, 1), Settle::Ignored);
        assert_eq!(ctl.visible_items(), vec![0]);
        assert!(ctl.is_settled());
    }

    #[test]
    fn neighbor_wraps_over_visible_items() {
        let mut ctl = controller(&["a", "b", "a", "b", "a"]);
        let t = ctl.set_filter("a").unwrap();
        settle_all(&mut ctl, &t);
        assert_eq!(ctl.neighbor(0, true), Some(2));
        assert_eq!(ctl.neighbor(4, true), Some(0));
        assert_eq!(ctl.neighbor(0, false), Some(4));
        // From a hidden item, move to the nearest visible one in that direction.
        assert_eq!(ctl.neighbor(1, true), Some(2));
        assert_eq!(ctl.neighbor(3, false), Some(2));

        let t = ctl.set_filter("none").unwrap();
        settle_all(&mut ctl, &t);
        assert_eq!(ctl.neighbor(0, true), None);
    }

    #[test]
    fn highlighted_filters_by_level() {
        let items = vec![
            Item::new("rust", "lang").with_level(90),
            Item::new("go", "lang").with_level(60),
            Item::new("figma", "design"),
        ]
        .into_iter()
        .collect();
        let ctl = FilterController::new(items, FilterTiming::default());
        assert_eq!(ctl.highlighted(75), vec![0]);
        assert_eq!(ctl.highlighted(0), vec![0, 1]);
    }
}
