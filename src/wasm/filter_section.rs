//! Binds a [`FilterController`] to one filterable grid on the page.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, HtmlElement, HtmlInputElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent,
};

use crate::collection::{DisplayState, Item, ItemCollection};
use crate::config::FilterTiming;
use crate::error::Error;
use crate::filter::{FilterController, Generation, Settle, Step, StepKind, Transition};
use crate::ports::{Animator, Announcer, Frame};

use super::animate::{current_frame, set_frame, CssAnimator, EASE_IN, EASE_OUT};
use super::announce::LiveRegion;
use super::dom::{
    attr_any, html, js_err, listen, query, query_all, set_attr, set_class, text_of, texts_of,
};

/// Selectors and class names describing one grid.
#[derive(Debug)]
pub struct SectionSpec {
    pub name: &'static str,
    pub items: &'static str,
    pub buttons: &'static str,
    /// Attributes carrying a button's category, first match wins.
    pub button_attrs: &'static [&'static str],
    pub hidden_class: &'static str,
    pub search: Option<&'static str>,
    /// Focusable card inside each item for arrow-key navigation.
    pub card: Option<&'static str>,
    /// Descendants whose text feeds the search index.
    pub text: &'static [&'static str],
    pub noun: &'static str,
    /// Share of the grid that must be on screen before it reveals.
    pub reveal_threshold: f64,
}

pub const PORTFOLIO: SectionSpec = SectionSpec {
    name: "portfolio",
    items: ".portfolio-item",
    buttons: ".portfolio-category-btn, .filter-btn",
    button_attrs: &["data-category", "data-filter"],
    hidden_class: "portfolio-hidden",
    search: Some(".portfolio-search"),
    card: Some(".portfolio-card"),
    text: &[
        ".portfolio-title",
        ".portfolio-description",
        ".portfolio-category",
        ".tech-tag",
    ],
    noun: "projects",
    reveal_threshold: 0.2,
};

pub const SKILLS: SectionSpec = SectionSpec {
    name: "skills",
    items: ".skill-item",
    buttons: ".category-btn",
    button_attrs: &["data-category"],
    hidden_class: "hidden",
    search: Some(".skills-search"),
    card: None,
    text: &[".skill-name", ".skill-description"],
    noun: "skills",
    reveal_threshold: 0.3,
};

pub const PHOTOS: SectionSpec = SectionSpec {
    name: "photos",
    items: ".photo-item",
    buttons: ".photo-filter-btn",
    button_attrs: &["data-filter", "data-category"],
    hidden_class: "photo-hidden",
    search: None,
    card: None,
    text: &[],
    noun: "photos",
    reveal_threshold: 0.1,
};

const SHOW_FROM: Frame<'static> = Frame::new(0.0, "translateY(30px) scale(0.95)");
const SHOW_TO: Frame<'static> = Frame::new(1.0, "translateY(0) scale(1)");
const HIDE_FROM: Frame<'static> = Frame::new(1.0, "translateY(0) scale(1)");
const HIDE_TO: Frame<'static> = Frame::new(0.0, "translateY(-30px) scale(0.95)");
const REVEAL_MARGIN: &str = "0px 0px -50px 0px";

pub struct FilterSection {
    spec: &'static SectionSpec,
    controller: RefCell<FilterController>,
    elements: Vec<HtmlElement>,
    buttons: Vec<(Element, String)>,
    /// Pending delays and completions of the current transition.
    timers: RefCell<Vec<Timeout>>,
    /// Pending `animate-in` marks of the latest reveal.
    reveals: RefCell<Vec<Timeout>>,
    announcer: Rc<LiveRegion>,
    animator: CssAnimator,
    timing: FilterTiming,
}

impl FilterSection {
    /// Wire the grid described by `spec`. `Ok(None)` when the page has no
    /// such grid.
    pub fn mount(
        root: &Element,
        spec: &'static SectionSpec,
        timing: FilterTiming,
        announcer: Rc<LiveRegion>,
    ) -> Result<Option<Rc<Self>>, Error> {
        let nodes = query_all(root, spec.items);
        if nodes.is_empty() {
            log::debug!("{}: no items, skipping", spec.name);
            return Ok(None);
        }

        let mut items = Vec::with_capacity(nodes.len());
        let mut elements = Vec::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            let Some(element) = html(node) else { continue };
            items.push(read_item(node, spec, i));
            elements.push(element);
        }

        let buttons: Vec<(Element, String)> = query_all(root, spec.buttons)
            .into_iter()
            .filter_map(|button| {
                let category = attr_any(&button, spec.button_attrs)?;
                Some((button, category))
            })
            .collect();
        let active = buttons
            .iter()
            .find(|(button, _)| button.class_list().contains("active"))
            .map(|(_, category)| category.clone());

        let mut controller =
            FilterController::new(ItemCollection::new(items), timing).with_noun(spec.noun);
        if let Some(category) = active {
            controller = controller.with_category(category);
        }
        // The markup may hide items the starting category admits, or the
        // other way round.
        let changed = controller.reconcile();
        let section = Rc::new(Self {
            spec,
            controller: RefCell::new(controller),
            elements,
            buttons,
            timers: RefCell::new(Vec::new()),
            reveals: RefCell::new(Vec::new()),
            announcer,
            animator: CssAnimator,
            timing,
        });
        for index in changed {
            section.sync(index);
        }
        let category = section.controller.borrow().active_category().clone();
        section.mark_active(category.as_str());

        section.bind_buttons()?;
        section.bind_search(root)?;
        section.bind_focus_navigation()?;
        log::info!("{}: {} items wired", spec.name, section.elements.len());
        Ok(Some(section))
    }

    pub fn show_category(self: &Rc<Self>, category: &str) {
        let transition = self.controller.borrow_mut().set_filter(category);
        if transition.is_some() {
            self.mark_active(category);
        }
        self.run(transition);
    }

    pub fn search(self: &Rc<Self>, query: &str) {
        let transition = self.controller.borrow_mut().search(query);
        self.run(transition);
    }

    pub fn visible_items(&self) -> Vec<usize> {
        self.controller.borrow().visible_items()
    }

    /// Mark cards at or above `min_level` (skills). Exposed for the host
    /// page to drive; no control on the page calls it.
    pub fn highlight_level(&self, min_level: u8) {
        let marked = self.controller.borrow().highlighted(min_level);
        for (i, element) in self.elements.iter().enumerate() {
            let card = query(element, ".skill-card").unwrap_or_else(|| element.clone().into());
            set_class(&card, "skill-highlight", marked.contains(&i));
        }
    }

    /// Staggered entrance of the currently visible items. A new reveal
    /// cancels the marks still pending from the previous one.
    pub fn reveal(&self) {
        let stagger = self.timing.stagger_ms;
        let mut reveals = self.reveals.borrow_mut();
        reveals.clear();
        for (rank, index) in self.visible_items().into_iter().enumerate() {
            let Some(element) = self.elements.get(index).cloned() else {
                continue;
            };
            set_class(&element, "animate-in", false);
            let delay = stagger.saturating_mul(u32::try_from(rank).unwrap_or(u32::MAX));
            reveals.push(Timeout::new(delay, move || {
                set_class(&element, "animate-in", true)
            }));
        }
    }

    /// Reveal once, the first time the grid scrolls into view.
    pub fn reveal_when_visible(self: &Rc<Self>) -> Result<(), Error> {
        let Some(grid) = self.elements.first().and_then(|item| item.parent_element()) else {
            self.reveal();
            return Ok(());
        };
        let weak = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                let entering = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .any(|entry| entry.is_intersecting());
                if !entering {
                    return;
                }
                observer.disconnect();
                if let Some(section) = weak.upgrade() {
                    log::debug!("{}: in view", section.spec.name);
                    section.reveal();
                }
            },
        );
        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(self.spec.reveal_threshold));
        options.set_root_margin(REVEAL_MARGIN);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .map_err(js_err)?;
        observer.observe(&grid);
        // One observer per grid, disconnected after the first reveal.
        callback.forget();
        Ok(())
    }

    fn run(self: &Rc<Self>, transition: Option<Transition>) {
        let Some(transition) = transition else { return };
        // Dropping the previous generation's timers cancels them.
        self.timers.borrow_mut().clear();

        if transition.is_settled() {
            self.announcer.announce(&transition.announcement);
            return;
        }
        for step in transition.steps {
            self.start_step(transition.generation, step);
        }
    }

    fn start_step(self: &Rc<Self>, generation: Generation, step: Step) {
        let Some(element) = self.elements.get(step.index) else {
            return;
        };
        match step.kind {
            StepKind::Show => {
                // Back in layout but still clear until its delay elapses.
                if element.class_list().contains(self.spec.hidden_class) {
                    set_frame(element, SHOW_FROM);
                }
                set_class(element, self.spec.hidden_class, false);
                set_class(element, "filtering-out", false);
                set_class(element, "filtering-in", true);
                let weak = Rc::downgrade(self);
                let ms = u32::try_from(step.delay.as_millis()).unwrap_or(u32::MAX);
                let delayed = Timeout::new(ms, move || {
                    if let Some(section) = weak.upgrade() {
                        section.animate_step(generation, step, false);
                    }
                });
                self.timers.borrow_mut().push(delayed);
            }
            StepKind::Hide => {
                let classes = element.class_list();
                let moving = classes.contains("filtering-in") || classes.contains("filtering-out");
                set_class(element, "filtering-in", false);
                set_class(element, "filtering-out", true);
                self.animate_step(generation, step, moving);
            }
        }
    }

    /// `moving`: the element is mid-animation from a superseded request, so
    /// a hide continues from wherever it is now.
    fn animate_step(self: &Rc<Self>, generation: Generation, step: Step, moving: bool) {
        if self.controller.borrow().generation() != generation {
            return;
        }
        let Some(element) = self.elements.get(step.index) else {
            return;
        };
        let current = match step.kind {
            StepKind::Hide if moving => current_frame(element),
            _ => None,
        };
        let (from, to, easing) = match (step.kind, current.as_ref()) {
            (StepKind::Show, _) => (SHOW_FROM, SHOW_TO, EASE_OUT),
            (StepKind::Hide, Some((opacity, transform))) => {
                (Frame::new(*opacity, transform.as_str()), HIDE_TO, EASE_IN)
            }
            (StepKind::Hide, None) => (HIDE_FROM, HIDE_TO, EASE_IN),
        };
        let weak: Weak<Self> = Rc::downgrade(self);
        let index = step.index;
        let handle = self.animator.animate(
            element,
            from,
            to,
            step.duration,
            easing,
            Box::new(move || {
                if let Some(section) = weak.upgrade() {
                    section.finish(generation, index);
                }
            }),
        );
        self.timers.borrow_mut().push(handle);
    }

    fn finish(&self, generation: Generation, index: usize) {
        let outcome = self.controller.borrow_mut().settle(generation, index);
        if outcome == Settle::Ignored {
            return;
        }
        self.sync(index);
        if let Settle::Complete { announcement } = outcome {
            self.announcer.announce(&announcement);
        }
    }

    /// Mirror the settled state of item `index` onto its classes.
    fn sync(&self, index: usize) {
        let display = self.controller.borrow().display_state(index);
        let Some(element) = self.elements.get(index) else {
            return;
        };
        set_class(element, "filtering-in", false);
        set_class(element, "filtering-out", false);
        set_class(
            element,
            self.spec.hidden_class,
            display == Some(DisplayState::Hidden),
        );
    }

    fn mark_active(&self, category: &str) {
        for (button, key) in &self.buttons {
            let active = key == category;
            set_class(button, "active", active);
            set_attr(button, "aria-pressed", if active { "true" } else { "false" });
        }
    }

    fn bind_buttons(self: &Rc<Self>) -> Result<(), Error> {
        for (button, category) in &self.buttons {
            let section = Rc::clone(self);
            let category = category.clone();
            listen(button, "click", move |event| {
                event.prevent_default();
                section.show_category(&category);
            })?;
        }
        Ok(())
    }

    fn bind_search(self: &Rc<Self>, root: &Element) -> Result<(), Error> {
        let Some(selector) = self.spec.search else {
            return Ok(());
        };
        let Some(input) = query(root, selector).and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            log::debug!("{}: no search box", self.spec.name);
            return Ok(());
        };
        let section = Rc::clone(self);
        let source = input.clone();
        listen(&input, "input", move |_| section.search(&source.value()))
    }

    fn bind_focus_navigation(self: &Rc<Self>) -> Result<(), Error> {
        let Some(card_selector) = self.spec.card else {
            return Ok(());
        };
        let cards: Vec<Option<HtmlElement>> = self
            .elements
            .iter()
            .map(|item| query(item, card_selector).and_then(|card| html(&card)))
            .collect();
        let cards = Rc::new(cards);

        for (index, card) in cards.iter().enumerate() {
            let Some(card) = card else { continue };
            set_attr(card, "tabindex", "0");
            set_attr(card, "role", "article");

            let section = Rc::clone(self);
            let cards = Rc::clone(&cards);
            let item = self.elements[index].clone();
            listen(card, "keydown", move |event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                    return;
                };
                match key.as_str() {
                    "Enter" | " " => {
                        event.prevent_default();
                        if let Some(action) = query(&item, ".action-btn").and_then(|a| html(&a)) {
                            action.click();
                        }
                    }
                    "ArrowRight" | "ArrowLeft" => {
                        event.prevent_default();
                        let forward = key == "ArrowRight";
                        let target = section.controller.borrow().neighbor(index, forward);
                        if let Some(card) = target.and_then(|t| cards.get(t)).and_then(Option::as_ref) {
                            if let Err(err) = card.focus() {
                                log::debug!("focus: {err:?}");
                            }
                        }
                    }
                    _ => {}
                }
            })?;
        }
        Ok(())
    }
}

fn read_item(node: &Element, spec: &SectionSpec, index: usize) -> Item {
    let id = node
        .get_attribute("id")
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("{}-{index}", spec.name));
    let category = node.get_attribute("data-category").unwrap_or_default();

    let mut fragments = Vec::new();
    for selector in spec.text {
        if *selector == ".tech-tag" {
            fragments.extend(texts_of(node, selector));
        } else {
            fragments.push(text_of(node, selector));
        }
    }

    let mut item = Item::new(id, category).with_text(fragments.iter().map(String::as_str));
    if let Some(level) = node
        .get_attribute("data-level")
        .and_then(|raw| raw.trim().parse::<u8>().ok())
    {
        item = item.with_level(level);
    }
    if node.class_list().contains(spec.hidden_class) {
        item = item.hidden();
    }
    item
}
