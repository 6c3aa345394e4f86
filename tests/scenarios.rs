//! End-to-end behaviour of the controllers, driven the way the browser
//! wiring drives them: requests first, deferred completions later and in
//! arbitrary order.

use portfolio_interactions::config::FilterTiming;
use portfolio_interactions::filter::StepKind;
use portfolio_interactions::ports::{KeyValueStore, MemoryStore};
use portfolio_interactions::{
    DisplayState, FilterController, GalleryNavigator, Item, Photo, Settle, Theme,
    ThemePreference, ThemeSource, Transition,
};

fn grid(categories: &[&str]) -> FilterController {
    let items = categories
        .iter()
        .enumerate()
        .map(|(i, c)| Item::new(format!("item-{i}"), *c))
        .collect();
    FilterController::new(items, FilterTiming::default())
}

/// Fire every completion of `t`, returning the announcements produced.
fn settle(ctl: &mut FilterController, t: &Transition) -> Vec<String> {
    let mut steps = t.steps.clone();
    steps.sort_by_key(|s| s.settles_after());
    steps
        .iter()
        .filter_map(|s| match ctl.settle(t.generation, s.index) {
            Settle::Complete { announcement } => Some(announcement),
            _ => None,
        })
        .collect()
}

#[test]
fn settled_visibility_matches_category() {
    let categories = ["a", "b", "a", "c", "b"];
    for target in ["a", "b", "c", "all", "missing"] {
        let mut ctl = grid(&categories);
        if let Some(t) = ctl.set_filter(target) {
            settle(&mut ctl, &t);
        }
        assert!(ctl.is_settled());
        for (i, category) in categories.iter().enumerate() {
            let expected = target == "all" || *category == target;
            assert_eq!(
                ctl.display_state(i) == Some(DisplayState::Visible),
                expected,
                "filter {target}, item {i}"
            );
        }
    }
}

#[test]
fn markup_hidden_items_follow_the_starting_category() {
    let items = vec![
        Item::new("x", "a"),
        Item::new("y", "b").hidden(),
        Item::new("z", "a").hidden(),
    ];
    let mut ctl = FilterController::new(items.into_iter().collect(), FilterTiming::default());
    ctl.reconcile();
    assert_eq!(ctl.visible_items(), vec![0, 1, 2]);
    assert!(ctl.set_filter("all").is_none());

    let t = ctl.set_filter("b").unwrap();
    settle(&mut ctl, &t);
    assert_eq!(ctl.visible_items(), vec![1]);
}

#[test]
fn concrete_five_item_scenario() {
    let mut ctl = grid(&["a", "b", "a", "c", "b"]);
    let t = ctl.set_filter("b").unwrap();
    assert_eq!(settle(&mut ctl, &t), vec!["Showing b items".to_string()]);
    assert_eq!(ctl.visible_items(), vec![1, 4]);

    let t = ctl.set_filter("all").unwrap();
    assert!(t.steps.iter().all(|s| s.kind == StepKind::Show));
    assert_eq!(settle(&mut ctl, &t), vec!["Showing all items".to_string()]);
    assert_eq!(ctl.visible_items(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn repeating_a_filter_does_no_work() {
    let mut ctl = grid(&["a", "b", "a"]);
    let t = ctl.set_filter("a").unwrap();
    settle(&mut ctl, &t);
    let generation = ctl.generation();

    assert!(ctl.set_filter("a").is_none());
    assert_eq!(ctl.generation(), generation);
    assert_eq!(ctl.visible_items(), vec![0, 2]);
}

#[test]
fn last_filter_wins_regardless_of_timer_order() {
    let mut ctl = grid(&["a", "b", "a", "c", "b"]);
    let ta = ctl.set_filter("a").unwrap();
    let tb = ctl.set_filter("b").unwrap();
    let tc = ctl.set_filter("c").unwrap();

    // Newest completions first, then every stale one.
    let announced = settle(&mut ctl, &tc);
    assert!(settle(&mut ctl, &tb).is_empty());
    assert!(settle(&mut ctl, &ta).is_empty());

    assert_eq!(announced, vec!["Showing c items".to_string()]);
    assert_eq!(ctl.visible_items(), vec![3]);
}

#[test]
fn stale_completions_before_current_ones_do_not_leak() {
    let mut ctl = grid(&["a", "b", "a", "c", "b"]);
    let ta = ctl.set_filter("a").unwrap();
    let tc = ctl.set_filter("c").unwrap();

    settle(&mut ctl, &ta);
    assert!(!ctl.is_settled());
    settle(&mut ctl, &tc);
    assert_eq!(ctl.visible_items(), vec![3]);
}

#[test]
fn gallery_next_and_previous_are_circular() {
    let photos = (0..5)
        .map(|i| Photo::new(format!("{i}.jpg"), format!("photo {i}")))
        .collect::<Vec<_>>();
    for start in 0..photos.len() {
        let mut g = GalleryNavigator::new(photos.clone());
        g.open(start).unwrap();
        assert_eq!(g.current_index(), start);
        for _ in 0..photos.len() {
            g.next();
        }
        assert_eq!(g.current_index(), start);
        for _ in 0..photos.len() {
            g.previous();
        }
        assert_eq!(g.current_index(), start);
    }
}

#[test]
fn gallery_three_image_walk() {
    let mut g = GalleryNavigator::new(vec![
        Photo::new("a.jpg", "a"),
        Photo::new("b.jpg", "b"),
        Photo::new("c.jpg", "c"),
    ]);
    g.open(0).unwrap();
    assert_eq!(g.previous().map(|s| s.index), Some(2));
    assert_eq!(g.next().map(|s| s.index), Some(0));
    let swap = g.next().unwrap();
    assert_eq!(swap.index, 1);
    assert_eq!(g.swap_ready(swap.generation).map(|p| p.alt.as_str()), Some("b"));
}

#[test]
fn empty_gallery_is_inert() {
    let mut g = GalleryNavigator::new(Vec::new());
    assert!(g.open(0).is_err());
    assert_eq!(g.next(), None);
    assert_eq!(g.previous(), None);
    assert!(!g.close());
}

#[test]
fn toggled_theme_survives_reload() {
    let mut pref = ThemePreference::resolve_initial(MemoryStore::default(), "theme", false);
    assert_eq!(pref.source(), ThemeSource::System);
    let toggled = pref.toggle();
    assert_eq!(toggled, Theme::Dark);

    let store = pref.into_store();
    assert_eq!(store.get("theme").as_deref(), Some("dark"));

    // The system now prefers light, but the stored choice wins.
    let reloaded = ThemePreference::resolve_initial(store, "theme", false);
    assert_eq!(reloaded.value(), Theme::Dark);
    assert_eq!(reloaded.source(), ThemeSource::Stored);
}
