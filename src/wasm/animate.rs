use std::time::Duration;

use gloo_timers::callback::Timeout;
use web_sys::HtmlElement;

use crate::ports::{Animator, Frame};

use super::dom::set_style;

pub const EASE_OUT: &str = "cubic-bezier(0.215, 0.61, 0.355, 1)";
pub const EASE_IN: &str = "cubic-bezier(0.55, 0.055, 0.675, 0.19)";

/// Drives opacity/transform through CSS transitions. Completion is a timer;
/// dropping the returned [`Timeout`] cancels it.
#[derive(Debug, Default, Clone, Copy)]
pub struct CssAnimator;

impl Animator for CssAnimator {
    type Target = HtmlElement;
    type Handle = Timeout;

    fn animate(
        &self,
        target: &HtmlElement,
        from: Frame<'_>,
        to: Frame<'_>,
        duration: Duration,
        easing: &str,
        on_complete: Box<dyn FnOnce()>,
    ) -> Timeout {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);

        set_style(target, "transition", "none");
        apply(target, from);
        // Reading layout commits the start frame before the transition is set.
        let _ = target.offset_width();
        set_style(
            target,
            "transition",
            &format!("opacity {ms}ms {easing}, transform {ms}ms {easing}"),
        );
        apply(target, to);

        Timeout::new(ms, on_complete)
    }
}

/// Jump to `frame` with no transition.
pub fn set_frame(target: &HtmlElement, frame: Frame<'_>) {
    set_style(target, "transition", "none");
    apply(target, frame);
}

/// Opacity and transform as currently rendered, mid-transition included.
pub fn current_frame(target: &HtmlElement) -> Option<(f64, String)> {
    let style = web_sys::window()?.get_computed_style(target).ok().flatten()?;
    let opacity = style.get_property_value("opacity").ok()?.trim().parse().ok()?;
    let transform = style
        .get_property_value("transform")
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "none".to_string());
    Some((opacity, transform))
}

fn apply(target: &HtmlElement, frame: Frame<'_>) {
    set_style(target, "opacity", &frame.opacity.to_string());
    set_style(target, "transform", frame.transform);
}
