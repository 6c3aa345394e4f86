//! Photo lightbox: overlay markup, click and keyboard bindings, and the
//! fade-out, swap, fade-in sequence between images.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, KeyboardEvent};

use crate::config::GalleryTiming;
use crate::error::{Error, GalleryError};
use crate::filter::Generation;
use crate::gallery::{Command, GalleryNavigator, Photo, Swap};
use crate::ports::{Animator, Frame};

use super::animate::{CssAnimator, EASE_OUT};
use super::dom::{html, js_err, listen, query, query_all, set_class, set_style};

const LIGHTBOX_HTML: &str = r#"
<div class="photo-lightbox" id="photo-lightbox" role="dialog" aria-modal="true" aria-label="Photo viewer">
    <div class="lightbox-content">
        <button class="lightbox-close" id="lightbox-close" aria-label="Close"><i class="fas fa-times"></i></button>
        <button class="lightbox-nav lightbox-prev" id="lightbox-prev" aria-label="Previous photo"><i class="fas fa-chevron-left"></i></button>
        <button class="lightbox-nav lightbox-next" id="lightbox-next" aria-label="Next photo"><i class="fas fa-chevron-right"></i></button>
        <img class="lightbox-image" id="lightbox-image" src="" alt="">
    </div>
</div>
"#;

const OPAQUE: Frame<'static> = Frame::new(1.0, "scale(1)");
const CLEAR: Frame<'static> = Frame::new(0.0, "scale(1)");
const ENTER_FROM: Frame<'static> = Frame::new(0.0, "scale(0.8)");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    FadingOut,
    FadingIn,
}

pub struct Lightbox {
    navigator: RefCell<GalleryNavigator>,
    overlay: HtmlElement,
    image: HtmlImageElement,
    body: Option<HtmlElement>,
    animator: CssAnimator,
    timing: GalleryTiming,
    phase: Cell<Phase>,
    /// Completion of the running fade; replacing it cancels the old one.
    fade: RefCell<Option<Timeout>>,
}

impl Lightbox {
    /// Build the overlay and bind every `.photo-wrapper`. `Ok(None)` when the
    /// page has no photos.
    pub fn mount(document: &Document, timing: GalleryTiming) -> Result<Option<Rc<Self>>, Error> {
        let root = document
            .document_element()
            .ok_or_else(|| Error::missing("html"))?;
        // Wrappers without an image are skipped here and when binding
        // clicks, so photo indices and wrappers stay aligned.
        let wrappers: Vec<(Element, HtmlImageElement)> = query_all(&root, ".photo-wrapper")
            .into_iter()
            .filter_map(|wrapper| {
                let img = query(&wrapper, "img")?.dyn_into::<HtmlImageElement>().ok()?;
                Some((wrapper, img))
            })
            .collect();
        let photos: Vec<Photo> = wrappers
            .iter()
            .map(|(_, img)| Photo::new(img.src(), img.alt()))
            .collect();
        if photos.is_empty() {
            log::debug!("lightbox: no photos, skipping");
            return Ok(None);
        }

        let body = document.body();
        let host = body.as_ref().ok_or_else(|| Error::missing("body"))?;
        host.insert_adjacent_html("beforeend", LIGHTBOX_HTML)
            .map_err(js_err)?;

        let by_id = |id: &str| {
            document
                .get_element_by_id(id)
                .ok_or_else(|| Error::missing(format!("#{id}")))
        };
        let overlay = by_id("photo-lightbox")?;
        let overlay = html(&overlay).ok_or_else(|| Error::missing("#photo-lightbox"))?;
        let image = by_id("lightbox-image")?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| Error::missing("img#lightbox-image"))?;

        let count = photos.len();
        let lightbox = Rc::new(Self {
            navigator: RefCell::new(GalleryNavigator::new(photos)),
            overlay,
            image,
            body,
            animator: CssAnimator,
            timing,
            phase: Cell::new(Phase::Idle),
            fade: RefCell::new(None),
        });

        for (index, (wrapper, _)) in wrappers.iter().enumerate() {
            let lb = Rc::clone(&lightbox);
            listen(wrapper, "click", move |_| lb.open(index))?;
        }
        lightbox.bind_controls(&by_id("lightbox-close")?, Command::Close)?;
        lightbox.bind_controls(&by_id("lightbox-prev")?, Command::Previous)?;
        lightbox.bind_controls(&by_id("lightbox-next")?, Command::Next)?;

        let lb = Rc::clone(&lightbox);
        listen(&lightbox.overlay, "click", move |event| {
            let on_backdrop = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .is_some_and(|t| t.id() == "photo-lightbox");
            if on_backdrop {
                lb.dispatch(Command::Close);
            }
        })?;

        let lb = Rc::clone(&lightbox);
        listen(document, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let command = lb.navigator.borrow().handle_key(&key);
            if let Some(command) = command {
                event.prevent_default();
                lb.dispatch(command);
            }
        })?;

        log::info!("lightbox: {count} photos wired");
        Ok(Some(lightbox))
    }

    fn bind_controls(self: &Rc<Self>, button: &Element, command: Command) -> Result<(), Error> {
        let lb = Rc::clone(self);
        listen(button, "click", move |event| {
            event.stop_propagation();
            lb.dispatch(command);
        })
    }

    pub fn is_open(&self) -> bool {
        self.navigator.borrow().is_open()
    }

    pub fn current_index(&self) -> usize {
        self.navigator.borrow().current_index()
    }

    pub fn dispatch(self: &Rc<Self>, command: Command) {
        match command {
            Command::Close => self.close(),
            Command::Previous => {
                let swap = self.navigator.borrow_mut().previous();
                self.navigate(swap);
            }
            Command::Next => {
                let swap = self.navigator.borrow_mut().next();
                self.navigate(swap);
            }
        }
    }

    pub fn open(self: &Rc<Self>, index: usize) {
        let opened = self.navigator.borrow_mut().open(index);
        let swap = match opened {
            Ok(swap) => swap,
            Err(GalleryError::OutOfRange { index, len }) => {
                log::warn!("lightbox: index {index} outside {len} photos");
                return;
            }
        };
        self.fade.borrow_mut().take();
        self.load(swap.generation);
        set_class(&self.overlay, "active", true);
        if let Some(body) = &self.body {
            set_style(body, "overflow", "hidden");
        }
        self.fade_in(ENTER_FROM, Duration::from_millis(self.timing.open_ms.into()));
    }

    pub fn close(&self) {
        if !self.navigator.borrow_mut().close() {
            return;
        }
        self.fade.borrow_mut().take();
        self.phase.set(Phase::Idle);
        set_class(&self.overlay, "active", false);
        if let Some(body) = &self.body {
            set_style(body, "overflow", "");
        }
    }

    fn navigate(self: &Rc<Self>, swap: Option<Swap>) {
        let Some(swap) = swap else { return };
        if self.phase.get() != Phase::Idle {
            // A fade is running, in either direction: cancel it and snap to
            // the new photo.
            self.fade.borrow_mut().take();
            self.swap_in(swap.generation);
            return;
        }
        let weak = Rc::downgrade(self);
        let generation = swap.generation;
        self.phase.set(Phase::FadingOut);
        let target: &HtmlElement = &self.image;
        let handle = self.animator.animate(
            target,
            OPAQUE,
            CLEAR,
            self.fade_duration(),
            "ease",
            Box::new(move || {
                if let Some(lb) = weak.upgrade() {
                    lb.swap_in(generation);
                }
            }),
        );
        *self.fade.borrow_mut() = Some(handle);
    }

    fn swap_in(self: &Rc<Self>, generation: Generation) {
        if !self.load(generation) {
            return;
        }
        self.fade_in(CLEAR, self.fade_duration());
    }

    /// Point the image at the photo for `generation`; false when superseded.
    fn load(&self, generation: Generation) -> bool {
        let navigator = self.navigator.borrow();
        let Some(photo) = navigator.swap_ready(generation) else {
            return false;
        };
        self.image.set_src(&photo.src);
        self.image.set_alt(&photo.alt);
        true
    }

    fn fade_in(self: &Rc<Self>, from: Frame<'static>, duration: Duration) {
        let weak = Rc::downgrade(self);
        self.phase.set(Phase::FadingIn);
        let target: &HtmlElement = &self.image;
        let handle = self.animator.animate(
            target,
            from,
            OPAQUE,
            duration,
            EASE_OUT,
            Box::new(move || {
                if let Some(lb) = weak.upgrade() {
                    lb.phase.set(Phase::Idle);
                }
            }),
        );
        *self.fade.borrow_mut() = Some(handle);
    }

    fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.timing.fade_ms.into())
    }
}
