//! Lightbox navigation over the photo gallery.
//!
//! Each navigation call yields a [`Swap`]. The caller fades the current image
//! out and then asks [`GalleryNavigator::swap_ready`] which photo to load. A
//! newer call supersedes an older one, so only the latest swap ever reaches
//! the image element.

use crate::error::GalleryError;
use crate::filter::Generation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub src: String,
    pub alt: String,
}

impl Photo {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub generation: Generation,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Close,
    Previous,
    Next,
}

#[derive(Debug, Default)]
pub struct GalleryNavigator {
    photos: Vec<Photo>,
    current: usize,
    open: bool,
    generation: Generation,
}

impl GalleryNavigator {
    pub fn new(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Last index shown; kept across `close`.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Photo> {
        self.photos.get(self.current)
    }

    /// Open (or re-target an open lightbox) at `index`.
    pub fn open(&mut self, index: usize) -> Result<Swap, GalleryError> {
        if index >= self.photos.len() {
            return Err(GalleryError::OutOfRange {
                index,
                len: self.photos.len(),
            });
        }
        self.open = true;
        self.current = index;
        Ok(self.stamp())
    }

    pub fn next(&mut self) -> Option<Swap> {
        self.step(1)
    }

    pub fn previous(&mut self) -> Option<Swap> {
        let n = self.photos.len();
        self.step(n.saturating_sub(1))
    }

    fn step(&mut self, by: usize) -> Option<Swap> {
        let n = self.photos.len();
        if !self.open || n == 0 {
            return None;
        }
        self.current = (self.current + by) % n;
        Some(self.stamp())
    }

    fn stamp(&mut self) -> Swap {
        self.generation = self.generation.next();
        Swap {
            generation: self.generation,
            index: self.current,
        }
    }

    /// Returns whether the lightbox was open. Any pending swap is dropped.
    pub fn close(&mut self) -> bool {
        let was_open = self.open;
        self.open = false;
        self.generation = self.generation.next();
        was_open
    }

    /// Called once the outgoing image is fully transparent. `None` means a
    /// newer call superseded this swap or the lightbox closed meanwhile.
    pub fn swap_ready(&self, generation: Generation) -> Option<&Photo> {
        if !self.open || generation != self.generation {
            return None;
        }
        self.current()
    }

    /// Lightbox key bindings; inert while closed.
    pub fn handle_key(&self, key: &str) -> Option<Command> {
        if !self.open {
            return None;
        }
        match key {
            "Escape" => Some(Command::Close),
            "ArrowLeft" => Some(Command::Previous),
            "ArrowRight" => Some(Command::Next),
            _ => None,
        }
    }
}
