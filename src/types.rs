//! Core types for spark-menu.
//!
//! These types define the foundation that everything builds on.
//! They flow through the render pipeline and define what the presentation
//! layer understands.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque identifier of a viewer (the player looking at a menu).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerId(pub u64);

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer#{}", self.0)
    }
}

/// Identifier of one `ViewRuntime` instance.
///
/// Unique for the lifetime of the process. Signals remember the runtime that
/// created them, so a handle can never be used against another runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeId(u64);

static NEXT_RUNTIME_ID: AtomicU64 = AtomicU64::new(1);

impl RuntimeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_RUNTIME_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "runtime#{}", self.0)
    }
}

/// Index of a component inside a runtime's component arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A slot index inside a window, row-major.
pub type SlotIndex = usize;

// =============================================================================
// Geometry
// =============================================================================

/// A rectangle on the slot grid, in absolute window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotRect {
    pub column: u16,
    pub row: u16,
    pub width: u16,
    pub height: u16,
}

impl SlotRect {
    pub const fn new(column: u16, row: u16, width: u16, height: u16) -> Self {
        Self { column, row, width, height }
    }

    /// True if the two rectangles share at least one slot.
    pub fn intersects(&self, other: &SlotRect) -> bool {
        if self.width == 0 || self.height == 0 || other.width == 0 || other.height == 0 {
            return false;
        }
        self.column < other.column + other.width
            && other.column < self.column + self.width
            && self.row < other.row + other.height
            && other.row < self.row + self.height
    }

    /// True if `inner` lies completely inside this rectangle.
    pub fn contains(&self, inner: &SlotRect) -> bool {
        inner.column >= self.column
            && inner.row >= self.row
            && inner.column + inner.width <= self.column + self.width
            && inner.row + inner.height <= self.row + self.height
    }

    /// Every slot index covered by this rectangle, for a grid `columns` wide.
    pub fn slots(&self, columns: u16) -> impl Iterator<Item = SlotIndex> + '_ {
        let columns = columns as usize;
        (self.row..self.row + self.height).flat_map(move |row| {
            (self.column..self.column + self.width)
                .map(move |column| row as usize * columns + column as usize)
        })
    }

    /// Base slot of this rectangle for a grid `columns` wide.
    pub fn base_slot(&self, columns: u16) -> SlotIndex {
        self.row as usize * columns as usize + self.column as usize
    }
}

// =============================================================================
// Slot Content
// =============================================================================

/// Render-ready description of what a slot shows.
///
/// This is the opaque payload handed to the presentation layer. The core never
/// interprets it beyond equality checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlotContent {
    /// Item/appearance key (e.g. "minecraft:lime_concrete").
    pub item: String,
    /// Display name.
    pub name: Option<String>,
    /// Additional description lines.
    pub lore: Vec<String>,
    /// Stack size shown in the slot.
    pub amount: u8,
}

impl SlotContent {
    /// Create content for the given item key with an amount of 1.
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            name: None,
            lore: Vec::new(),
            amount: 1,
        }
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a lore line.
    pub fn lore_line(mut self, line: impl Into<String>) -> Self {
        self.lore.push(line.into());
        self
    }

    /// Set the amount.
    pub fn amount(mut self, amount: u8) -> Self {
        self.amount = amount;
        self
    }
}

/// A sound cue played to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    pub key: String,
    pub volume: f32,
    pub pitch: f32,
}

impl Sound {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            volume: 1.0,
            pitch: 1.0,
        }
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }
}

// =============================================================================
// Component State Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Lifecycle flags of a component state.
    ///
    /// Combine with bitwise OR: `StateFlags::MOUNTED | StateFlags::RENDERED`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StateFlags: u8 {
        const NONE = 0;
        const MOUNTED = 1 << 0;
        const CONSTRUCTED = 1 << 1;
        const RENDERED = 1 << 2;
        const ANIMATING = 1 << 3;
        const UNMOUNTED = 1 << 4;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects() {
        let a = SlotRect::new(0, 0, 2, 2);
        let b = SlotRect::new(1, 1, 2, 2);
        let c = SlotRect::new(2, 0, 1, 1);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!a.intersects(&SlotRect::new(0, 0, 0, 0)));
    }

    #[test]
    fn test_rect_contains() {
        let window = SlotRect::new(0, 0, 9, 3);
        assert!(window.contains(&SlotRect::new(8, 2, 1, 1)));
        assert!(!window.contains(&SlotRect::new(8, 2, 2, 1)));
        assert!(!window.contains(&SlotRect::new(0, 3, 1, 1)));
    }

    #[test]
    fn test_rect_slots() {
        let rect = SlotRect::new(1, 1, 2, 2);
        let slots: Vec<_> = rect.slots(9).collect();
        assert_eq!(slots, vec![10, 11, 19, 20]);
        assert_eq!(rect.base_slot(9), 10);
    }

    #[test]
    fn test_slot_content_builder() {
        let content = SlotContent::new("stone").named("Stone").lore_line("hard").amount(3);
        assert_eq!(content.item, "stone");
        assert_eq!(content.name.as_deref(), Some("Stone"));
        assert_eq!(content.lore, vec!["hard".to_string()]);
        assert_eq!(content.amount, 3);
    }
}
