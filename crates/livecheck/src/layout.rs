//! Panel orientation.
//!
//! A container taller than it is wide stacks the editor above the info panel; anything else
//! puts them side by side. Sizes are in whatever unit the front-end measures, as long as
//! width and height use the same one.

/// Rendered size of the shell's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerSize {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl ContainerSize {
    /// Create a container size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// How the editor and the info panel share the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Editor on top, info panel below.
    Stacked,
    /// Editor on the left, info panel on the right.
    SideBySide,
}

impl Orientation {
    /// Pick the orientation for `size`.
    pub fn for_container(size: ContainerSize) -> Self {
        if size.height > size.width {
            Orientation::Stacked
        } else {
            Orientation::SideBySide
        }
    }
}

/// Tracks the current orientation and reports only regime crossings.
#[derive(Debug, Clone, Default)]
pub struct OrientationTracker {
    current: Option<Orientation>,
}

impl OrientationTracker {
    /// A tracker that has not seen any size yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current orientation (side by side until the first measurement).
    pub fn current(&self) -> Orientation {
        self.current.unwrap_or(Orientation::SideBySide)
    }

    /// Feed a measurement. Returns the new orientation if it changed.
    pub fn update(&mut self, size: ContainerSize) -> Option<Orientation> {
        let next = Orientation::for_container(size);
        if self.current == Some(next) {
            return None;
        }
        self.current = Some(next);
        Some(next)
    }

    /// Forget the last measurement.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
