// ABOUTME: Per-axis size bounds for a single panel.
// ABOUTME: Also defines layout priority used when space is handed out unevenly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeConstraint {
    pub minimum: f64,
    pub maximum: f64,
    pub current: f64,
}

impl SizeConstraint {
    /// Bounds are normalised: a negative minimum becomes 0, and a maximum
    /// below the minimum is raised to it.
    pub fn new(minimum: f64, maximum: f64, current: f64) -> Self {
        let minimum = if minimum.is_finite() { minimum.max(0.0) } else { 0.0 };
        let maximum = if maximum.is_nan() { f64::INFINITY } else { maximum.max(minimum) };
        Self {
            minimum,
            maximum,
            current,
        }
    }

    pub fn unbounded(current: f64) -> Self {
        Self::new(0.0, f64::INFINITY, current)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        self.minimum.max(self.maximum.min(value))
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }

    /// How much the current size may still shrink
    pub fn shrink_room(&self) -> f64 {
        (self.current - self.minimum).max(0.0)
    }

    /// How much the current size may still grow
    pub fn grow_room(&self) -> f64 {
        (self.maximum - self.current).max(0.0)
    }
}

impl Default for SizeConstraint {
    fn default() -> Self {
        Self::unbounded(0.0)
    }
}

/// Which panels soak up size changes first when layout is not proportional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPriority {
    Low,
    #[default]
    Normal,
    High,
}
