//! Circle geometry, constraint validation and scoring.
//!
//! All positions are relative to the container's center. A [`Configuration`]
//! always holds exactly three circles; slot `i` carries radius
//! `Parameters::radii[i]` for the lifetime of a run.

use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of circles placed by the optimizer.
pub const CIRCLE_COUNT: usize = 3;

/// Unordered slot pairs, in the order they are checked.
pub const PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// A circle positioned relative to the container center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Circle {
    /// Center x coordinate.
    pub x: f64,
    /// Center y coordinate.
    pub y: f64,
    /// Radius.
    pub r: f64,
}

impl Circle {
    /// Creates a new circle.
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    /// Distance from the container center to this circle's center.
    pub fn center_distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Center-to-center distance to another circle.
    pub fn distance_to(&self, other: &Circle) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Edge-to-edge distance to another circle (negative when overlapping).
    pub fn edge_distance(&self, other: &Circle) -> f64 {
        self.distance_to(other) - self.r - other.r
    }

    /// Returns a copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.r)
    }
}

/// Positions of the three circles at one point of the search.
///
/// A configuration is a plain value: copying it is a bitwise copy, so search
/// loops keep independent snapshots without any aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Configuration {
    /// Circles indexed by slot.
    pub circles: [Circle; CIRCLE_COUNT],
}

impl Configuration {
    /// Creates a configuration from three circles.
    pub fn new(circles: [Circle; CIRCLE_COUNT]) -> Self {
        Self { circles }
    }

    /// Creates a configuration with every circle at the container center.
    pub fn centered(params: &Parameters) -> Self {
        Self::from_positions(params, [(0.0, 0.0); CIRCLE_COUNT])
    }

    /// Creates a configuration from slot positions, taking radii from `params`.
    pub fn from_positions(params: &Parameters, positions: [(f64, f64); CIRCLE_COUNT]) -> Self {
        let mut circles = [Circle::default(); CIRCLE_COUNT];
        for (slot, circle) in circles.iter_mut().enumerate() {
            let (x, y) = positions[slot];
            *circle = Circle::new(x, y, params.radii[slot]);
        }
        Self { circles }
    }

    /// Iterates over the circles in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter()
    }

    /// Edge clearance for each pair in [`PAIRS`] order.
    pub fn pair_clearances(&self) -> [f64; 3] {
        PAIRS.map(|(i, j)| self.circles[i].edge_distance(&self.circles[j]))
    }
}

impl Index<usize> for Configuration {
    type Output = Circle;

    fn index(&self, slot: usize) -> &Circle {
        &self.circles[slot]
    }
}

impl IndexMut<usize> for Configuration {
    fn index_mut(&mut self, slot: usize) -> &mut Circle {
        &mut self.circles[slot]
    }
}

/// Problem parameters: container radius, circle radii and margin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Parameters {
    /// Radius of the container circle.
    pub container_radius: f64,
    /// Radius of each slot.
    pub radii: [f64; CIRCLE_COUNT],
    /// Minimum gap between a circle's edge and the container boundary.
    pub margin: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            container_radius: 100.0,
            radii: [20.0, 15.0, 25.0],
            margin: 5.0,
        }
    }
}

impl Parameters {
    /// Creates parameters from explicit values.
    pub fn new(container_radius: f64, radii: [f64; CIRCLE_COUNT], margin: f64) -> Self {
        Self {
            container_radius,
            radii,
            margin,
        }
    }

    /// Sets the container radius.
    pub fn with_container_radius(mut self, radius: f64) -> Self {
        self.container_radius = radius;
        self
    }

    /// Sets the circle radii.
    pub fn with_radii(mut self, radii: [f64; CIRCLE_COUNT]) -> Self {
        self.radii = radii;
        self
    }

    /// Sets the margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Largest center offset at which slot `slot` still respects the margin.
    ///
    /// Negative when the circle cannot fit at all.
    pub fn max_offset(&self, slot: usize) -> f64 {
        self.container_radius - self.radii[slot] - self.margin
    }

    /// Sum of the three radii.
    pub fn total_radius(&self) -> f64 {
        self.radii.iter().sum()
    }
}

/// Returns true if the circle stays inside the container with the margin.
///
/// Touching the margin boundary exactly is allowed.
pub fn is_contained(circle: &Circle, params: &Parameters) -> bool {
    circle.center_distance() + circle.r + params.margin <= params.container_radius
}

/// Checks containment for every circle, then non-overlap for every pair.
///
/// Short-circuits on the first violation. Both tests are boundary inclusive,
/// so circles may touch the margin boundary or each other exactly.
pub fn is_valid(config: &Configuration, params: &Parameters) -> bool {
    if !config.iter().all(|c| is_contained(c, params)) {
        return false;
    }

    PAIRS.iter().all(|&(i, j)| {
        let (a, b) = (&config[i], &config[j]);
        a.distance_to(b) >= a.r + b.r
    })
}

/// Minimum edge-to-edge distance over the three circle pairs.
///
/// Only meaningful for configurations already known to be valid; use
/// [`score`] to fold the validity check in.
pub fn clearance(config: &Configuration) -> f64 {
    config
        .pair_clearances()
        .into_iter()
        .fold(f64::INFINITY, f64::min)
}

/// Objective value: [`clearance`] when valid, negative infinity otherwise.
pub fn score(config: &Configuration, params: &Parameters) -> f64 {
    if is_valid(config, params) {
        clearance(config)
    } else {
        f64::NEG_INFINITY
    }
}
