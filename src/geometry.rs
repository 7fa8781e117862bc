// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// A position in the planar reference frame shared by all input geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance to another point.
    ///
    /// Every nearest-node comparison in the crate goes through this function,
    /// so that all spatial index implementations rank candidates identically.
    #[inline]
    pub fn distance_squared(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// An ordered sequence of points describing a single road segment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline(pub Vec<Point>);

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Returns the first and last point, or `None` if the polyline
    /// has fewer than two points and thus can't describe a segment.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match self.0.as_slice() {
            [first, .., last] => Some((*first, *last)),
            _ => None,
        }
    }

    /// Total arc length - the sum of distances between consecutive points.
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
