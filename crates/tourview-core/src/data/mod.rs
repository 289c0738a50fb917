//! Problem data model
//!
//! Points are loaded once per problem file and never mutated afterwards.
//! Tours refer to points by zero-based index, where `index == id - 1`.

pub mod tsplib;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A city/node in problem space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// 1-based node id from the problem file
    pub id: usize,
}

impl Point {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self { x, y, id }
    }

    /// Zero-based index a tour uses to refer to this point
    #[inline]
    pub fn tour_index(&self) -> Option<usize> {
        self.id.checked_sub(1)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Ordered set of points in file order (not tour order)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
    by_tour_index: HashMap<usize, usize>,
}

impl PointSet {
    /// Build a point set, indexing every point by `id - 1`.
    ///
    /// If two points share an id the first one wins the index entry.
    pub fn new(points: Vec<Point>) -> Self {
        let mut by_tour_index = HashMap::with_capacity(points.len());
        for (position, point) in points.iter().enumerate() {
            if let Some(index) = point.tour_index() {
                by_tour_index.entry(index).or_insert(position);
            }
        }
        Self {
            points,
            by_tour_index,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Resolve a tour index to the point whose `id - 1` equals it
    pub fn resolve(&self, tour_index: usize) -> Option<&Point> {
        self.by_tour_index
            .get(&tour_index)
            .map(|&position| &self.points[position])
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl From<Vec<Point>> for PointSet {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// Ordered visiting sequence of zero-based point indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour(Vec<usize>);

impl Tour {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }

    /// Total length of the open path through the tour, in problem units.
    ///
    /// Returns `None` when an index does not resolve to a point.
    pub fn path_length(&self, points: &PointSet) -> Option<f64> {
        let mut length = 0.0;
        for pair in self.0.windows(2) {
            let from = points.resolve(pair[0])?;
            let to = points.resolve(pair[1])?;
            length += from.distance_to(to);
        }
        Some(length)
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for index in &self.0 {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", index)?;
            first = false;
        }
        Ok(())
    }
}

impl From<Vec<usize>> for Tour {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

/// Result of a successful solve: a tour and its objective value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub tour: Tour,
    pub tour_length: f64,
}

impl Solution {
    pub fn new(tour: Tour, tour_length: f64) -> Self {
        Self { tour, tour_length }
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tour)?;
        write!(f, "{}", self.tour_length)
    }
}

/// A loaded problem: metadata plus its point set
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub name: String,
    pub comment: String,
    pub points: PointSet,
}

impl Problem {
    pub fn new(name: impl Into<String>, comment: impl Into<String>, points: PointSet) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            points,
        }
    }

    /// Number of nodes in the problem
    pub fn dimension(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> PointSet {
        PointSet::new(vec![
            Point::new(1, 0.0, 0.0),
            Point::new(2, 10.0, 0.0),
            Point::new(3, 10.0, 10.0),
            Point::new(4, 0.0, 10.0),
        ])
    }

    #[test]
    fn test_resolve_uses_id_minus_one() {
        let points = PointSet::new(vec![Point::new(7, 1.0, 2.0), Point::new(3, 4.0, 5.0)]);
        assert_eq!(points.resolve(6).map(|p| p.x), Some(1.0));
        assert_eq!(points.resolve(2).map(|p| p.y), Some(5.0));
        assert!(points.resolve(0).is_none());
    }

    #[test]
    fn test_point_with_id_zero_is_not_indexed() {
        let points = PointSet::new(vec![Point::new(0, 1.0, 1.0)]);
        assert_eq!(points.len(), 1);
        assert!(points.resolve(0).is_none());
    }

    #[test]
    fn test_path_length() {
        let tour = Tour::new(vec![0, 1, 2, 3, 0]);
        assert_eq!(tour.path_length(&square()), Some(40.0));

        let broken = Tour::new(vec![0, 9]);
        assert_eq!(broken.path_length(&square()), None);
    }

    #[test]
    fn test_solution_display() {
        let solution = Solution::new(Tour::new(vec![0, 2, 1]), 12.5);
        assert_eq!(solution.to_string(), "0 2 1\n12.5");
    }
}
