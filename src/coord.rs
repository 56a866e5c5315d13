use std::ops::{Add, Sub};

/// A square on a single board, column `x` and row `y`, both zero-based from
/// the top-left corner.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True for a one-square diagonal step to `to`.
    #[inline]
    pub fn is_step(self, to: Coord) -> bool {
        (to.x - self.x).abs() == 1 && (to.y - self.y).abs() == 1
    }

    /// True for a two-square diagonal leap to `to`.
    #[inline]
    pub fn is_jump(self, to: Coord) -> bool {
        (to.x - self.x).abs() == 2 && (to.y - self.y).abs() == 2
    }

    /// The square jumped over when leaping from `self` to `to`, each axis
    /// taken independently.
    #[inline]
    pub fn midpoint(self, to: Coord) -> Coord {
        Coord::new(split_diff(self.x, to.x), split_diff(self.y, to.y))
    }
}

impl Add for Coord {
    type Output = Coord;

    #[inline]
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    #[inline]
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The median integer between the given bounds. Works for either ordering.
#[inline]
pub fn split_diff(i: i32, to: i32) -> i32 {
    (i - to).abs() / 2 + i.min(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_diff_is_order_independent() {
        assert_eq!(split_diff(2, 4), 3);
        assert_eq!(split_diff(4, 2), 3);
        assert_eq!(split_diff(0, 2), 1);
        assert_eq!(split_diff(5, 3), 4);
        assert_eq!(split_diff(3, 3), 3);
    }

    #[test]
    fn step_and_jump_classification() {
        let from = Coord::new(2, 5);
        assert!(from.is_step(Coord::new(1, 4)));
        assert!(from.is_step(Coord::new(3, 6)));
        assert!(!from.is_step(Coord::new(2, 4)));
        assert!(from.is_jump(Coord::new(0, 3)));
        assert!(!from.is_jump(Coord::new(0, 4)));
        assert_eq!(Coord::new(2, 5).midpoint(Coord::new(0, 3)), Coord::new(1, 4));
    }
}
