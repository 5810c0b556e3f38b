//! Plain value types describing detector channel windows.

/// A closed interval `[lower, upper]` of integer positions.
///
/// `lower <= upper` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    /// Lower bound, inclusive.
    pub lower: i64,
    /// Upper bound, inclusive.
    pub upper: i64,
}

impl Range {
    /// Interval from its two bounds.
    pub const fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }
}

/// An anode window paired with a cathode window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// Anode-side window.
    pub anode: Range,
    /// Cathode-side window.
    pub cathode: Range,
}

impl Region {
    /// Region from its two windows.
    pub const fn new(anode: Range, cathode: Range) -> Self {
        Self { anode, cathode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_plain_data() {
        let r = Region::new(Range::new(10, 20), Range::new(30, 5));
        let copy = r;
        assert_eq!(copy, r);
        // Reversed bounds are carried as given.
        assert_eq!(r.cathode.lower, 30);
        assert_eq!(r.cathode.upper, 5);
        assert_ne!(r, Region::default());
    }
}
