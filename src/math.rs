use num_traits::Float;

/// Position of `x` inside `[lo, hi]` as a fraction in `0..=1`.
/// Values outside the segment are clamped; a degenerate segment yields zero.
#[inline]
pub fn segment_fraction<T: Float>(lo: T, hi: T, x: T) -> T {
    if hi <= lo {
        return T::zero();
    }

    ((x - lo) / (hi - lo)).max(T::zero()).min(T::one())
}

/// Index pair `(left, right)` of the nodes bracketing `x` in an ascending
/// slice of node positions. `x` at or before the first node, or at or after
/// the last one, brackets onto that node alone.
pub fn bracket<K: Ord + Copy>(nodes: &[K], x: K) -> Option<(usize, usize)> {
    let last = nodes.len().checked_sub(1)?;
    let right = nodes.partition_point(|&n| n < x);

    if right == 0 {
        Some((0, 0))
    } else if right > last {
        Some((last, last))
    } else if nodes[right] == x {
        Some((right, right))
    } else {
        Some((right - 1, right))
    }
}
