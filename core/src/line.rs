//! The one-dimensional slide/merge reduction every move is built from.

use crate::bonus::BonusKind;

/// Largest tile that can still double without overflowing a cell.
pub const MAX_MERGEABLE: u32 = u32::MAX / 2;

/// Whether a cell value may merge with an equal neighbour.
pub fn is_mergeable(value: u32) -> bool {
    value != 0 && value <= MAX_MERGEABLE && !BonusKind::is_bonus_value(value)
}

/// Shift and merge a line toward index 0, in place.
/// Returns the points earned from merges.
///
/// Algorithm:
/// 1. Compress: drop the zeros, keeping order
/// 2. Merge: scan from the front, combining each equal pair once and
///    skipping past the merged tile
/// 3. Pad the tail with zeros
pub fn shift_and_merge(line: &mut [u32]) -> u64 {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();

    let mut reward = 0;
    let mut write_idx = 0;
    let mut read_idx = 0;
    while read_idx < tiles.len() {
        let current = tiles[read_idx];
        let next = tiles.get(read_idx + 1).copied();
        if next == Some(current) && is_mergeable(current) {
            let merged = current * 2;
            line[write_idx] = merged;
            reward += u64::from(merged);
            read_idx += 2;
        } else {
            line[write_idx] = current;
            read_idx += 1;
        }
        write_idx += 1;
    }

    line[write_idx..].fill(0);
    reward
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce(mut line: Vec<u32>) -> (Vec<u32>, u64) {
        let reward = shift_and_merge(&mut line);
        (line, reward)
    }

    #[test]
    fn test_compress_simple() {
        assert_eq!(reduce(vec![0, 2, 0, 4, 0]), (vec![2, 4, 0, 0, 0], 0));
    }

    #[test]
    fn test_all_zeros() {
        assert_eq!(reduce(vec![0; 5]), (vec![0; 5], 0));
    }

    #[test]
    fn test_merge_with_gaps() {
        assert_eq!(reduce(vec![2, 0, 0, 2, 0]), (vec![4, 0, 0, 0, 0], 4));
    }

    #[test]
    fn test_left_bias() {
        assert_eq!(reduce(vec![2, 2, 2, 0]), (vec![4, 2, 0, 0], 4));
        assert_eq!(reduce(vec![2, 2, 2]), (vec![4, 2, 0], 4));
    }

    #[test]
    fn test_no_double_merge() {
        assert_eq!(reduce(vec![4, 4, 4, 4]), (vec![8, 8, 0, 0], 16));
        // the fresh 4 must not fold into the following 4
        assert_eq!(reduce(vec![2, 2, 4, 0, 0]), (vec![4, 4, 0, 0, 0], 4));
    }

    #[test]
    fn test_two_pairs_five_wide() {
        assert_eq!(reduce(vec![8, 8, 16, 16, 2]), (vec![16, 32, 2, 0, 0], 48));
    }

    #[test]
    fn test_bonus_tiles_slide_but_never_merge() {
        let star = BonusKind::Star.value();
        assert_eq!(
            reduce(vec![0, star, star, 2, 2]),
            (vec![star, star, 4, 0, 0], 4)
        );
    }

    #[test]
    fn test_top_tiles_do_not_overflow() {
        let top = 1u32 << 31;
        assert!(!is_mergeable(top));
        assert!(is_mergeable(1 << 30));
        assert_eq!(reduce(vec![0, top, top, 0, 0]), (vec![top, top, 0, 0, 0], 0));
        assert_eq!(reduce(vec![1 << 30, 1 << 30, 0]), (vec![top, 0, 0], u64::from(top)));
    }

    #[test]
    fn test_already_packed_line_unchanged() {
        assert_eq!(reduce(vec![2, 4, 8, 16, 32]), (vec![2, 4, 8, 16, 32], 0));
    }
}
