use crate::matrix::TileMatrix;
use crate::region::Region;

/// Grow every tile outward by `margin` pixels.
///
/// Each side stops at the image border and at the midpoint of the gap to the
/// facing neighbour, so tiles never overlap. Shared edges between touching
/// tiles therefore stay where they are.
pub fn apply_breathing(
    tiles: &TileMatrix<Region>,
    margin: usize,
    width: usize,
    height: usize,
) -> TileMatrix<Region> {
    if margin == 0 {
        return tiles.clone();
    }
    tiles.map(|r, c, tile| {
        let left_limit = match c.checked_sub(1).and_then(|pc| tiles.get(r, pc)) {
            Some(prev) => midpoint(prev.right(), tile.x),
            None => 0,
        };
        let right_limit = match tiles.get(r, c + 1) {
            Some(next) => midpoint(tile.right(), next.x),
            None => width,
        };
        let top_limit = match r.checked_sub(1).and_then(|pr| tiles.get(pr, c)) {
            Some(prev) => midpoint(prev.bottom(), tile.y),
            None => 0,
        };
        let bottom_limit = match tiles.get(r + 1, c) {
            Some(next) => midpoint(tile.bottom(), next.y),
            None => height,
        };

        let x0 = tile.x.saturating_sub(margin).max(left_limit.min(tile.x));
        let y0 = tile.y.saturating_sub(margin).max(top_limit.min(tile.y));
        let x1 = (tile.right() + margin).min(right_limit.max(tile.right()));
        let y1 = (tile.bottom() + margin).min(bottom_limit.max(tile.bottom()));
        Region::new(x0, y0, x1 - x0, y1 - y0)
    })
}

/// Split point of the gap `[a, b)`; touching tiles (`a >= b`) give `b`.
fn midpoint(a: usize, b: usize) -> usize {
    if a >= b {
        b
    } else {
        a + (b - a) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_edges_grow_and_shared_edges_stay() {
        let tiles =
            TileMatrix::from_fn(2, 2, |r, c| Region::new(10 + c * 20, 10 + r * 20, 20, 20));
        let grown = apply_breathing(&tiles, 4, 100, 55);
        assert_eq!(grown.get(0, 0), Some(&Region::new(6, 6, 24, 24)));
        assert_eq!(grown.get(1, 1), Some(&Region::new(30, 30, 24, 24)));
        assert_eq!(grown.get(0, 1).map(|t| t.x), Some(30));
    }

    #[test]
    fn gaps_are_split_at_the_midpoint_and_clamped_to_the_image() {
        let tiles = TileMatrix::from_cells(
            1,
            2,
            vec![Region::new(2, 0, 10, 10), Region::new(18, 0, 10, 10)],
        );
        let grown = apply_breathing(&tiles, 5, 29, 10);
        let left = grown.get(0, 0).unwrap();
        let right = grown.get(0, 1).unwrap();
        assert_eq!((left.x, left.right()), (0, 15));
        assert_eq!((right.x, right.right()), (15, 29));
        assert!(left.right() <= right.x);
    }
}
