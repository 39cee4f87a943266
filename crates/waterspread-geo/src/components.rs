//! Connected-component labeling over boolean masks

use ndarray::Array2;
use std::collections::VecDeque;

use waterspread_core::models::ComponentParams;

/// Group set cells into connected regions, in row-major order of each region's first cell.
///
/// `offsets` are the (row, col) steps that make two cells adjacent.
pub fn connected_regions(
    mask: &Array2<bool>,
    offsets: &[(isize, isize)],
) -> Vec<Vec<(usize, usize)>> {
    let (rows, cols) = mask.dim();
    let mut visited = Array2::from_elem((rows, cols), false);
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    for ((r, c), &set) in mask.indexed_iter() {
        if !set || visited[[r, c]] {
            continue;
        }

        let mut region = Vec::new();
        visited[[r, c]] = true;
        queue.push_back((r, c));

        while let Some((row, col)) = queue.pop_front() {
            region.push((row, col));
            for &(dr, dc) in offsets {
                let (Some(nr), Some(nc)) =
                    (row.checked_add_signed(dr), col.checked_add_signed(dc))
                else {
                    continue;
                };
                if nr < rows && nc < cols && mask[[nr, nc]] && !visited[[nr, nc]] {
                    visited[[nr, nc]] = true;
                    queue.push_back((nr, nc));
                }
            }
        }

        regions.push(region);
    }

    regions
}

/// Label each connected component of the mask with a distinct positive id.
///
/// Components with more than `max_size` pixels are left unlabeled.
pub fn label_components(mask: &Array2<bool>, params: &ComponentParams) -> Array2<Option<u32>> {
    let mut labels = Array2::from_elem(mask.dim(), None);
    let mut next = 1u32;
    let mut oversized = 0usize;

    for region in connected_regions(mask, &params.kernel.offsets()) {
        if region.len() > params.max_size {
            oversized += 1;
            continue;
        }
        for cell in region {
            labels[cell] = Some(next);
        }
        next += 1;
    }

    if oversized > 0 {
        tracing::debug!(
            "{} component(s) exceed {} pixels and were left unlabeled",
            oversized,
            params.max_size
        );
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;
    use waterspread_core::models::Kernel;

    const FOUR: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

    fn eight() -> Vec<(isize, isize)> {
        Kernel::square(1).offsets()
    }

    #[test]
    fn test_diagonal_cells_split_under_four_connectivity() {
        let mask = array![[true, false], [false, true]];
        assert_eq!(connected_regions(&mask, &FOUR).len(), 2);
        assert_eq!(connected_regions(&mask, &eight()).len(), 1);
    }

    #[test]
    fn test_region_with_hole() {
        let mask = array![
            [true, true, true],
            [true, false, true],
            [true, true, true],
        ];
        let regions = connected_regions(&mask, &FOUR);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 8);
        assert_eq!(regions[0][0], (0, 0));
    }

    #[test]
    fn test_labels_are_distinct() {
        let mask = array![[true, false, true], [true, false, false]];
        let labels = label_components(&mask, &ComponentParams::default());
        assert_eq!(labels[[0, 0]], Some(1));
        assert_eq!(labels[[1, 0]], Some(1));
        assert_eq!(labels[[0, 2]], Some(2));
        assert_eq!(labels[[0, 1]], None);
    }

    #[test]
    fn test_oversized_components_are_unlabeled() {
        let mask = array![[true, true, true, false, true]];
        let params = ComponentParams { kernel: Kernel::plus(1), max_size: 2 };
        let labels = label_components(&mask, &params);
        assert!(labels.row(0).iter().take(3).all(Option::is_none));
        assert_eq!(labels[[0, 4]], Some(1));
    }

    proptest! {
        #[test]
        fn prop_regions_partition_set_cells(cells in prop::collection::vec(any::<bool>(), 36)) {
            let mask = Array2::from_shape_vec((6, 6), cells).unwrap();
            let set = mask.iter().filter(|&&v| v).count();

            let four = connected_regions(&mask, &FOUR);
            let eight = connected_regions(&mask, &eight());

            prop_assert_eq!(four.iter().map(Vec::len).sum::<usize>(), set);
            prop_assert_eq!(eight.iter().map(Vec::len).sum::<usize>(), set);
            prop_assert!(eight.len() <= four.len());
        }
    }
}
