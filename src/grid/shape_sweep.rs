//! Swept-volume geometry for a moving shape stepping one grid cell at a time.
//!
//! A cell offset `(dx, dy)` is "swept" by a unit move if any part of the moving shape's bounding
//! rectangle passes over that offset cell while sliding from the origin cell to `(dx, dy)` over
//! `t in [0, 1]`. For diagonal moves the bounding-rectangle sweep over-approximates the shape, so
//! cells the shape's actual silhouette never crosses are pruned using the shape's extreme
//! vertices orthogonal to the direction of travel.

use std::collections::HashMap;

/// Time interval `[t_in, t_out)` during which a 1D segment sliding by `shift` over `t in [0,1]`
/// overlaps the integer cell `[i, i+1)`, for every `i` touched.
fn moving_segment_overlap_intervals(
    seg_start: f64,
    seg_end: f64,
    shift: f64,
) -> HashMap<i64, (f64, f64)> {
    let mut result = HashMap::new();
    let final_start = seg_start + shift;
    let final_end = seg_end + shift;
    let global_min = seg_start.min(final_start);
    let global_max = seg_end.max(final_end);

    let lo = global_min.floor() as i64 - 1;
    let hi = global_max.floor() as i64 + 2;
    for i in lo..hi {
        if shift == 0.0 {
            if seg_end > i as f64 && seg_start < i as f64 + 1.0 {
                result.insert(i, (0.0, 1.0));
            }
            continue;
        }
        let t1 = (i as f64 - seg_end) / shift;
        let t2 = (i as f64 + 1.0 - seg_start) / shift;
        let entry_time = t1.min(t2).max(0.0);
        let exit_time = t1.max(t2).min(1.0);
        if exit_time > entry_time {
            result.insert(i, (entry_time, exit_time));
        }
    }
    result
}

fn moving_rectangle_overlap_intervals(
    x_start: f64,
    x_end: f64,
    y_start: f64,
    y_end: f64,
    x_shift: f64,
    y_shift: f64,
) -> HashMap<(i64, i64), (f64, f64)> {
    let x_intervals = moving_segment_overlap_intervals(x_start, x_end, x_shift);
    let y_intervals = moving_segment_overlap_intervals(y_start, y_end, y_shift);
    let mut result = HashMap::new();
    for (&x_key, &(x_in, x_out)) in &x_intervals {
        for (&y_key, &(y_in, y_out)) in &y_intervals {
            if x_out > y_in && y_out > x_in {
                result.insert((x_key, y_key), (x_in.max(y_in), x_out.min(y_out)));
            }
        }
    }
    result
}

/// The two shape vertices with minimum and maximum projection onto the direction orthogonal to
/// `slope`. Assumes `slope` is neither zero nor infinite.
fn extreme_orthogonal_vertices(points: &[(f64, f64)], slope: f64) -> ((f64, f64), (f64, f64)) {
    let orthogonal = -1.0 / slope;
    let length = (1.0 + orthogonal * orthogonal).sqrt();
    let projection = |&(x, y): &(f64, f64)| x / length + y * orthogonal / length;
    let (min_idx, _) = points
        .iter()
        .map(projection)
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .unwrap();
    let (max_idx, _) = points
        .iter()
        .map(projection)
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .unwrap();
    let vertex_1 = points[min_idx];
    let vertex_2 = points[max_idx];
    if slope < 0.0 {
        (vertex_1, vertex_2)
    } else {
        (vertex_2, vertex_1)
    }
}

fn remove_untouched_intervals(
    intervals: &mut HashMap<(i64, i64), (f64, f64)>,
    slope: f64,
    absolute_shape: &[(f64, f64)],
) {
    let (min_vertex, max_vertex) = extreme_orthogonal_vertices(absolute_shape, slope);
    let shape_min_intercept = min_vertex.1 - slope * min_vertex.0;
    let shape_max_intercept = max_vertex.1 - slope * max_vertex.0;
    let (ltx_increment, gtx_increment) = if slope < 0.0 { (1.0, 0.0) } else { (0.0, 1.0) };

    intervals.retain(|&(x_cell, y_cell), _| {
        let cell_min_intercept = y_cell as f64 - slope * (x_cell as f64 + gtx_increment);
        let cell_max_intercept = (y_cell as f64 + 1.0) - slope * (x_cell as f64 + ltx_increment);
        cell_min_intercept < shape_max_intercept && shape_min_intercept < cell_max_intercept
    });
}

/// Cell offsets (relative to the origin cell) swept by `shape` (vertices relative to the shape's
/// center) while moving by `(x_shift, y_shift)` over `t in [0, 1]`.
pub fn swept_offsets(shape: &[(f64, f64)], x_shift: f64, y_shift: f64) -> Vec<(i64, i64)> {
    let x_start = shape.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_end = shape.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_start = shape.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_end = shape.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let mut intervals =
        moving_rectangle_overlap_intervals(x_start, x_end, y_start, y_end, x_shift, y_shift);

    if x_shift != 0.0 && y_shift != 0.0 {
        remove_untouched_intervals(&mut intervals, y_shift / x_shift, shape);
    }
    intervals.into_keys().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]
    }

    #[test]
    fn test_cardinal_move_sweeps_only_origin_and_target() {
        let offsets = swept_offsets(&unit_square(), 1.0, 0.0);
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(sorted, vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_diagonal_move_of_full_square_touches_both_corner_cells() {
        // A unit square sweeping diagonally from (0,0) to (1,1) fully covers both adjacent
        // corner cells along the way, which is exactly what lets a block at either corner veto
        // the diagonal move (the "corner squeeze" rule).
        let offsets = swept_offsets(&unit_square(), 1.0, 1.0);
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(sorted, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_no_move_sweeps_only_origin() {
        let offsets = swept_offsets(&unit_square(), 0.0, 0.0);
        assert_eq!(offsets, vec![(0, 0)]);
    }
}
