//! Split policy: where to cut a node, and whether the cut is worth keeping.

use tracing::trace;

use crate::poly::Poly;
use crate::{Aabb, Axis};

use super::settings::{SahParams, Settings, SplitAlgorithm};

/// The three lists a node's polys fall into for one candidate plane.
#[derive(Debug, Default)]
pub(crate) struct Partition {
    pub(crate) low: Vec<Poly>,
    pub(crate) high: Vec<Poly>,
    pub(crate) span: Vec<Poly>,
}

impl Partition {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            low: Vec::with_capacity(capacity),
            high: Vec::with_capacity(capacity),
            span: Vec::new(),
        }
    }

    /// Splits every poly against `coordinate[axis] == location`, replacing
    /// the previous contents.
    pub(crate) fn fill(&mut self, polys: &[Poly], axis: Axis, location: f32, max_area: f32) {
        self.low.clear();
        self.high.clear();
        self.span.clear();
        for poly in polys {
            poly.split(axis, location, max_area, &mut self.low, &mut self.high, &mut self.span);
        }
    }
}

/// Returns `true` if a split fails to make progress.
///
/// A split is bad when either side is empty, either side received every
/// poly, or clipping grew the combined child count beyond `max_growth`
/// times the parent's.
pub(crate) fn is_bad_split(count: usize, low: usize, high: usize, max_growth: f32) -> bool {
    low == 0
        || high == 0
        || low == count
        || high == count
        || (low + high) as f32 > count as f32 * max_growth
}

/// Chooses the split coordinate along `axis` for a node bounded by `bounds`.
///
/// May reorder `polys`.
pub(crate) fn choose_split_location(
    polys: &mut [Poly],
    bounds: &Aabb,
    axis: Axis,
    settings: &Settings,
) -> f32 {
    debug_assert!(!polys.is_empty());
    match settings.algorithm {
        SplitAlgorithm::MeanExtent => bounds.center()[axis.index()],
        SplitAlgorithm::MedianArea => median_area_location(polys, axis),
        SplitAlgorithm::MedianCount => {
            Poly::sort_by_high(polys, axis);
            polys[(polys.len() - 1) / 2].high()[axis.index()]
        }
        SplitAlgorithm::Sah => {
            if polys.len() <= settings.accurate_sah_count_threshold {
                sah_accurate_location(polys, bounds, axis, settings)
            } else {
                sah_fast_location(polys, bounds, axis, &settings.sah)
            }
        }
    }
}

/// Walks polys in order of upper extent until half of the total source
/// area has been passed.
fn median_area_location(polys: &mut [Poly], axis: Axis) -> f32 {
    let a = axis.index();
    Poly::sort_by_high(polys, axis);

    let total: f32 = polys.iter().map(Poly::area).sum();

    // Accumulated rounding needs a little slack.
    const EPSILON: f32 = 1e-4;
    let mut remaining = total * 0.5;
    for poly in polys.iter() {
        remaining -= poly.area();
        if remaining <= EPSILON {
            return poly.high()[a];
        }
    }

    trace!("median area walk ran off the end");
    polys[polys.len() - 1].high()[a]
}

/// Expected cost of a child holding `count` polys with bounds area `area`.
#[inline]
fn sah_cost(count: usize, area: f32, containing_area: f32, params: &SahParams) -> f32 {
    if count == 0 {
        0.0
    } else {
        params.tri_cost * count as f32 * area / containing_area + params.box_cost
    }
}

/// Evaluates every distinct poly boundary along `axis` by partitioning the
/// polys against it, keeping the cheapest.
fn sah_accurate_location(polys: &[Poly], bounds: &Aabb, axis: Axis, settings: &Settings) -> f32 {
    let a = axis.index();

    let mut positions: Vec<f32> = polys
        .iter()
        .flat_map(|p| [p.low()[a], p.high()[a]])
        .collect();
    positions.sort_by(f32::total_cmp);
    positions.dedup();

    let containing_area = positive_area(bounds);
    let max_area = settings.max_area_fraction * bounds.area();

    let mut partition = Partition::with_capacity(polys.len());
    let mut best_cost = f32::INFINITY;
    let mut best_position = positions[0];

    for &position in &positions {
        partition.fill(polys, axis, position, max_area);
        let params = &settings.sah;
        let cost = sah_cost(
            partition.low.len(),
            Poly::compute_bounds(&partition.low).area(),
            containing_area,
            params,
        ) + sah_cost(
            partition.span.len(),
            Poly::compute_bounds(&partition.span).area(),
            containing_area,
            params,
        ) + sah_cost(
            partition.high.len(),
            Poly::compute_bounds(&partition.high).area(),
            containing_area,
            params,
        );

        if cost < best_cost {
            best_cost = cost;
            best_position = position;
        }
    }

    best_position
}

/// Sorts polys by upper extent and sweeps cumulative bounds from both ends,
/// considering each distinct upper extent (except the largest) as a plane.
///
/// Candidates far from the median index pay a quadratic balance bias, and
/// candidates leaving either side with too few polys pay a flat penalty.
fn sah_fast_location(polys: &mut [Poly], bounds: &Aabb, axis: Axis, params: &SahParams) -> f32 {
    let a = axis.index();
    Poly::sort_by_high(polys, axis);
    let n = polys.len();

    let mut positions: Vec<f32> = Vec::new();
    let mut current = polys[0].high()[a];
    positions.push(current);
    for poly in &polys[1..] {
        let h = poly.high()[a];
        if h > current {
            current = h;
            positions.push(h);
        }
    }
    // The largest upper extent would leave the high side empty.
    positions.pop();

    if positions.is_empty() {
        // Every poly ends at the same coordinate; fall back to the middle.
        return bounds.center()[a];
    }

    let containing_area = positive_area(bounds);

    // Sweep from above: cost of everything strictly above each plane.
    let mut high_cost = vec![0.0f32; positions.len()];
    {
        let mut next = n - 1;
        let mut sweep = Aabb::empty();
        for (s, &h) in positions.iter().enumerate().rev() {
            while polys[next].high()[a] > h {
                sweep.grow(polys[next].bounds());
                next -= 1;
            }
            high_cost[s] = sah_cost(n - 1 - next, sweep.area(), containing_area, params);
        }
    }

    let min_per_side = (n as f32 * params.min_side_fraction) as usize;
    let half = n as f32 * 0.5;

    // Sweep from below, tracking the cheapest plane.
    let mut best_cost = f32::INFINITY;
    let mut best_position = positions[0];
    let mut next = 0;
    let mut sweep = Aabb::empty();
    for (s, &h) in positions.iter().enumerate() {
        while polys[next].high()[a] <= h {
            sweep.grow(polys[next].bounds());
            next += 1;
        }
        let low_cost = sah_cost(next, sweep.area(), containing_area, params);

        let offset = next as f32 - half;
        let bias = params.balance_bias * offset * offset;
        let avoid_small = if next < min_per_side || n - next < min_per_side {
            params.small_side_penalty
        } else {
            0.0
        };

        let cost = low_cost + high_cost[s] + bias + avoid_small;
        if cost < best_cost {
            best_cost = cost;
            best_position = h;
        }
    }

    best_position
}

/// Surface area usable as a cost denominator.
#[inline]
fn positive_area(bounds: &Aabb) -> f32 {
    let area = bounds.area();
    if area > 0.0 { area } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tri, VertexBuffer};
    use nalgebra::Point3;

    /// Unit right triangles in the z = 0 plane, one per x offset.
    fn make_row(offsets: &[f32]) -> Vec<Poly> {
        let points: Vec<Point3<f32>> = offsets
            .iter()
            .flat_map(|&x| {
                [
                    Point3::new(x, 0.0, 0.0),
                    Point3::new(x + 1.0, 0.0, 0.0),
                    Point3::new(x, 1.0, 0.0),
                ]
            })
            .collect();
        let buffer = VertexBuffer::from_positions(points);
        (0..offsets.len() as u32)
            .map(|i| {
                let tri = Tri::new(&buffer, [3 * i, 3 * i + 1, 3 * i + 2]).unwrap();
                Poly::new(i, &tri, &buffer)
            })
            .collect()
    }

    #[test]
    fn bad_split_rules() {
        assert!(is_bad_split(10, 0, 10, 1.8));
        assert!(is_bad_split(10, 10, 3, 1.8));
        assert!(is_bad_split(20, 19, 18, 1.8));
        assert!(!is_bad_split(10, 9, 9, 1.8));
        assert!(!is_bad_split(10, 9, 8, 1.8));
        assert!(!is_bad_split(10, 5, 5, 1.8));
    }

    #[test]
    fn mean_extent_uses_center() {
        let mut polys = make_row(&[0.0, 2.0, 4.0, 6.0]);
        let bounds = Poly::compute_bounds(&polys);
        let settings = Settings::default().with_algorithm(SplitAlgorithm::MeanExtent);
        let location = choose_split_location(&mut polys, &bounds, Axis::X, &settings);
        assert_eq!(location, 3.5);
    }

    #[test]
    fn median_count_uses_middle_upper_extent() {
        let mut polys = make_row(&[6.0, 0.0, 4.0, 2.0]);
        let bounds = Poly::compute_bounds(&polys);
        let settings = Settings::default().with_algorithm(SplitAlgorithm::MedianCount);
        let location = choose_split_location(&mut polys, &bounds, Axis::X, &settings);
        // Upper extents sorted: 1, 3, 5, 7; element (4 - 1) / 2 = 1.
        assert_eq!(location, 3.0);
    }

    #[test]
    fn median_area_splits_equal_areas_in_half() {
        let mut polys = make_row(&[0.0, 2.0, 4.0, 6.0]);
        let bounds = Poly::compute_bounds(&polys);
        let settings = Settings::default().with_algorithm(SplitAlgorithm::MedianArea);
        let location = choose_split_location(&mut polys, &bounds, Axis::X, &settings);
        assert_eq!(location, 3.0);
    }

    #[test]
    fn accurate_sah_separates_clusters() {
        // Two tight clusters far apart: the cheapest plane lies between them.
        let mut polys = make_row(&[0.0, 0.1, 0.2, 50.0, 50.1, 50.2]);
        let bounds = Poly::compute_bounds(&polys);
        let settings = Settings::default().with_accurate_sah_count_threshold(100);
        let location = choose_split_location(&mut polys, &bounds, Axis::X, &settings);
        assert!((1.1..=50.0).contains(&location), "location = {location}");
    }

    #[test]
    fn fast_sah_separates_clusters() {
        let offsets: Vec<f32> = (0..20)
            .map(|i| if i < 10 { i as f32 * 0.1 } else { 50.0 + i as f32 * 0.1 })
            .collect();
        let mut polys = make_row(&offsets);
        let bounds = Poly::compute_bounds(&polys);
        let settings = Settings::default().with_accurate_sah_count_threshold(0);
        let location = choose_split_location(&mut polys, &bounds, Axis::X, &settings);

        let mut partition = Partition::default();
        partition.fill(&polys, Axis::X, location, f32::INFINITY);
        assert_eq!(partition.low.len(), 10);
        assert_eq!(partition.high.len(), 10);
    }

    #[test]
    fn fast_sah_with_identical_upper_extents_falls_back_to_center() {
        let mut polys = make_row(&[0.0, 0.0, 0.0]);
        let bounds = Poly::compute_bounds(&polys);
        let location = sah_fast_location(&mut polys, &bounds, Axis::X, &SahParams::default());
        assert_eq!(location, 0.5);
    }

    #[test]
    fn fast_sah_penalties_shape_the_choice() {
        // A far outlier: the raw cost is cheapest when it is cut off alone.
        let offsets: Vec<f32> = std::iter::once(-100.0)
            .chain((0..9).map(|i| i as f32))
            .collect();
        let mut polys = make_row(&offsets);
        let bounds = Poly::compute_bounds(&polys);

        let unbiased = SahParams {
            balance_bias: 0.0,
            small_side_penalty: 0.0,
            ..SahParams::default()
        };
        let location = sah_fast_location(&mut polys, &bounds, Axis::X, &unbiased);
        assert_eq!(location, -99.0);

        // Fewer than n / 5 polys on a side pays the penalty.
        let location = sah_fast_location(&mut polys, &bounds, Axis::X, &SahParams::default());
        let low = polys.iter().filter(|p| p.high().x <= location).count();
        assert!(low >= 2 && polys.len() - low >= 2, "location = {location}, low = {low}");

        // A heavy balance bias pulls the plane to the median.
        let balanced = SahParams {
            balance_bias: 1.0,
            small_side_penalty: 0.0,
            ..SahParams::default()
        };
        let location = sah_fast_location(&mut polys, &bounds, Axis::X, &balanced);
        assert_eq!(location, 4.0);
    }

    #[test]
    fn partition_refill_replaces_contents() {
        let polys = make_row(&[0.0, 2.0, 4.0]);
        let mut partition = Partition::default();
        partition.fill(&polys, Axis::X, 1.5, f32::INFINITY);
        assert_eq!((partition.low.len(), partition.high.len()), (1, 2));
        partition.fill(&polys, Axis::X, 10.0, f32::INFINITY);
        assert_eq!((partition.low.len(), partition.high.len()), (3, 0));
    }
}
