//! Recursive top-down construction.

use tracing::trace;

use crate::poly::Poly;
use crate::{Axis, Result};

use super::arena::NodeArena;
use super::node::{Node, NodeId};
use super::settings::Settings;
use super::split::{Partition, choose_split_location, is_bad_split};

/// Builds the subtree for `polys` into the already reserved slot `id`.
pub(crate) fn build_node(
    arena: &mut NodeArena,
    id: NodeId,
    mut polys: Vec<Poly>,
    settings: &Settings,
) -> Result<()> {
    let bounds = Poly::compute_bounds(&polys);

    if polys.len() <= settings.values_per_leaf {
        return make_leaf(arena, id, &polys);
    }

    let max_area = bounds.area() * settings.max_area_fraction;
    let mut partition = Partition::with_capacity(polys.len());

    for axis in Axis::ranked(&bounds.extent()) {
        let location = choose_split_location(&mut polys, &bounds, axis, settings);
        partition.fill(&polys, axis, location, max_area);

        if is_bad_split(
            polys.len(),
            partition.low.len(),
            partition.high.len(),
            settings.max_growth,
        ) {
            trace!(
                ?axis,
                location,
                count = polys.len(),
                low = partition.low.len(),
                high = partition.high.len(),
                "rejected split"
            );
            continue;
        }

        let (values, value_bounds) = arena.alloc_values(&partition.span)?;
        let first_child = arena.alloc_pair()?;
        arena.set(
            id,
            Node::internal(bounds, axis, location, first_child, values, value_bounds),
        );

        drop(polys);
        let Partition { low, high, .. } = partition;
        build_node(arena, first_child, low, settings)?;
        return build_node(arena, NodeId(first_child.0 + 1), high, settings);
    }

    trace!(count = polys.len(), "no usable split, making oversized leaf");
    make_leaf(arena, id, &polys)
}

fn make_leaf(arena: &mut NodeArena, id: NodeId, polys: &[Poly]) -> Result<()> {
    let (values, value_bounds) = arena.alloc_values(polys)?;
    arena.set(id, Node::leaf(value_bounds, values, value_bounds));
    Ok(())
}
