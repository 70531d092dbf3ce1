use crate::geometry::Point;
use crate::handle::{HandleDescriptor, HandleLookup};

/// Nearest handle to `position` (diagram space) within `radius`.
///
/// Distances equal to the radius still count. Among equidistant handles the
/// first one in lookup order wins.
pub fn closest_handle<'a>(
    position: Point,
    radius: f32,
    lookup: &'a HandleLookup,
) -> Option<&'a HandleDescriptor> {
    let mut closest = None;
    let mut min_distance = f32::INFINITY;

    for handle in lookup.iter() {
        let distance = handle.position.distance(position);
        if distance <= radius && distance < min_distance {
            min_distance = distance;
            closest = Some(handle);
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;
    use crate::handle::HandleType;

    fn handle(node: &str, x: f32, y: f32) -> HandleDescriptor {
        HandleDescriptor {
            node_id: node.to_string(),
            handle_id: None,
            handle_type: HandleType::Target,
            position: point(x, y),
        }
    }

    #[test]
    fn picks_nearest_within_radius() {
        let lookup: HandleLookup = [handle("a", 100.0, 100.0), handle("b", 110.0, 100.0)]
            .into_iter()
            .collect();
        let found = closest_handle(point(108.0, 100.0), 20.0, &lookup);
        assert_eq!(found.map(|h| h.node_id.as_str()), Some("b"));
    }

    #[test]
    fn nothing_outside_radius() {
        let lookup: HandleLookup = [handle("a", 100.0, 100.0)].into_iter().collect();
        assert!(closest_handle(point(500.0, 500.0), 20.0, &lookup).is_none());
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let lookup: HandleLookup = [handle("a", 0.0, 0.0)].into_iter().collect();
        assert!(closest_handle(point(3.0, 4.0), 5.0, &lookup).is_some());
        assert!(closest_handle(point(3.0, 4.0), 4.99, &lookup).is_none());
    }

    #[test]
    fn ties_resolve_to_first_in_lookup_order() {
        let lookup: HandleLookup = [handle("left", 90.0, 100.0), handle("right", 110.0, 100.0)]
            .into_iter()
            .collect();
        let found = closest_handle(point(100.0, 100.0), 20.0, &lookup);
        assert_eq!(found.map(|h| h.node_id.as_str()), Some("left"));
    }

    #[test]
    fn empty_lookup_has_no_closest() {
        let lookup = HandleLookup::default();
        assert!(closest_handle(point(0.0, 0.0), 100.0, &lookup).is_none());
    }
}
