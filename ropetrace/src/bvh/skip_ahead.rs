use super::{BvhNodeKind, BvhNodes};

/// Flags nodes whose left child covers a large enough share of their surface
/// area that testing the child separately is likely a wasted box test.
///
/// Expects ids in traversal order.
pub fn run(nodes: &mut BvhNodes, cmp: f32) {
    let mut skips = 0;

    for id in nodes.ids() {
        nodes[id].skips_to_here = skips;
        nodes[id].skip_next_left = false;

        let BvhNodeKind::Internal { left_id, .. } = nodes[id].kind else {
            continue;
        };

        if nodes[left_id].is_leaf() {
            continue;
        }

        let area = nodes[id].bounds.surface_area();

        let ratio = if area > 0.0 {
            nodes[left_id].bounds.surface_area() / area
        } else {
            1.0
        };

        if ratio >= cmp {
            nodes[id].skip_next_left = true;
            skips += 1;
        }
    }
}
