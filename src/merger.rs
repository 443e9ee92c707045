/*

    Merge the per-part boxes of multi-part models into one box per
    logical object. Parts are grouped by the parent name of their
    scene node; 2D boxes merge as a pixel union, 3D boxes are refit
    over the combined vertex cloud with PCA.

    The output order is the reverse of the grouping map's iteration
    order. That is deliberate (the original annotation tooling relies
    on it) and pinned by a test.

    @date: 18 Nov, 2025
    @author: bartu
*/

use std::collections::BTreeMap;

use crate::boxes::{BoundingBox, BoundingBoxType};
use crate::camera::Camera;
use crate::geometry::fit_oriented_box;
use crate::prelude::*;
use crate::scene::SceneSnapshot;

/// Union of a group of 2D boxes. A single box passes through
/// unchanged; multiple boxes merge in whole-pixel arithmetic.
pub fn merge_boxes_2d(boxes: &[&BoundingBox]) -> BoundingBox {
    if boxes.len() == 1 {
        return boxes[0].clone();
    }

    let mut min_x = u32::MAX;
    let mut max_x = 0u32;
    let mut min_y = u32::MAX;
    let mut max_y = 0u32;

    for bbox in boxes {
        let box_min_x = (bbox.center.x - bbox.size.x / 2.0) as u32;
        let box_max_x = (bbox.center.x + bbox.size.x / 2.0) as u32;
        let box_min_y = (bbox.center.y - bbox.size.y / 2.0) as u32;
        let box_max_y = (bbox.center.y + bbox.size.y / 2.0) as u32;

        min_x = min_x.min(box_min_x);
        max_x = max_x.max(box_max_x);
        min_y = min_y.min(box_min_y);
        max_y = max_y.max(box_max_y);
    }

    let width = max_x - min_x;
    let height = max_y - min_y;

    let mut merged = BoundingBox::new(boxes[0].box_type);
    merged.size = Vector3::new(width as Float, height as Float, 0.0);
    merged.center = Vector3::new(
        (min_x + width / 2) as Float,
        (min_y + height / 2) as Float,
        0.0,
    );
    merged.label = boxes[0].label;
    merged
}

// Group box ids by the parent name of their object. Ids the snapshot
// doesn't know end up under the empty name (shouldn't happen when the
// id buffer and the snapshot come from the same frame).
fn group_by_parent<'a>(
    ids: impl Iterator<Item = u32>,
    parents: &BTreeMap<u32, &'a str>,
) -> BTreeMap<&'a str, Vec<u32>> {
    let mut groups: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for id in ids {
        let parent = match parents.get(&id) {
            Some(parent) => *parent,
            None => {
                warn!("No parent name known for object id {}", id);
                ""
            }
        };
        groups.entry(parent).or_default().push(id);
    }
    groups
}

/// Merge 2D boxes that belong to the same parent. Output is pushed in
/// group iteration order, then reversed.
pub fn merge_multi_links_2d(
    boxes: &BTreeMap<u32, BoundingBox>,
    parents: &BTreeMap<u32, &str>,
) -> Vec<BoundingBox> {
    let groups = group_by_parent(boxes.keys().copied(), parents);

    let mut output = Vec::with_capacity(groups.len());
    for members in groups.values() {
        let group: Vec<&BoundingBox> = members.iter().map(|id| &boxes[id]).collect();
        output.push(merge_boxes_2d(&group));
    }

    output.reverse();
    output
}

/// Merge 3D boxes that belong to the same parent. A multi-part group
/// is refit from scratch: every member mesh is projected to camera
/// view space and a best-fit oriented box is computed over the whole
/// cloud. The label comes from the first member's visibility label.
pub fn merge_multi_links_3d(
    boxes: &BTreeMap<u32, BoundingBox>,
    labels: &BTreeMap<u32, u32>,
    snapshot: &SceneSnapshot,
    camera: &Camera,
) -> Vec<BoundingBox> {
    let parents = snapshot.parent_names();
    let groups = group_by_parent(boxes.keys().copied(), &parents);

    let mut output = Vec::with_capacity(groups.len());
    for members in groups.values() {
        if members.len() == 1 {
            output.push(boxes[&members[0]].clone());
            continue;
        }

        // Gather the view-space vertices of the whole model
        let mut vertices = Vec::new();
        for id in members {
            match snapshot.find(*id) {
                Some(object) => vertices.extend(
                    object
                        .mesh
                        .view_positions(&object.transform, camera.view_matrix()),
                ),
                None => warn!("Object id {} vanished from the snapshot during merge", id),
            }
        }

        let fitted = fit_oriented_box(&vertices);

        let mut merged = BoundingBox::new(BoundingBoxType::Box3D);
        merged.center = fitted.center;
        merged.orientation = fitted.orientation;
        merged.size = fitted.size;
        merged.label = labels.get(&members[0]).copied().unwrap_or_else(|| {
            warn!("No visibility label for object id {}", members[0]);
            0
        });
        output.push(merged);
    }

    output.reverse();
    output
}
