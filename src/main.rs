/*

    Bounding box annotation demo: load a JSON scene of cuboid objects,
    software-render its id pass, run the box extraction pipeline and
    save a preview image with the boxes drawn in.

    @date: Nov, 2025
    @author: Bartu

*/

use std::collections::BTreeMap;
use std::{env, path::Path};

use boxcam::camera::Camera;
use boxcam::config::SceneConfig;
use boxcam::extractor::BoundingBoxCamera;
use boxcam::idbuffer::IdPalette;
use boxcam::image::ImageData;
use boxcam::mesh::extents_outside_frustum;
use boxcam::prelude::*;
use boxcam::scene::{ObjectRecord, SceneSnapshot};

/// Paint each object's projected footprint with its encoded id color,
/// far to near, so nearer objects overwrite the ones behind them.
/// A flat-shaded stand-in for the renderer's id pass; occlusion and
/// id/label semantics are what the pipeline actually needs.
fn render_id_pass(
    snapshot: &SceneSnapshot,
    labels: &BTreeMap<u32, u32>,
    camera: &Camera,
    palette: &IdPalette,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let mut buffer = palette.background().repeat((width * height) as usize);

    // Painter's algorithm: sort by view-space depth, farthest first
    // (view z is negative in front of the camera)
    let mut order: Vec<&ObjectRecord> = snapshot.objects.iter().collect();
    order.sort_by(|a, b| {
        let za = transform_point(camera.view_matrix(), &a.world_aabb.center()).z;
        let zb = transform_point(camera.view_matrix(), &b.world_aabb.center()).z;
        za.partial_cmp(&zb).unwrap_or(std::cmp::Ordering::Equal)
    });

    for object in order {
        let Some(&label) = labels.get(&object.id) else {
            continue;
        };
        if !camera.is_visible(&object.world_aabb) {
            continue;
        }

        let (min_vertex, max_vertex) = object.mesh.screen_extents(
            &object.transform,
            camera.view_matrix(),
            camera.projection_matrix(),
        );
        if extents_outside_frustum(&min_vertex, &max_vertex) {
            continue;
        }

        // ndc footprint to a pixel rectangle (y flips)
        let x0 = ((min_vertex.x.clamp(-1.0, 1.0) + 1.0) / 2.0 * width as Float) as u32;
        let x1 = ((max_vertex.x.clamp(-1.0, 1.0) + 1.0) / 2.0 * width as Float) as u32;
        let y0 = ((1.0 - max_vertex.y.clamp(-1.0, 1.0)) / 2.0 * height as Float) as u32;
        let y1 = ((1.0 - min_vertex.y.clamp(-1.0, 1.0)) / 2.0 * height as Float) as u32;

        let color = palette.encode(object.id, label);
        for y in y0..y1.min(height) {
            for x in x0..x1.min(width) {
                let index = ((y * width + x) as usize) * 3;
                buffer[index..index + 3].copy_from_slice(&color);
            }
        }
    }

    buffer
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging on console
    tracing_subscriber::fmt::init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    let json_path: String = if args.len() == 1 {
        warn!("No arguments were provided, setting default scene path...");
        String::from("./inputs/demo.json")
    } else if args.len() == 2 {
        args[1].clone()
    } else {
        error!("Usage: {} <scene>.json", args[0]);
        std::process::exit(1);
    };

    info!("Loading scene from {}...", json_path);
    let config = SceneConfig::load(Path::new(&json_path)).map_err(|e| {
        error!("Failed to load scene: {}", e);
        e
    })?;

    let camera = config.camera();
    let (snapshot, labels) = config.snapshot();
    let palette = IdPalette::new(config.background_label);
    info!(">> There are {} objects in the scene.", snapshot.objects.len());

    let (width, height) = (config.camera.image_width, config.camera.image_height);
    let mut box_camera = BoundingBoxCamera::new(width, height, config.background_label);
    box_camera.set_box_type(config.box_type);

    let _connection = box_camera.connect_new_boxes(|boxes| {
        info!("Frame published {} bounding boxes", boxes.len());
        for bbox in boxes {
            debug!(
                "label {}: center ({:.1}, {:.1}, {:.1}), size ({:.1}, {:.1}, {:.1})",
                bbox.label,
                bbox.center.x,
                bbox.center.y,
                bbox.center.z,
                bbox.size.x,
                bbox.size.y,
                bbox.size.z
            );
        }
    });

    // One frame: render the id pass, extract, draw, save
    let id_buffer = render_id_pass(&snapshot, &labels, &camera, &palette, width, height);
    box_camera.update(&snapshot, &camera, &id_buffer);

    let mut preview = ImageData::new(width, height, "boxes.png".to_string(), id_buffer);
    let green = Vector3::new(0.0, 255.0, 0.0);
    for bbox in box_camera.boxes() {
        box_camera.draw_bounding_box(preview.as_bytes_mut(), green, bbox);
    }
    preview.save_png("./")?;

    info!("Finished execution.");
    Ok(())
}
