use std::time::Instant;

use nalgebra::Point3;
use tri_tree::{IntersectRayOptions, Settings, SplitAlgorithm, TriTree};
use tri_tree_probe::{PinholeCamera, demo_scene};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn main() {
    println!("Generating scene...");
    let mesh = demo_scene();
    println!("Created {} triangles (2 cubes + sphere + floor)", mesh.tri_count());
    let (vertices, indices) = mesh.into_parts();

    let camera = PinholeCamera::new(Point3::new(0.0, 1.5, 5.0), Point3::new(0.0, -0.2, 0.0));
    let rays = camera.rays(WIDTH, HEIGHT);
    println!("Tracing {} x {} primary rays per tree", WIDTH, HEIGHT);

    for algorithm in SplitAlgorithm::ALL {
        let settings = Settings::default().with_algorithm(algorithm);
        let tree = match TriTree::from_mesh(vertices.clone(), &indices, settings) {
            Ok(tree) => tree,
            Err(err) => {
                println!("{algorithm}: build failed: {err}");
                continue;
            }
        };

        println!();
        println!(
            "{algorithm}: built in {:?}",
            tree.last_build_duration().unwrap_or_default()
        );
        println!("  {}", tree.stats(settings.values_per_leaf));

        let start = Instant::now();
        let single = rays
            .iter()
            .filter(|ray| tree.intersect_ray(ray, IntersectRayOptions::empty()).is_some())
            .count();
        let single_time = start.elapsed();

        let start = Instant::now();
        let hits = tree.intersect_rays(&rays, IntersectRayOptions::empty());
        let batch_time = start.elapsed();
        let batch = hits.iter().filter(|hit| hit.is_some()).count();

        let start = Instant::now();
        let occluded = tree
            .intersect_rays(&rays, IntersectRayOptions::COHERENT_OCCLUSION)
            .iter()
            .filter(|hit| hit.is_some())
            .count();
        let occlusion_time = start.elapsed();

        println!("  single:    {single} hits in {single_time:?}");
        println!("  batch:     {batch} hits in {batch_time:?}");
        println!("  occlusion: {occluded} hits in {occlusion_time:?}");
    }
}
