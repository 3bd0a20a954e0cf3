use nalgebra::{Point3, Vector3};
use tri_tree::{Aabb, IntersectRayOptions, Ray, Settings, Sphere, TriTree};
use tri_tree_probe::demo_scene;

fn main() {
    let (vertices, indices) = demo_scene().into_parts();
    let tree = match TriTree::from_mesh(vertices, &indices, Settings::default()) {
        Ok(tree) => tree,
        Err(err) => {
            println!("Build failed: {err}");
            return;
        }
    };
    println!("Built tree over {} triangles", tree.size());
    print!("{}", tree.dump().lines().take(12).collect::<Vec<_>>().join("\n"));
    println!("\n...");

    // Straight down onto the axis-aligned cube
    let ray = Ray::new(Point3::new(1.0, 3.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
    match tree.intersect_ray(&ray, IntersectRayOptions::empty()) {
        Some(hit) => println!(
            "Ray hit triangle {} at distance {:.3}, position {:?}",
            hit.tri_index,
            hit.distance,
            tree.hit_position(&hit)
        ),
        None => println!("Ray missed"),
    }

    // Shadow ray from the floor towards a light above the scene
    let shadow = Ray::between(Point3::new(1.0, -0.99, 0.0), Point3::new(1.0, 5.0, 0.0));
    let blocked = tree
        .intersect_ray(&shadow, IntersectRayOptions::COHERENT_OCCLUSION)
        .is_some();
    println!("Floor point under the cube is {}", if blocked { "shadowed" } else { "lit" });

    let sphere = Sphere::new(Point3::new(0.0, 0.2, -1.2), 0.65);
    println!(
        "Sphere query: {} triangles",
        tree.intersect_sphere(&sphere).len()
    );

    let bounds = Aabb::new(Point3::new(0.5, -0.5, -0.5), Point3::new(1.5, 0.5, 0.5));
    println!("Box query: {} triangles", tree.intersect_box(&bounds).len());
}
