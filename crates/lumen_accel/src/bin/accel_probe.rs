// Builds a procedural scene, traces a pinhole camera's rays through it and
// reports build and traversal statistics.
// Run with: cargo run --release --features cli --bin accel_probe -- [grid_resolution] [image_size] [config.json]

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use lumen_accel::{Accel, AccelConfig};
use lumen_core::shapes;
use lumen_math::{Ray, Vec3};
use rayon::prelude::*;

const LIGHT: Vec3 = Vec3::new(2.0, 6.0, 3.0);

struct ProbeArgs {
    grid_resolution: u32,
    image_size: u32,
    config: AccelConfig,
}

fn parse_args() -> Result<ProbeArgs> {
    let args: Vec<String> = env::args().collect();

    let grid_resolution = match args.get(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid grid resolution '{}'", arg))?,
        None => 64,
    };
    let image_size = match args.get(2) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid image size '{}'", arg))?,
        None => 256,
    };
    let config = match args.get(3) {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("failed to parse config {}", path))?
        }
        None => AccelConfig::default(),
    };

    Ok(ProbeArgs {
        grid_resolution,
        image_size,
        config,
    })
}

/// A bumpy floor with a few boxes standing on it.
fn build_scene(accel: &mut Accel, resolution: u32) -> Result<()> {
    let mut floor = shapes::grid(
        Vec3::new(-4.0, 0.0, 4.0),
        Vec3::new(8.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -8.0),
        resolution,
    )
    .with_name("floor");
    for p in floor.positions.iter_mut() {
        p.y = 0.1 * (p.x * 1.7).sin() * (p.z * 1.3).cos();
    }
    floor.update_bounds();
    floor.compute_normals();
    accel.add_mesh(Arc::new(floor))?;

    for (i, (min, max)) in [
        (Vec3::new(-2.5, 0.0, -1.0), Vec3::new(-1.5, 1.0, 0.0)),
        (Vec3::new(-0.5, 0.0, -2.0), Vec3::new(0.5, 2.0, -1.0)),
        (Vec3::new(1.2, 0.0, 0.5), Vec3::new(2.4, 0.6, 1.7)),
    ]
    .into_iter()
    .enumerate()
    {
        accel.add_mesh(Arc::new(shapes::cuboid(min, max).with_name(format!("box{}", i))))?;
    }

    Ok(())
}

#[derive(Default)]
struct Tally {
    hits: usize,
    shadowed: usize,
    nodes_visited: usize,
    triangle_tests: usize,
    /// Largest gap between the interpolated hit point and `origin + t * direction`
    max_position_error: f32,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        self.hits += other.hits;
        self.shadowed += other.shadowed;
        self.nodes_visited += other.nodes_visited;
        self.triangle_tests += other.triangle_tests;
        self.max_position_error = self.max_position_error.max(other.max_position_error);
        self
    }
}

fn trace_pixel(accel: &Accel, x: u32, y: u32, size: u32) -> Tally {
    let eye = Vec3::new(0.0, 3.0, 7.0);
    let target = Vec3::new(0.0, 0.5, 0.0);
    let forward = (target - eye).normalize();
    let right = forward.cross(Vec3::Y).normalize();
    let up = right.cross(forward);

    let sx = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
    let sy = 1.0 - (y as f32 + 0.5) / size as f32 * 2.0;
    let direction = (forward + 0.6 * (sx * right + sy * up)).normalize();

    let ray = Ray::new(eye, direction);
    let (found, its, stats) = accel.trace(&ray, false);
    let mut tally = Tally {
        nodes_visited: stats.nodes_visited,
        triangle_tests: stats.total_triangle_tests(),
        ..Default::default()
    };

    if let (true, Some(its)) = (found, its) {
        tally.hits += 1;
        tally.max_position_error = (its.p - ray.at(its.t)).length();
        let offset = its.p + its.geo_frame.n * 1e-3;
        if accel.is_occluded(&Ray::segment(offset, LIGHT)) {
            tally.shadowed += 1;
        }
    }

    tally
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = parse_args()?;
    let mut accel = Accel::with_config(args.config)?;
    build_scene(&mut accel, args.grid_resolution)?;

    if accel.bounding_box().contains_point(LIGHT, false) {
        log::warn!("Light at {:?} sits inside the scene bounds", LIGHT);
    }

    let stats = accel.build()?;
    println!("Meshes:            {}", accel.mesh_count());
    println!("Triangles:         {}", stats.triangles);
    println!(
        "Nodes:             {} ({} internal, {} leaves)",
        stats.node_count(),
        stats.internal_nodes,
        stats.leaves
    );
    println!("Depth:             {}", stats.max_depth);
    println!("Refs per triangle: {:.2}", stats.duplication_factor());
    println!("Largest leaf:      {}", stats.max_leaf_triangles);
    println!("Build time:        {:.2?}", stats.build_time);

    let size = args.image_size;
    let start = Instant::now();
    let tally = (0..size * size)
        .into_par_iter()
        .map(|i| trace_pixel(&accel, i % size, i / size, size))
        .reduce(Tally::default, Tally::merge);
    let elapsed = start.elapsed();

    let primary = (size * size) as usize;
    println!("\nPrimary rays:      {}", primary);
    println!("Hits:              {}", tally.hits);
    println!("In shadow:         {}", tally.shadowed);
    println!("Max hit error:     {:.2e}", tally.max_position_error);
    println!(
        "Avg nodes/ray:     {:.1}",
        tally.nodes_visited as f64 / primary.max(1) as f64
    );
    println!(
        "Avg tris/ray:      {:.1}",
        tally.triangle_tests as f64 / primary.max(1) as f64
    );
    println!(
        "Trace time:        {:.2?} ({:.2} Mrays/s)",
        elapsed,
        (primary + tally.hits) as f64 / elapsed.as_secs_f64().max(1e-9) / 1e6
    );

    Ok(())
}
