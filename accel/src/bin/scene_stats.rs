//! Builds the Cornell box demo scene and logs the packed buffer sizes.
//!
//! ```text
//! RUST_LOG=info cargo run -p accel --features cli -- [--grid <n>] [--normals]
//! ```

use std::sync::Arc;

use accel::{Material, MeshModel, Scene, SceneConfig, Transform, shapes};
use anyhow::Context;
use maths::{Quat, Vec3};

const SCALE: f32 = 5.0;
const WALL: f32 = 0.01 * SCALE;

struct Args {
    grid: u32,
    normals: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = pico_args::Arguments::from_env();
    let parsed = Args {
        grid: args
            .opt_value_from_str("--grid")
            .context("--grid expects a whole number")?
            .unwrap_or(2),
        normals: args.contains("--normals"),
    };

    let rest = args.finish();
    if !rest.is_empty() {
        anyhow::bail!("Unexpected arguments: {rest:?}");
    }
    Ok(parsed)
}

fn wall(id: u32, base_color: Vec3, roughness: f32, metallic: f32) -> Arc<Material> {
    Arc::new(
        Material::new(id)
            .with_base_color(base_color)
            .with_roughness(roughness)
            .with_metallic(metallic),
    )
}

fn add_cornell_box(scene: &mut Scene) -> anyhow::Result<()> {
    let cube = Arc::new(shapes::cube(0));
    let white = Vec3::ONE;

    let walls = [
        (
            wall(0, white, 0.25, 0.75),
            Vec3::ZERO,
            Vec3::new(SCALE, WALL, SCALE),
        ),
        (
            wall(1, Vec3::new(0.0, 1.0, 0.0), 0.75, 0.25),
            Vec3::new(0.5 * SCALE, 0.5 * SCALE, 0.0),
            Vec3::new(WALL, SCALE, SCALE),
        ),
        (
            wall(2, Vec3::new(1.0, 0.0, 0.0), 0.75, 0.25),
            Vec3::new(-0.5 * SCALE, 0.5 * SCALE, 0.0),
            Vec3::new(WALL, SCALE, SCALE),
        ),
        (
            wall(3, white, 0.75, 0.25),
            Vec3::new(0.0, SCALE, 0.0),
            Vec3::new(SCALE, WALL, SCALE),
        ),
        (
            wall(4, white, 0.75, 0.25),
            Vec3::new(0.0, 0.5 * SCALE, -0.5 * SCALE),
            Vec3::new(SCALE, SCALE, WALL),
        ),
    ];

    for (material, position, scale) in walls {
        let placement = Transform::from_position(position).with_scale(scale);
        scene.add_model(MeshModel::new(Arc::clone(&cube), material).with_placement(&placement))?;
    }

    let light = Arc::new(
        Material::new(5)
            .with_emissive_color(Vec3::splat(20.0))
            .with_roughness(1.0)
            .with_metallic(0.0),
    );
    let placement = Transform::from_position(Vec3::new(0.0, SCALE - 0.005, 0.0))
        .with_scale(Vec3::new(SCALE * 0.3, WALL, SCALE * 0.3));
    scene.add_model(MeshModel::new(cube, light).with_placement(&placement))?;

    Ok(())
}

/// An `n x n` grid on the floor alternating grey cubes and mirror quads.
fn add_floor_grid(scene: &mut Scene, n: u32) -> anyhow::Result<()> {
    if n == 0 {
        return Ok(());
    }

    let cube = Arc::new(shapes::cube(1));
    let quad = Arc::new(shapes::quad(2));
    let grey = Arc::new(Material::new(6).with_base_color(Vec3::splat(0.5)).with_roughness(0.9));
    let mirror = Arc::new(Material::new(7).with_roughness(0.05).with_metallic(1.0));

    let spacing = 0.8 * SCALE / n as f32;
    let size = 0.5 * spacing;
    let start = -0.5 * spacing * (n - 1) as f32;

    for row in 0..n {
        for col in 0..n {
            let position = Vec3::new(
                start + col as f32 * spacing,
                0.5 * size + 0.5 * WALL,
                start + row as f32 * spacing,
            );
            let rotation = Quat::from_rotation_y((row * n + col) as f32 * 0.4);
            let placement = Transform::from_position(position)
                .with_rotation(rotation)
                .with_scale(Vec3::splat(size));
            let (mesh, material) = if (row + col) % 2 == 0 {
                (&cube, &grey)
            } else {
                (&quad, &mirror)
            };
            scene
                .add_model(MeshModel::new(Arc::clone(mesh), Arc::clone(material)).with_placement(&placement))
                .with_context(|| format!("Failed to place grid cell ({row}, {col})"))?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let mut scene = Scene::with_config(SceneConfig {
        generate_missing_normals: args.normals,
    });
    add_cornell_box(&mut scene)?;
    add_floor_grid(&mut scene, args.grid)?;

    let buffers = scene.build_scene_data();
    log::info!("vertices:         {:>8} bytes", buffers.vertex_bytes().len());
    log::info!("vertex info:      {:>8} bytes", buffers.vertex_info_bytes().len());
    log::info!("BLAS nodes:       {:>8} bytes", buffers.blas_node_bytes().len());
    log::info!("triangle indices: {:>8} bytes", buffers.triangle_index_bytes().len());
    log::info!("instances:        {:>8} bytes", buffers.instance_bytes().len());
    log::info!("materials:        {:>8} bytes", buffers.material_bytes().len());
    log::info!("TLAS nodes:       {:>8} bytes", buffers.tlas_node_bytes().len());

    if let Some(root) = scene.tlas().root() {
        log::info!(
            "Scene bounds: {:?} .. {:?}",
            root.bounds.min.to_array(),
            root.bounds.max.to_array()
        );
    }

    Ok(())
}
