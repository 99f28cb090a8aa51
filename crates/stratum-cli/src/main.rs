//! stratum CLI - inspect scenes and trace rays through them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use stratum::{LineSegment, Point3, Ray, SceneDescription, ShapeRegistry, Vec3, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stratum")]
#[command(about = "Hierarchical CSG geometry queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the volumes of a scene with their volume and mass
    Info {
        /// Scene file (.toml)
        scene: PathBuf,
    },
    /// Print the material segments crossed by one or more rays
    Segments {
        /// Scene file (.toml)
        scene: PathBuf,
        /// Ray origin as x,y,z (cm)
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: Vec3,
        /// Ray direction as x,y,z; repeat for several rays
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, required = true)]
        direction: Vec<Vec3>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Sphere-trace a ray towards the world's daughters
    March {
        /// Scene file (.toml)
        scene: PathBuf,
        /// Ray origin as x,y,z (cm)
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: Vec3,
        /// Ray direction as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        direction: Vec3,
    },
}

/// One segment as printed by `segments --json`.
#[derive(Debug, Serialize)]
struct SegmentReport<'a> {
    material: &'a str,
    volume: &'a str,
    start: [f64; 3],
    end: [f64; 3],
    length: f64,
}

#[derive(Debug, Serialize)]
struct RayReport<'a> {
    origin: [f64; 3],
    direction: [f64; 3],
    segments: Vec<SegmentReport<'a>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { scene } => {
            show_info(&load(&scene)?)?;
        }
        Commands::Segments {
            scene,
            origin,
            direction,
            json,
        } => {
            let world = load(&scene)?;
            let rays = direction
                .iter()
                .map(|d| Ray::new(Point3::from(origin), *d))
                .collect::<Result<Vec<_>, _>>()
                .context("invalid ray")?;
            print_segments(&world, &rays, json)?;
        }
        Commands::March {
            scene,
            origin,
            direction,
        } => {
            let world = load(&scene)?;
            let ray = Ray::new(Point3::from(origin), direction).context("invalid ray")?;
            let result = world.sphere_trace(&ray);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<World> {
    let scene = SceneDescription::from_path(path)
        .with_context(|| format!("loading {}", path.display()))?;
    let world = scene
        .build(&ShapeRegistry::with_builtin_shapes())
        .with_context(|| format!("building {}", path.display()))?;
    info!(scene = %path.display(), "scene loaded");
    Ok(world)
}

fn show_info(world: &World) -> Result<()> {
    let root = world.root_volume();
    println!("World: {} ({})", root.name(), root.shape().kind_name());
    println!(
        "Settings: max_steps={} epsilon={} surface_epsilon={}",
        world.settings().max_steps,
        world.settings().epsilon,
        world.settings().surface_epsilon
    );
    println!();
    println!(
        "{:<20} {:<12} {:<10} {:>9} {:>14} {:>14}",
        "volume", "material", "shape", "daughters", "volume [cm3]", "mass [g]"
    );

    let mut volumes: Vec<_> = world.store().logical_volumes().collect();
    volumes.sort_by(|a, b| a.1.name().cmp(b.1.name()));
    for (id, lv) in volumes {
        let (volume, mass) = match (world.volume(id), world.mass(id)) {
            (Ok(v), Ok(m)) => (format!("{v:.4}"), format!("{m:.4}")),
            _ => ("undefined".to_string(), "undefined".to_string()),
        };
        println!(
            "{:<20} {:<12} {:<10} {:>9} {:>14} {:>14}",
            lv.name(),
            lv.material().name(),
            lv.shape().kind_name(),
            lv.daughters().len(),
            volume,
            mass
        );
    }
    Ok(())
}

fn print_segments(world: &World, rays: &[Ray], json: bool) -> Result<()> {
    let results = world.line_segments_batch(rays);

    if json {
        let reports = rays
            .iter()
            .zip(&results)
            .map(|(ray, segments)| {
                Ok(RayReport {
                    origin: components(&ray.origin.coords),
                    direction: components(&ray.direction),
                    segments: segments
                        .iter()
                        .map(|s| report(world, s))
                        .collect::<Result<_>>()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for (ray, segments) in rays.iter().zip(&results) {
        println!(
            "ray ({}, {}, {}) -> ({}, {}, {})",
            ray.origin.x,
            ray.origin.y,
            ray.origin.z,
            ray.direction.x,
            ray.direction.y,
            ray.direction.z
        );
        if segments.is_empty() {
            println!("  misses the world");
            continue;
        }
        let mut total = 0.0;
        for s in segments {
            let r = report(world, s)?;
            total += r.length;
            println!("  {:<20} {:<12} {:>12.6} cm", r.volume, r.material, r.length);
        }
        println!("  {:<33} {:>12.6} cm", "total", total);
    }
    Ok(())
}

fn report<'a>(world: &'a World, segment: &'a LineSegment) -> Result<SegmentReport<'a>> {
    let volume = world.logical_volume(segment.shape_id)?;
    Ok(SegmentReport {
        material: segment.material.name(),
        volume: volume.name(),
        start: components(&segment.start.coords),
        end: components(&segment.end.coords),
        length: segment.length(),
    })
}

fn components(v: &Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Parse `x,y,z` into a vector.
fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("`{s}`: {e}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("`{s}`: expected three comma-separated numbers")),
    }
}
