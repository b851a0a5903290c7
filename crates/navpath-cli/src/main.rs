//! Command-line harness for navpath queries
//!
//! Loads a JSON surface asset (surface plus region map) and runs path,
//! corridor or validation queries against it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use log::info;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use navpath::{NavSurface, NavSurfaceQuery, PathService, PathfinderConfig, PolyRef, SurfaceAsset};
use navpath_common::Error;

/// A CLI utility for pathfinding on baked navigation surfaces
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute waypoints between two points
    FindPath {
        /// Surface asset file (JSON)
        #[clap(long, value_parser)]
        mesh: PathBuf,

        /// Start position (x,y,z)
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        start: Vec3,

        /// End position (x,y,z)
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        end: Vec3,

        /// Region id of the start point; polygons are located by position if omitted
        #[clap(long, requires = "end_region", allow_hyphen_values = true)]
        start_region: Option<i32>,

        /// Region id of the end point
        #[clap(long, requires = "start_region", allow_hyphen_values = true)]
        end_region: Option<i32>,

        /// Weight of the straight-line heuristic
        #[clap(long, default_value = "0.3")]
        heuristic_weight: f32,

        /// Maximum number of polygons a search may touch (unbounded if omitted)
        #[clap(long)]
        max_search_nodes: Option<usize>,

        /// Output path file
        #[clap(long, value_parser)]
        output: Option<PathBuf>,
    },

    /// Print the polygon corridor between two points
    Corridor {
        /// Surface asset file (JSON)
        #[clap(long, value_parser)]
        mesh: PathBuf,

        /// Start position (x,y,z)
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        start: Vec3,

        /// End position (x,y,z)
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        end: Vec3,

        /// Weight of the straight-line heuristic
        #[clap(long, default_value = "0.3")]
        heuristic_weight: f32,
    },

    /// Load a surface asset and report its structure
    Validate {
        /// Surface asset file (JSON)
        #[clap(long, value_parser)]
        mesh: PathBuf,
    },
}

/// Parse a comma-separated vector
fn parse_vector(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').collect();

    if parts.len() != 3 {
        return Err(format!(
            "Vector must have 3 components, got {}",
            parts.len()
        ));
    }

    let x = parts[0].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = parts[1].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let z = parts[2].trim().parse::<f32>().map_err(|e| e.to_string())?;

    Ok(Vec3::new(x, y, z))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::FindPath {
            mesh,
            start,
            end,
            start_region,
            end_region,
            heuristic_weight,
            max_search_nodes,
            output,
        } => {
            let asset = load_asset(&mesh)?;
            let mut config = PathfinderConfig::new().with_heuristic_weight(heuristic_weight);
            if let Some(max_nodes) = max_search_nodes {
                config = config.with_max_search_nodes(max_nodes);
            }
            let regions = start_region.zip(end_region);

            println!("Finding path from {} to {}...", start, end);
            let Some(path) = find_path(&asset, start, end, regions, config)? else {
                println!("No path found");
                return Ok(());
            };

            match output {
                Some(output_path) => {
                    println!("Saving path to {}...", output_path.display());
                    let mut file = File::create(&output_path).with_context(|| {
                        format!("Failed to create output file: {}", output_path.display())
                    })?;
                    write_path(&mut file, start, end, &path)?;
                }
                None => write_path(&mut io::stdout().lock(), start, end, &path)?,
            }
            Ok(())
        }
        Commands::Corridor {
            mesh,
            start,
            end,
            heuristic_weight,
        } => {
            let asset = load_asset(&mesh)?;
            let corridor = find_corridor(&asset.surface, start, end, heuristic_weight)
                .context("Failed to find polygon corridor")?;

            println!("Corridor with {} polygons:", corridor.len());
            for (i, poly) in corridor.iter().enumerate() {
                println!("{}: {}", i, poly);
            }
            Ok(())
        }
        Commands::Validate { mesh } => {
            let asset = load_asset(&mesh)?;
            let report = SurfaceReport::new(&asset);
            println!("Vertices:   {}", report.vertices);
            println!("Polygons:   {}", report.polygons);
            println!("Links:      {}", report.links);
            println!("Islands:    {}", report.islands);
            println!("Regions:    {}", report.regions);
            Ok(())
        }
    }
}

/// Load and validate a surface asset
fn load_asset(path: &Path) -> Result<SurfaceAsset> {
    info!("Loading navigation surface from {}", path.display());
    let asset = SurfaceAsset::load_from_json(path)
        .with_context(|| format!("Failed to load navigation surface from {}", path.display()))?;
    info!(
        "Loaded {} polygons and {} regions",
        asset.surface.poly_count(),
        asset.regions.len()
    );
    Ok(asset)
}

/// Compute a path through the facade, by region ids when given and by
/// position otherwise
fn find_path(
    asset: &SurfaceAsset,
    start: Vec3,
    end: Vec3,
    regions: Option<(i32, i32)>,
    config: PathfinderConfig,
) -> Result<Option<Vec<Vec3>>> {
    let service = PathService::with_config(&asset.surface, asset.regions.clone(), config)?;

    let path = match regions {
        Some((start_region, end_region)) => service.compute_path(start, end, start_region, end_region)?,
        None => service.compute_path_by_position(start, end)?,
    };
    Ok(path)
}

/// Locate both polygons by position and run the corridor search, keeping the
/// reason a search failed
fn find_corridor(
    surface: &NavSurface,
    start: Vec3,
    end: Vec3,
    heuristic_weight: f32,
) -> navpath_common::Result<Vec<PolyRef>> {
    let start_pos = start.to_array();
    let end_pos = end.to_array();

    let start_ref = surface
        .find_poly_containing(&start_pos)
        .ok_or_else(|| Error::Pathfinding(format!("start {} is off the surface", start)))?;
    let end_ref = surface
        .find_poly_containing(&end_pos)
        .ok_or_else(|| Error::Pathfinding(format!("end {} is off the surface", end)))?;

    let config = PathfinderConfig::new().with_heuristic_weight(heuristic_weight);
    config.validate()?;

    let mut query = NavSurfaceQuery::with_config(surface, &config);
    let corridor = query.try_find_polygon_corridor(start_ref, end_ref, &end_pos, heuristic_weight)?;
    Ok(corridor)
}

/// Write waypoints as `x,y,z` lines after a short header
fn write_path<W: Write>(out: &mut W, start: Vec3, end: Vec3, path: &[Vec3]) -> io::Result<()> {
    writeln!(out, "# Path from {} to {}", start, end)?;
    writeln!(out, "# {} waypoints", path.len())?;
    for waypoint in path {
        writeln!(out, "{},{},{}", waypoint.x, waypoint.y, waypoint.z)?;
    }
    Ok(())
}

/// Structural summary printed by `validate`
#[derive(Debug, PartialEq, Eq)]
struct SurfaceReport {
    vertices: usize,
    polygons: usize,
    links: usize,
    islands: usize,
    regions: usize,
}

impl SurfaceReport {
    fn new(asset: &SurfaceAsset) -> Self {
        let surface = &asset.surface;
        let links = surface
            .polys()
            .iter()
            .map(|poly| poly.neighbor_refs().count())
            .sum::<usize>()
            / 2;

        Self {
            vertices: surface.vertex_count(),
            polygons: surface.poly_count(),
            links,
            islands: count_islands(surface),
            regions: asset.regions.len(),
        }
    }
}

/// Number of connected components of the adjacency graph
fn count_islands(surface: &NavSurface) -> usize {
    let mut seen = vec![false; surface.poly_count()];
    let mut islands = 0;

    for root in 0..surface.poly_count() {
        if seen[root] {
            continue;
        }
        islands += 1;
        seen[root] = true;

        let mut queue = VecDeque::from([PolyRef::new(root as u32)]);
        while let Some(poly) = queue.pop_front() {
            for neighbor in surface.neighbors(poly) {
                if !seen[neighbor.index()] {
                    seen[neighbor.index()] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    islands
}
