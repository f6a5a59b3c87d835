//! `plane-align`: estimate the rotation between two scans from their planes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use plane_align::{align_clouds, AlignParams, AlignmentReport};
use plane_types::{PointCloud, SegmentedPlane};
use tracing_subscriber::EnvFilter;

/// Align two point clouds by segmenting planes and matching their normals.
#[derive(Parser)]
#[command(name = "plane-align")]
#[command(about = "Plane-based point cloud alignment", long_about = None)]
#[command(version)]
struct Cli {
    /// Source cloud (.xyz, .txt, .pts or .pcd)
    source: PathBuf,

    /// Target cloud (.xyz, .txt, .pts or .pcd)
    target: PathBuf,

    /// Size of the initial seed neighbourhood
    #[arg(long, default_value_t = 20)]
    k: usize,

    /// Neighbours used to estimate missing normals
    #[arg(long, default_value_t = AlignParams::DEFAULT_NORMAL_K)]
    normal_k: usize,

    /// Pair planes through their feature histograms
    #[arg(long)]
    descriptor: bool,

    /// Ignore planes smaller than this area (30 when given without value)
    #[arg(long, value_name = "AREA", num_args = 0..=1, default_missing_value = "30")]
    min_surface: Option<f64>,

    /// Keep at most this many of the largest planes per cloud
    #[arg(long)]
    max_planes: Option<usize>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let source = PointCloud::load(&cli.source)
        .with_context(|| format!("failed to load {}", cli.source.display()))?;
    let target = PointCloud::load(&cli.target)
        .with_context(|| format!("failed to load {}", cli.target.display()))?;

    let mut params = AlignParams::new()
        .with_normal_k(cli.normal_k)
        .with_descriptor(cli.descriptor);
    params.segmentation = params.segmentation.with_k(cli.k);
    params.registration = params.registration.with_max_planes(cli.max_planes);
    if let Some(area) = cli.min_surface {
        params.registration = params.registration.with_min_surface(area);
    }

    let report = align_clouds(&source, &target, &params).context("alignment failed")?;
    print_report(&report);
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_planes(label: &str, planes: &[SegmentedPlane]) {
    println!("{label}: {} planes", planes.len());
    for (i, plane) in planes.iter().enumerate() {
        let n = plane.normal();
        let c = plane.centroid();
        println!(
            "  [{i:>3}] {:>7} pts  {:>9.3} area  n = ({:+.4}, {:+.4}, {:+.4})  c = ({:.3}, {:.3}, {:.3})",
            plane.len(),
            plane.surface,
            n.x,
            n.y,
            n.z,
            c.x,
            c.y,
            c.z
        );
    }
}

fn print_report(report: &AlignmentReport) {
    print_planes("source", &report.source_planes);
    print_planes("target", &report.target_planes);

    let alignment = &report.alignment;
    println!();
    println!("conditioning: {:?}", alignment.conditioning);
    println!(
        "planes used: {} source, {} target",
        alignment.source_planes, alignment.target_planes
    );
    for (s, t) in &alignment.correspondences {
        println!("  source {s} -> target {t}");
    }
    println!("rotation:");
    for row in alignment.rotation.row_iter() {
        println!("  {:+.6} {:+.6} {:+.6}", row[0], row[1], row[2]);
    }
    match alignment.axis() {
        Some(axis) => println!(
            "angle: {:.3} deg about ({:+.4}, {:+.4}, {:+.4})",
            alignment.angle().to_degrees(),
            axis.x,
            axis.y,
            axis.z
        ),
        None => println!("angle: 0 deg"),
    }
}
