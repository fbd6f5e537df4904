use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{PlannerError, Result};
use crate::geometry::{Pose, RealVectorState};
use crate::rrt::{ConfigspaceGraph, NearestNeighbors, NodeId};
use log::info;
use num_traits::Float;

/// Writes the node count, then `id, x, y, [z,] theta` per node. Ids are 1-based.
pub fn write_nodes<F: Float, const N: usize, NN: NearestNeighbors<F, N>>(
    path: &Path,
    graph: &ConfigspaceGraph<F, N, NN>,
) -> Result<()> {
    write_lines(path, |out| {
        writeln!(out, "{}", graph.node_count())?;
        for (id, node) in graph.iter() {
            writeln!(out, "{}, {}", id + 1, pose_fields(&node.pose))?;
        }
        Ok(())
    })
}

/// Writes the edge count, then `startId, endId` per edge.
pub fn write_edges<F: Float, const N: usize, NN: NearestNeighbors<F, N>>(
    path: &Path,
    graph: &ConfigspaceGraph<F, N, NN>,
) -> Result<()> {
    write_lines(path, |out| {
        writeln!(out, "{}", graph.edges().len())?;
        for edge in graph.edges() {
            writeln!(out, "{}, {}", edge.start_id + 1, edge.end_id + 1)?;
        }
        Ok(())
    })
}

/// Writes `startId, startX, startY[, startZ], endId, endX, endY[, endZ]` per edge.
pub fn write_search_tree<F: Float, const N: usize, NN: NearestNeighbors<F, N>>(
    path: &Path,
    graph: &ConfigspaceGraph<F, N, NN>,
) -> Result<()> {
    write_lines(path, |out| {
        for edge in graph.edges() {
            writeln!(
                out,
                "{}, {}, {}, {}",
                edge.start_id + 1,
                position_fields(&edge.start.position),
                edge.end_id + 1,
                position_fields(&edge.end.position)
            )?;
        }
        Ok(())
    })
}

/// Writes `x, y, [z,] theta` per pose, in the given order.
pub fn write_path<F: Float, const N: usize>(path: &Path, poses: &[Pose<F, N>]) -> Result<()> {
    write_lines(path, |out| {
        for pose in poses {
            writeln!(out, "{}", pose_fields(pose))?;
        }
        Ok(())
    })
}

/// Writes every output of one run into `dir`, with file names suffixed by `tag`.
///
/// Parameters:
/// - `dir`: Output directory, created if missing.
/// - `tag`: Run label, such as the gate number.
/// - `graph`: The searched tree.
/// - `path_ids`: Best path from the root to the goal node.
pub fn write_run_outputs<F: Float, const N: usize, NN: NearestNeighbors<F, N>>(
    dir: &Path,
    tag: impl Display,
    graph: &ConfigspaceGraph<F, N, NN>,
    path_ids: &[NodeId],
) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| PlannerError::io(dir, e))?;
    write_nodes(&dir.join(format!("nodes_{}.txt", tag)), graph)?;
    write_edges(&dir.join(format!("edges_{}.txt", tag)), graph)?;
    write_search_tree(&dir.join(format!("search_tree_{}.txt", tag)), graph)?;
    write_path(
        &dir.join(format!("output_path_{}.txt", tag)),
        &graph.poses(path_ids),
    )?;
    write_path(
        &dir.join(format!("high_fidelity_path_{}.txt", tag)),
        &graph.sampled_path(path_ids),
    )?;
    info!("Wrote run {} outputs to {}", tag, dir.display());
    Ok(())
}

fn write_lines(
    path: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<()> {
    let file = File::create(path).map_err(|e| PlannerError::io(path, e))?;
    let mut out = BufWriter::new(file);
    body(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| PlannerError::io(path, e))
}

fn position_fields<F: Float, const N: usize>(position: &RealVectorState<F, N>) -> String {
    position
        .values()
        .iter()
        .map(|v| v.to_f64().unwrap_or(f64::NAN).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn pose_fields<F: Float, const N: usize>(pose: &Pose<F, N>) -> String {
    format!(
        "{}, {}",
        position_fields(&pose.position),
        pose.heading.to_f64().unwrap_or(f64::NAN)
    )
}
