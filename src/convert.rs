use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use serde::Serialize;
use sprs::TriMat;
use tracing::{debug, info};

use crate::edge_list::EdgeList;

pub const MTX_EXTENSION: &str = "mtx";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ArgEnum)]
pub enum DuplicatePolicy {
    /// one entry per (row, col), valued with the number of repeats
    #[default]
    Sum,
    /// one value 1 entry per input line
    Keep,
}

#[derive(Debug, Serialize)]
pub struct Conversion {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dimension: usize,
    pub edges: usize,
    pub entries: usize,
}

/// `graph.txt` -> `graph.mtx`, `graph` -> `graph.mtx`
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(MTX_EXTENSION)
}

/// build the adjacency matrix, entries in order of first appearance
pub fn adjacency_matrix(edges: &EdgeList, policy: DuplicatePolicy) -> TriMat<i32> {
    let dim = edges.dimension();
    let mut tri = TriMat::with_capacity((dim, dim), edges.len());
    match policy {
        DuplicatePolicy::Keep => {
            for &(from, to) in &edges.edges {
                tri.add_triplet(from, to, 1);
            }
        }
        DuplicatePolicy::Sum => {
            let mut order: Vec<(usize, usize)> = vec![];
            let mut counts: HashMap<(usize, usize), i32> = HashMap::new();
            for &edge in &edges.edges {
                let count = counts.entry(edge).or_insert_with(|| {
                    order.push(edge);
                    0
                });
                *count += 1;
            }
            for (from, to) in order {
                tri.add_triplet(from, to, counts[&(from, to)]);
            }
        }
    }
    debug!(dim, nnz = tri.nnz(), ?policy, "adjacency matrix built");
    tri
}

pub fn convert(
    input: &Path,
    output: Option<&Path>,
    policy: DuplicatePolicy,
) -> Result<Conversion> {
    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
    let span = tracing::info_span!("convert", ?input, ?output);
    let _entered = span.enter();

    let edges = EdgeList::read(input)?;
    let tri = adjacency_matrix(&edges, policy);
    sprs::io::write_matrix_market(&output, &tri)
        .wrap_err(format!("fail to write matrix market file {:?}", output))?;
    info!(edges = edges.len(), nnz = tri.nnz(), "matrix written");

    Ok(Conversion {
        input: input.to_path_buf(),
        output,
        dimension: tri.rows(),
        edges: edges.len(),
        entries: tri.nnz(),
    })
}
