use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use eyre::{eyre, Context, Result};
use tracing::debug;

const COMMENT: char = '#';

/// A directed edge list in input order, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeList {
    pub edges: Vec<(usize, usize)>,
}

impl EdgeList {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).wrap_err(format!("cannot open edge list {:?}", path))?;
        Self::from_reader(BufReader::new(file)).wrap_err(format!("{:?} is error!", path))
    }

    /// Parse `from<TAB>to` lines. Text after `#` is ignored, as are blank lines.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut edges = vec![];
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let content = match line.find(COMMENT) {
                Some(pos) => &line[..pos],
                None => &line[..],
            };
            if content.trim().is_empty() {
                continue;
            }
            edges.push(parse_edge(content).wrap_err(format!("line {}", line_no + 1))?);
        }
        debug!("read {} edges", edges.len());
        Ok(Self { edges })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn max_node_id(&self) -> Option<usize> {
        self.edges.iter().map(|&(from, to)| from.max(to)).max()
    }

    /// side of the square adjacency matrix, ids are not compacted
    pub fn dimension(&self) -> usize {
        self.max_node_id().map_or(0, |max| max + 1)
    }
}

fn parse_edge(content: &str) -> Result<(usize, usize)> {
    let mut columns = content.split_whitespace();
    let (from, to) = match (columns.next(), columns.next(), columns.next()) {
        (Some(from), Some(to), None) => (from, to),
        _ => {
            return Err(eyre!(
                "expected two columns FromNodeId and ToNodeId, got {:?}",
                content
            ))
        }
    };
    let from = from
        .parse::<usize>()
        .wrap_err(format!("invalid FromNodeId {:?}", from))?;
    let to = to
        .parse::<usize>()
        .wrap_err(format!("invalid ToNodeId {:?}", to))?;
    // the matrix side is max id + 1
    if from.max(to).checked_add(1).is_none() {
        return Err(eyre!("node id {} is too large", from.max(to)));
    }
    Ok((from, to))
}
