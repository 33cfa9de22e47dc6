//! Node positioning for the graph canvas.
//!
//! Computes positions in a unit square for each layout name. The data is
//! already a finished graph from the backend; these are pure presentational
//! placements, deterministic so a re-layout of the same graph is stable.

use std::collections::{HashMap, VecDeque};

use crate::explore::LayoutName;
use crate::model::GraphResponse;

/// Node positions in [0, 1] × [0, 1], keyed by node id.
pub type Positions = HashMap<String, (f64, f64)>;

/// Lay out a graph. `root` anchors the breadth-first layering; when absent
/// the first node serves as root.
pub fn positions(graph: &GraphResponse, layout: LayoutName, root: Option<&str>) -> Positions {
    if graph.nodes.is_empty() {
        return Positions::new();
    }
    match layout {
        LayoutName::Circle => circle(graph),
        LayoutName::Grid => grid(graph),
        LayoutName::BreadthFirst => breadth_first(graph, root),
        LayoutName::Concentric => concentric(graph),
        LayoutName::Cose => cose(graph),
    }
}

fn circle(graph: &GraphResponse) -> Positions {
    let n = graph.nodes.len();
    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let angle = std::f64::consts::TAU * (i as f64) / (n as f64);
            (
                node.id.clone(),
                (0.5 + 0.45 * angle.cos(), 0.5 + 0.45 * angle.sin()),
            )
        })
        .collect()
}

fn grid(graph: &GraphResponse) -> Positions {
    let n = graph.nodes.len();
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let col = i % cols;
            let row = i / cols;
            (
                node.id.clone(),
                (
                    cell_coord(col, cols),
                    cell_coord(row, rows),
                ),
            )
        })
        .collect()
}

/// Center of cell `i` out of `n` along one axis.
fn cell_coord(i: usize, n: usize) -> f64 {
    (i as f64 + 0.5) / (n as f64)
}

fn breadth_first(graph: &GraphResponse, root: Option<&str>) -> Positions {
    let root = root
        .filter(|id| graph.node(id).is_some())
        .unwrap_or(&graph.nodes[0].id);

    // Undirected adjacency; layering ignores edge direction.
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        adjacency
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut depth: HashMap<&str, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    depth.insert(root, 0);
    queue.push_back(root);
    while let Some(id) = queue.pop_front() {
        let d = depth[id];
        for &next in adjacency.get(id).into_iter().flatten() {
            if !depth.contains_key(next) {
                depth.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }

    // Disconnected nodes go one layer below the deepest reached one.
    let orphan_depth = depth.values().copied().max().unwrap_or(0) + 1;
    let mut layers: Vec<Vec<&str>> = Vec::new();
    for node in &graph.nodes {
        let d = depth.get(node.id.as_str()).copied().unwrap_or(orphan_depth);
        if layers.len() <= d {
            layers.resize_with(d + 1, Vec::new);
        }
        layers[d].push(node.id.as_str());
    }
    layers.retain(|layer| !layer.is_empty());

    let mut out = Positions::new();
    let layer_count = layers.len();
    for (li, layer) in layers.iter().enumerate() {
        let y = cell_coord(li, layer_count);
        for (ni, id) in layer.iter().enumerate() {
            out.insert(id.to_string(), (cell_coord(ni, layer.len()), y));
        }
    }
    out
}

fn concentric(graph: &GraphResponse) -> Positions {
    // Higher-degree nodes sit on inner rings, cytoscape-style.
    let mut degree: HashMap<&str, usize> = HashMap::new();
    for edge in &graph.edges {
        *degree.entry(edge.source.as_str()).or_insert(0) += 1;
        *degree.entry(edge.target.as_str()).or_insert(0) += 1;
    }
    let mut ordered: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    ordered.sort_by_key(|id| std::cmp::Reverse(degree.get(id).copied().unwrap_or(0)));

    let ring_capacity = 8;
    let rings = ordered.len().div_ceil(ring_capacity);
    let mut out = Positions::new();
    for (i, id) in ordered.iter().enumerate() {
        let ring = i / ring_capacity;
        let index_in_ring = i % ring_capacity;
        let members = if ring + 1 == rings {
            ordered.len() - ring * ring_capacity
        } else {
            ring_capacity
        };
        let radius = 0.45 * (ring as f64 + 1.0) / (rings as f64);
        let angle = std::f64::consts::TAU * (index_in_ring as f64) / (members as f64);
        out.insert(
            id.to_string(),
            (0.5 + radius * angle.cos(), 0.5 + radius * angle.sin()),
        );
    }
    out
}

/// Fixed-iteration spring embedder. Starts from the circle placement so the
/// result is deterministic for a given graph.
fn cose(graph: &GraphResponse) -> Positions {
    const ITERATIONS: usize = 60;
    const REPULSION: f64 = 0.002;
    const ATTRACTION: f64 = 0.08;
    const MAX_STEP: f64 = 0.05;

    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let seed = circle(graph);
    let mut pos: Vec<(f64, f64)> = ids.iter().map(|&id| seed[id]).collect();

    let edges: Vec<(usize, usize)> = graph
        .edges
        .iter()
        .filter_map(|e| {
            Some((
                *index.get(e.source.as_str())?,
                *index.get(e.target.as_str())?,
            ))
        })
        .collect();

    for _ in 0..ITERATIONS {
        let mut force = vec![(0.0f64, 0.0f64); pos.len()];

        // Pairwise repulsion.
        for i in 0..pos.len() {
            for j in (i + 1)..pos.len() {
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let dist_sq = (dx * dx + dy * dy).max(1e-6);
                let f = REPULSION / dist_sq;
                let dist = dist_sq.sqrt();
                force[i].0 += f * dx / dist;
                force[i].1 += f * dy / dist;
                force[j].0 -= f * dx / dist;
                force[j].1 -= f * dy / dist;
            }
        }

        // Spring attraction along edges.
        for &(a, b) in &edges {
            let dx = pos[b].0 - pos[a].0;
            let dy = pos[b].1 - pos[a].1;
            force[a].0 += ATTRACTION * dx;
            force[a].1 += ATTRACTION * dy;
            force[b].0 -= ATTRACTION * dx;
            force[b].1 -= ATTRACTION * dy;
        }

        for (p, f) in pos.iter_mut().zip(&force) {
            p.0 = (p.0 + f.0.clamp(-MAX_STEP, MAX_STEP)).clamp(0.02, 0.98);
            p.1 = (p.1 + f.1.clamp(-MAX_STEP, MAX_STEP)).clamp(0.02, 0.98);
        }
    }

    ids.iter()
        .zip(pos)
        .map(|(&id, p)| (id.to_string(), p))
        .collect()
}
