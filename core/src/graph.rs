//! Weighted co-occurrence graph over terms.
//!
//! Vertices live in an insertion-ordered arena; each keeps its adjacency list
//! in edge-creation order. Every edge is stored on both endpoints with the
//! same weight, and weights only ever grow.

use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::fmt::Write as _;

use crate::error::{Result, StoreError};
use crate::index::Term;

/// Upper bound on the number of entries returned by [`TopicGraph::related_topics`].
pub const MAX_RELATED: usize = 6;
/// How many of a topic's strongest unvisited neighbours join the learning-path frontier.
const PATH_FANOUT: usize = 3;

/// One direction of an undirected co-occurrence edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub destination: Term,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    to: usize,
    weight: u32,
}

#[derive(Debug, Clone)]
struct Vertex {
    term: Term,
    links: Vec<Link>,
}

#[derive(Debug, Default, Clone)]
pub struct TopicGraph {
    vertices: Vec<Vertex>,
    lookup: HashMap<Term, usize>,
}

/// A vertex reached by the bounded breadth-first walk.
#[derive(Debug, Clone, Copy)]
struct Discovery {
    vertex: usize,
    parent: usize,
    depth: usize,
    weight: u32,
}

#[derive(Debug, PartialEq, Eq)]
struct FrontierEntry {
    weight: u32,
    depth: usize,
    seq: usize,
    vertex: usize,
}

// Max-heap order: heavier edge first, then shallower, then earlier enqueue.
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| other.depth.cmp(&self.depth))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl TopicGraph {
    pub fn new() -> Self { Self::default() }

    pub fn add_vertex(&mut self, term: &str) {
        self.vertex_id(term);
    }

    pub fn contains(&self, term: &str) -> bool { self.lookup.contains_key(term) }

    pub fn num_vertices(&self) -> usize { self.vertices.len() }

    pub fn num_edges(&self) -> usize {
        self.vertices.iter().map(|v| v.links.len()).sum::<usize>() / 2
    }

    /// Strengthen the co-occurrence between `a` and `b` by one, creating a
    /// weight-1 edge if they were unrelated. Self-pairs are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        let ia = self.vertex_id(a);
        let ib = self.vertex_id(b);
        if let Some(link) = self.vertices[ia].links.iter_mut().find(|l| l.to == ib) {
            link.weight += 1;
            if let Some(back) = self.vertices[ib].links.iter_mut().find(|l| l.to == ia) {
                back.weight += 1;
            }
            return;
        }
        self.vertices[ia].links.push(Link { to: ib, weight: 1 });
        self.vertices[ib].links.push(Link { to: ia, weight: 1 });
    }

    pub fn bump_edge(&mut self, a: &str, b: &str) {
        self.add_edge(a, b);
    }

    /// Weight of the edge between `a` and `b`, if any.
    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let ia = *self.lookup.get(a)?;
        let ib = *self.lookup.get(b)?;
        self.vertices[ia].links.iter().find(|l| l.to == ib).map(|l| l.weight)
    }

    pub fn neighbors(&self, term: &str) -> Vec<Edge> {
        self.lookup
            .get(term)
            .map(|&i| self.edges_of(i))
            .unwrap_or_default()
    }

    /// Topics reachable within `max_depth` hops, strongest first.
    ///
    /// Each topic is reported once, carrying the weight of the edge through
    /// which the walk first reached it. Equal weights keep discovery order.
    pub fn related_topics(&self, term: &str, max_depth: usize) -> Vec<(Term, u32)> {
        let Some(found) = self.discover(term, max_depth) else { return Vec::new() };
        let mut related: Vec<(Term, u32)> = found
            .into_iter()
            .map(|d| (self.vertices[d.vertex].term.clone(), d.weight))
            .collect();
        related.sort_by_key(|(_, w)| Reverse(*w));
        related.truncate(MAX_RELATED);
        related
    }

    /// Connected components over edges of weight `>= min_weight`, largest
    /// first. Singletons are dropped.
    pub fn find_clusters(&self, min_weight: u32) -> Vec<Vec<Term>> {
        let mut visited = vec![false; self.vertices.len()];
        let mut clusters = Vec::new();
        for start in 0..self.vertices.len() {
            if visited[start] {
                continue;
            }
            let mut cluster = Vec::new();
            let mut stack = vec![start];
            while let Some(v) = stack.pop() {
                if visited[v] {
                    continue;
                }
                visited[v] = true;
                cluster.push(self.vertices[v].term.clone());
                // Reverse push keeps recursive pre-order.
                for link in self.vertices[v].links.iter().rev() {
                    if link.weight >= min_weight && !visited[link.to] {
                        stack.push(link.to);
                    }
                }
            }
            if cluster.len() > 1 {
                clusters.push(cluster);
            }
        }
        clusters.sort_by_key(|c| Reverse(c.len()));
        clusters
    }

    /// Greedy study order starting at `start`.
    ///
    /// The frontier is a max-heap on edge weight (shallower depth breaks
    /// ties). Each popped topic contributes its [`PATH_FANOUT`] strongest
    /// unvisited neighbours. No topic appears twice and the walk never
    /// backtracks.
    pub fn learning_path(&self, start: &str, max_topics: usize) -> Vec<Term> {
        let mut path = Vec::new();
        let Some(&origin) = self.lookup.get(start) else { return path };

        let mut visited = vec![false; self.vertices.len()];
        let mut frontier = BinaryHeap::new();
        let mut seq = 0;
        frontier.push(FrontierEntry { weight: 0, depth: 0, seq, vertex: origin });

        while path.len() < max_topics {
            let Some(entry) = frontier.pop() else { break };
            if visited[entry.vertex] {
                continue;
            }
            visited[entry.vertex] = true;
            path.push(self.vertices[entry.vertex].term.clone());

            let mut candidates: Vec<Link> = self.vertices[entry.vertex]
                .links
                .iter()
                .filter(|l| !visited[l.to])
                .copied()
                .collect();
            candidates.sort_by_key(|l| Reverse(l.weight));
            for link in candidates.into_iter().take(PATH_FANOUT) {
                seq += 1;
                frontier.push(FrontierEntry {
                    weight: link.weight,
                    depth: entry.depth + 1,
                    seq,
                    vertex: link.to,
                });
            }
        }
        path
    }

    /// Bounded neighbourhood of `center` as a tree of discovering edges.
    pub fn mind_map(&self, center: &str, max_depth: usize) -> Option<MindMap> {
        let found = self.discover(center, max_depth)?;
        let term = |i: usize| self.vertices[i].term.clone();
        Some(MindMap {
            center: center.to_string(),
            nodes: found
                .iter()
                .map(|d| MindMapNode { topic: term(d.vertex), depth: d.depth })
                .collect(),
            edges: found
                .iter()
                .map(|d| MindMapEdge { from: term(d.parent), to: term(d.vertex), weight: d.weight })
                .collect(),
        })
    }

    /// All vertices in insertion order.
    pub fn topics(&self) -> Vec<Term> {
        self.vertices.iter().map(|v| v.term.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.lookup.clear();
    }

    /// Adjacency lists in vertex insertion order.
    pub fn adjacency(&self) -> Vec<(Term, Vec<Edge>)> {
        (0..self.vertices.len())
            .map(|i| (self.vertices[i].term.clone(), self.edges_of(i)))
            .collect()
    }

    /// Rebuilds a graph from adjacency lists as produced by [`TopicGraph::adjacency`].
    ///
    /// Every edge must name another listed topic, carry a weight of at least
    /// one, appear once per list and be mirrored with the same weight on its
    /// destination. Anything else is rejected.
    pub fn from_adjacency(lists: Vec<(Term, Vec<Edge>)>) -> Result<Self> {
        let mut graph = Self::new();
        for (term, _) in &lists {
            if graph.contains(term) {
                return Err(invalid(format!("topic {term:?} listed twice")));
            }
            graph.add_vertex(term);
        }
        for (from, (term, edges)) in lists.into_iter().enumerate() {
            for edge in edges {
                let to = match graph.lookup.get(&edge.destination) {
                    Some(&to) if to != from => to,
                    _ => return Err(invalid(format!("edge {term:?} -> {:?} has no valid destination", edge.destination))),
                };
                if edge.weight == 0 {
                    return Err(invalid(format!("edge {term:?} -> {:?} has weight 0", edge.destination)));
                }
                if graph.vertices[from].links.iter().any(|l| l.to == to) {
                    return Err(invalid(format!("edge {term:?} -> {:?} listed twice", edge.destination)));
                }
                graph.vertices[from].links.push(Link { to, weight: edge.weight });
            }
        }
        for (v, vertex) in graph.vertices.iter().enumerate() {
            for link in &vertex.links {
                let mirrored = graph.vertices[link.to]
                    .links
                    .iter()
                    .any(|back| back.to == v && back.weight == link.weight);
                if !mirrored {
                    return Err(invalid(format!(
                        "edge {:?} -> {:?} is not mirrored with weight {}",
                        vertex.term, graph.vertices[link.to].term, link.weight
                    )));
                }
            }
        }
        Ok(graph)
    }

    fn vertex_id(&mut self, term: &str) -> usize {
        if let Some(&id) = self.lookup.get(term) {
            return id;
        }
        let id = self.vertices.len();
        self.vertices.push(Vertex { term: term.to_string(), links: Vec::new() });
        self.lookup.insert(term.to_string(), id);
        id
    }

    fn edges_of(&self, i: usize) -> Vec<Edge> {
        self.vertices[i]
            .links
            .iter()
            .map(|l| Edge { destination: self.vertices[l.to].term.clone(), weight: l.weight })
            .collect()
    }

    fn discover(&self, start: &str, max_depth: usize) -> Option<Vec<Discovery>> {
        let &origin = self.lookup.get(start)?;
        let mut visited = vec![false; self.vertices.len()];
        visited[origin] = true;
        let mut queue = VecDeque::from([(origin, 0usize)]);
        let mut found = Vec::new();
        while let Some((v, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for link in &self.vertices[v].links {
                if visited[link.to] {
                    continue;
                }
                visited[link.to] = true;
                found.push(Discovery { vertex: link.to, parent: v, depth: depth + 1, weight: link.weight });
                queue.push_back((link.to, depth + 1));
            }
        }
        Some(found)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindMapNode {
    pub topic: Term,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindMapEdge {
    pub from: Term,
    pub to: Term,
    pub weight: u32,
}

/// Breadth-first neighbourhood of a center topic. `nodes` excludes the center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindMap {
    pub center: Term,
    pub nodes: Vec<MindMapNode>,
    pub edges: Vec<MindMapEdge>,
}

impl MindMap {
    /// Graphviz description, one labelled edge per discovery step.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph mindmap {\n");
        out.push_str("  node [shape=box, style=rounded];\n");
        let _ = writeln!(out, "  \"{}\" [style=\"rounded,filled\", fillcolor=lightblue];", dot_escape(&self.center));
        for node in &self.nodes {
            let _ = writeln!(out, "  \"{}\";", dot_escape(&node.topic));
        }
        for edge in &self.edges {
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                dot_escape(&edge.from),
                dot_escape(&edge.to),
                edge.weight
            );
        }
        out.push_str("}\n");
        out
    }

    /// Indented text tree rooted at the center topic.
    pub fn render_tree(&self) -> String {
        let mut out = format!("{}\n", self.center);
        if self.edges.is_empty() {
            out.push_str("  (no strong connections found)\n");
            return out;
        }
        self.render_children(&self.center, &mut out);
        out
    }

    fn render_children(&self, center: &str, out: &mut String) {
        let mut children: HashMap<&str, Vec<&MindMapEdge>> = HashMap::new();
        for edge in &self.edges {
            children.entry(edge.from.as_str()).or_default().push(edge);
        }
        let kids = |parent: &str| children.get(parent).map(Vec::as_slice).unwrap_or_default();

        // Explicit stack; children pushed in reverse to print in edge order.
        let mut stack: Vec<(&MindMapEdge, usize)> = kids(center).iter().rev().map(|&e| (e, 1)).collect();
        while let Some((edge, level)) = stack.pop() {
            let _ = writeln!(out, "{}|- {} [weight: {}]", "  ".repeat(level), edge.to, edge.weight);
            stack.extend(kids(&edge.to).iter().rev().map(|&e| (e, level + 1)));
        }
    }
}

fn invalid(reason: String) -> StoreError {
    StoreError::InvalidSnapshot(reason)
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
