//! `depflow path` — one shortest or critical path query.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Args;
use depflow_core::graph::{Condensation, PathResult, critical_path, shortest_path};
use depflow_core::{Counters, load_graph};
use serde::Serialize;

use crate::output::{OutputMode, plain_list, pretty_kv, pretty_section, render_mode};
use crate::timing::timed;

/// Arguments for `depflow path`.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Graph file (JSON).
    pub file: PathBuf,

    /// Start vertex (default: the file's source).
    #[arg(long, short)]
    pub source: Option<usize>,

    /// End vertex; without it only distances are reported.
    #[arg(long, short)]
    pub target: Option<usize>,

    /// Longest instead of shortest path.
    #[arg(long)]
    pub critical: bool,

    /// Query the condensation: vertices are mapped to their components and
    /// the reported path lists component ids.
    #[arg(long)]
    pub condensed: bool,
}

#[derive(Debug, Serialize)]
struct Reach {
    to: usize,
    distance: f64,
}

#[derive(Debug, Serialize)]
struct PathOutput {
    file: PathBuf,
    kind: &'static str,
    on: &'static str,
    source: usize,
    target: Option<usize>,
    distance: Option<f64>,
    path: Vec<usize>,
    reachable: Vec<Reach>,
    counters: Counters,
}

/// Execute `depflow path`.
pub fn run_path(args: &PathArgs, output: OutputMode) -> anyhow::Result<()> {
    let graph = timed("load", || load_graph(&args.file))?;
    let source = args
        .source
        .or_else(|| graph.source())
        .ok_or_else(|| anyhow!("no --source given and {} has none", args.file.display()))?;

    let (result, on) = if args.condensed {
        let condensation = timed("condense", || Condensation::from_graph(&graph));
        let lift = |v: usize| {
            condensation
                .component_of(v)
                .ok_or_else(|| anyhow!("vertex {v} is not in {}", args.file.display()))
        };
        let source = lift(source)?;
        let target = args.target.map(lift).transpose()?;
        (query(condensation.dag(), source, target, args.critical)?, "condensation")
    } else {
        (query(&graph, source, args.target, args.critical)?, "graph")
    };

    let payload = build_output(args, &result, on);
    render_mode(output, &payload, render_path_text, render_path_pretty)
}

fn query(
    graph: &depflow_core::Graph,
    source: usize,
    target: Option<usize>,
    critical: bool,
) -> anyhow::Result<PathResult> {
    let (stage, result) = if critical {
        ("critical_path", timed("critical_path", || critical_path(graph, source, target)))
    } else {
        ("shortest_path", timed("shortest_path", || shortest_path(graph, source, target)))
    };
    result.with_context(|| format!("{stage} from {source}"))
}

fn build_output(args: &PathArgs, result: &PathResult, on: &'static str) -> PathOutput {
    PathOutput {
        file: args.file.clone(),
        kind: if args.critical { "critical" } else { "shortest" },
        on,
        source: result.source,
        target: result.target,
        distance: result.target_distance(),
        path: result.path.clone(),
        reachable: result
            .reachable()
            .into_iter()
            .map(|(to, distance)| Reach { to, distance })
            .collect(),
        counters: result.counters,
    }
}

fn render_path_text(payload: &PathOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "kind {} on {}", payload.kind, payload.on)?;
    writeln!(w, "source {}", payload.source)?;
    if let Some(target) = payload.target {
        writeln!(w, "target {target}")?;
        match payload.distance {
            Some(d) => writeln!(w, "distance {d}")?,
            None => writeln!(w, "distance unreachable")?,
        }
        writeln!(w, "path {}", plain_list(&payload.path))?;
    } else {
        for reach in &payload.reachable {
            writeln!(w, "to {} {}", reach.to, reach.distance)?;
        }
    }
    Ok(())
}

fn render_path_pretty(payload: &PathOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let title = if payload.kind == "critical" {
        "Critical path"
    } else {
        "Shortest path"
    };
    pretty_section(w, &format!("{title} ({})", payload.file.display()))?;
    pretty_kv(w, "On", payload.on)?;
    pretty_kv(w, "Source", payload.source.to_string())?;

    if let Some(target) = payload.target {
        pretty_kv(w, "Target", target.to_string())?;
        match payload.distance {
            Some(d) => {
                pretty_kv(w, "Length", d.to_string())?;
                let hops: Vec<String> = payload.path.iter().map(ToString::to_string).collect();
                pretty_kv(w, "Path", hops.join(" → "))?;
            }
            None => pretty_kv(w, "Path", format!("none, {target} is unreachable"))?,
        }
    } else {
        writeln!(w, "Distances from {}:", payload.source)?;
        for reach in &payload.reachable {
            writeln!(w, "  to {}: {}", reach.to, reach.distance)?;
        }
    }

    pretty_kv(
        w,
        "Work",
        format!(
            "{} visits, {} relaxations, {} frontier pops",
            payload.counters.visits,
            payload.counters.edge_relaxations,
            payload.counters.frontier_ops
        ),
    )
}
