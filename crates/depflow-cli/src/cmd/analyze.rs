//! `depflow analyze` — the full pipeline over one or more graph files.
//!
//! For each file: components, condensation, component and task order,
//! statistics, distances from the source and critical paths. Cyclic input is
//! normal here; only the DAG-only steps on the original graph are skipped.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use depflow_core::graph::{
    ComponentStats, Condensation, Edge, Graph, GraphStats, PathResult, TopoOrder, critical_path,
    expand_components, shortest_path, topological_order, topological_order_by_degree,
    vertex_levels,
};
use depflow_core::{Counters, GraphError, load_graph};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{AnalyzeConfig, DepflowConfig};
use crate::output::{
    CliError, OutputMode, bracket_list, plain_list, pretty_kv, pretty_rule, pretty_section,
    render_error, render_mode,
};
use crate::timing::timed;

/// Arguments for `depflow analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Graph files (JSON).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Which ready component goes first when ordering the condensation.
    #[arg(long, value_enum, default_value = "fifo")]
    pub frontier: Frontier,

    /// Also list up to N complete topological orders of the condensation.
    #[cfg(feature = "enumerate")]
    #[arg(long, value_name = "N")]
    pub all_orders: Option<usize>,
}

/// Frontier discipline for the component order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frontier {
    /// First ready, first ordered.
    #[default]
    Fifo,
    /// Most outgoing edges first.
    HighDegree,
    /// Fewest outgoing edges first.
    LowDegree,
}

impl Frontier {
    fn order(self, graph: &Graph) -> Result<TopoOrder, GraphError> {
        match self {
            Self::Fifo => topological_order(graph),
            Self::HighDegree => topological_order_by_degree(graph, true),
            Self::LowDegree => topological_order_by_degree(graph, false),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GraphSummary {
    nodes: usize,
    edges: usize,
    directed: bool,
    weight_model: String,
    source: Option<usize>,
    content_hash: String,
}

#[derive(Debug, Serialize)]
struct ComponentEntry {
    id: usize,
    size: usize,
    cyclic: bool,
    members: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct CondensationSummary {
    nodes: usize,
    edges: Vec<Edge>,
    /// Longest-path depth of every component.
    levels: Vec<usize>,
    source_components: Vec<usize>,
    sink_components: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct Reach {
    to: usize,
    distance: f64,
}

#[derive(Debug, Serialize)]
struct Distances {
    source: usize,
    reachable: Vec<Reach>,
}

impl Distances {
    fn from_result(result: &PathResult) -> Self {
        Self {
            source: result.source,
            reachable: result
                .reachable()
                .into_iter()
                .map(|(to, distance)| Reach { to, distance })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CriticalPath {
    from: usize,
    to: usize,
    /// `None` when `to` is unreachable from `from`.
    length: Option<f64>,
    path: Vec<usize>,
    /// The path expanded to original vertices; only set on the condensation.
    #[serde(skip_serializing_if = "Option::is_none")]
    vertex_path: Option<Vec<usize>>,
}

impl CriticalPath {
    fn from_result(result: &PathResult, to: usize) -> Self {
        Self {
            from: result.source,
            to,
            length: result.target_distance(),
            path: result.path.clone(),
            vertex_path: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct AnalysisReport {
    file: String,
    graph: GraphSummary,
    stats: GraphStats,
    component_stats: ComponentStats,
    components: Vec<ComponentEntry>,
    condensation: CondensationSummary,
    frontier: Frontier,
    component_order: Vec<usize>,
    task_order: Vec<usize>,
    original_is_dag: bool,
    original_shortest: Option<Distances>,
    condensation_shortest: Option<Distances>,
    condensation_critical: Option<CriticalPath>,
    original_critical: Option<CriticalPath>,
    task_types: BTreeMap<String, usize>,
    average_duration: f64,
    counters: BTreeMap<&'static str, Counters>,
    #[cfg(feature = "enumerate")]
    #[serde(skip_serializing_if = "Option::is_none")]
    all_orders: Option<Vec<Vec<usize>>>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Execute `depflow analyze`.
///
/// Files that fail to load are reported on stderr and skipped; the command
/// still fails at the end if any did.
pub fn run_analyze(
    args: &AnalyzeArgs,
    config: &DepflowConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut reports = Vec::with_capacity(args.files.len());
    let mut failures = Vec::new();

    for file in &args.files {
        match analyze_file(file, args) {
            Ok(report) => reports.push(report),
            Err(err) => {
                warn!(file = %file.display(), "analysis failed");
                failures.push(err);
            }
        }
    }

    if reports.is_empty() && failures.len() == 1 {
        return Err(failures.remove(0));
    }

    if !reports.is_empty() {
        render_mode(output, &reports, render_analyze_text, |r, w| {
            render_analyze_pretty(r, w, &config.analyze)
        })?;
    }

    if !failures.is_empty() {
        for err in &failures {
            render_error(output, &CliError::from_anyhow(err))?;
        }
        bail!("{} of {} files failed", failures.len(), args.files.len());
    }
    Ok(())
}

fn analyze_file(path: &Path, args: &AnalyzeArgs) -> anyhow::Result<AnalysisReport> {
    let graph = timed("load", || load_graph(path))?;
    let label = path.display().to_string();
    #[allow(unused_mut)]
    let mut report = analyze_graph(&label, &graph, args.frontier)
        .with_context(|| format!("Failed to analyse {label}"))?;

    #[cfg(feature = "enumerate")]
    if let Some(limit) = args.all_orders {
        let condensation = Condensation::from_graph(&graph);
        report.all_orders = Some(timed("all_orders", || {
            depflow_core::graph::all_topological_orders(condensation.dag(), limit)
        }));
    }

    info!(
        file = %label,
        components = report.component_stats.total,
        acyclic = report.original_is_dag,
        "analysis complete"
    );
    Ok(report)
}

/// Run every analysis over one loaded graph.
fn analyze_graph(label: &str, graph: &Graph, frontier: Frontier) -> anyhow::Result<AnalysisReport> {
    let mut counters = BTreeMap::new();
    let n = graph.vertex_count();

    let condensation = timed("condense", || Condensation::from_graph(graph));
    counters.insert("condense", condensation.counters());
    let dag = condensation.dag();
    let components = condensation.components();

    let component_order = timed("topo", || frontier.order(dag))
        .context("condensation must be acyclic")?;
    counters.insert("component_order", component_order.counters);
    let task_order = expand_components(&component_order.order, components)?;

    let original_order = timed("original_topo", || topological_order(graph));
    let original_is_dag = match &original_order {
        Ok(order) => {
            counters.insert("original_order", order.counters);
            true
        }
        Err(err) => {
            debug!(%err, "original graph is cyclic, skipping DAG-only steps");
            false
        }
    };

    let original_shortest = match graph.source() {
        Some(source) if original_is_dag => {
            let result = timed("shortest_path", || shortest_path(graph, source, None))?;
            counters.insert("original_shortest", result.counters);
            Some(Distances::from_result(&result))
        }
        _ => None,
    };

    let source_components = condensation.source_components();
    let sink_components = condensation.sink_components();

    let condensation_source = dag.source().or_else(|| source_components.first().copied());
    let condensation_shortest = match condensation_source {
        Some(source) => {
            let result = timed("condensation_shortest_path", || {
                shortest_path(dag, source, None)
            })?;
            counters.insert("condensation_shortest", result.counters);
            Some(Distances::from_result(&result))
        }
        None => None,
    };

    let condensation_critical = match (source_components.first(), sink_components.first()) {
        (Some(&from), Some(&to)) => {
            let result = timed("critical_path", || critical_path(dag, from, Some(to)))?;
            counters.insert("condensation_critical", result.counters);
            let mut path = CriticalPath::from_result(&result, to);
            path.vertex_path = Some(expand_components(&result.path, components)?);
            Some(path)
        }
        _ => None,
    };

    let original_critical = if original_is_dag && n > 0 {
        let result = timed("original_critical_path", || {
            critical_path(graph, 0, Some(n - 1))
        })?;
        counters.insert("original_critical", result.counters);
        Some(CriticalPath::from_result(&result, n - 1))
    } else {
        None
    };

    let condensation_summary = CondensationSummary {
        nodes: dag.vertex_count(),
        edges: dag.inserted_edges().to_vec(),
        levels: vertex_levels(dag)?,
        source_components,
        sink_components,
    };

    let component_entries = components
        .all()
        .iter()
        .enumerate()
        .map(|(id, members)| ComponentEntry {
            id,
            size: condensation.component_size(id),
            cyclic: condensation.is_cyclic(id),
            members: members.clone(),
        })
        .collect();

    Ok(AnalysisReport {
        file: label.to_string(),
        graph: GraphSummary {
            nodes: n,
            edges: graph.edge_count(),
            directed: graph.is_directed(),
            weight_model: graph.weight_model().to_string(),
            source: graph.source(),
            content_hash: graph.content_hash(),
        },
        stats: GraphStats::compute(graph, &condensation),
        component_stats: condensation.stats(),
        components: component_entries,
        condensation: condensation_summary,
        frontier,
        component_order: component_order.order,
        task_order,
        original_is_dag,
        original_shortest,
        condensation_shortest,
        condensation_critical,
        original_critical,
        task_types: graph.task_type_counts(),
        average_duration: graph.average_duration(),
        counters,
        #[cfg(feature = "enumerate")]
        all_orders: None,
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[allow(clippy::ptr_arg)]
fn render_analyze_text(reports: &Vec<AnalysisReport>, w: &mut dyn Write) -> std::io::Result<()> {
    for report in reports {
        writeln!(w, "file {}", report.file)?;
        writeln!(w, "nodes {}", report.graph.nodes)?;
        writeln!(w, "edges {}", report.graph.edges)?;
        writeln!(w, "components {}", report.component_stats.total)?;
        writeln!(w, "cyclic_components {}", report.component_stats.cyclic)?;
        for component in &report.components {
            writeln!(w, "component {} {}", component.id, plain_list(&component.members))?;
        }
        for edge in &report.condensation.edges {
            writeln!(w, "condensation_edge {} {} {}", edge.from, edge.to, edge.weight)?;
        }
        writeln!(w, "component_order {}", plain_list(&report.component_order))?;
        writeln!(w, "task_order {}", plain_list(&report.task_order))?;
        writeln!(w, "acyclic {}", report.original_is_dag)?;
        if let Some(critical) = &report.condensation_critical {
            write_text_critical(w, "condensation_critical", critical)?;
        }
        if let Some(critical) = &report.original_critical {
            write_text_critical(w, "original_critical", critical)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_text_critical(
    w: &mut dyn Write,
    key: &str,
    critical: &CriticalPath,
) -> std::io::Result<()> {
    match critical.length {
        Some(length) => writeln!(w, "{key} {length} {}", plain_list(&critical.path)),
        None => writeln!(w, "{key} unreachable"),
    }
}

#[allow(clippy::ptr_arg)]
fn render_analyze_pretty(
    reports: &Vec<AnalysisReport>,
    w: &mut dyn Write,
    config: &AnalyzeConfig,
) -> std::io::Result<()> {
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        write_pretty_report(report, w, config)?;
    }
    Ok(())
}

fn write_pretty_report(
    report: &AnalysisReport,
    w: &mut dyn Write,
    config: &AnalyzeConfig,
) -> std::io::Result<()> {
    let max = config.max_listed;

    pretty_section(w, &format!("Analysis of {}", report.file))?;
    pretty_kv(w, "Nodes", report.graph.nodes.to_string())?;
    pretty_kv(w, "Edges", report.graph.edges.to_string())?;
    pretty_kv(w, "Density", format!("{:.4}", report.stats.density))?;
    pretty_kv(
        w,
        "Source",
        report
            .graph
            .source
            .map_or_else(|| "none".to_string(), |s| s.to_string()),
    )?;
    pretty_kv(w, "Acyclic", report.original_is_dag.to_string())?;
    pretty_kv(w, "Content hash", &report.graph.content_hash)?;
    writeln!(w)?;

    let stats = &report.component_stats;
    pretty_kv(
        w,
        "Components",
        format!("{} ({} cyclic, {} trivial)", stats.total, stats.cyclic, stats.trivial),
    )?;
    pretty_kv(
        w,
        "Component size",
        format!("largest {}, average {:.2}", stats.largest_size, stats.average_size),
    )?;
    if config.show_components {
        for component in &report.components {
            let marker = if component.cyclic { " cyclic" } else { "" };
            writeln!(
                w,
                "  #{:<4} {}{marker}",
                component.id,
                bracket_list(&component.members, max)
            )?;
        }
    }
    pretty_kv(
        w,
        "Condensation edges",
        report.condensation.edges.len().to_string(),
    )?;
    pretty_kv(
        w,
        "Source components",
        bracket_list(&report.condensation.source_components, max),
    )?;
    pretty_kv(
        w,
        "Sink components",
        bracket_list(&report.condensation.sink_components, max),
    )?;
    writeln!(w)?;

    pretty_kv(w, "Component order", bracket_list(&report.component_order, max))?;
    pretty_kv(w, "Task order", bracket_list(&report.task_order, max))?;

    if let Some(distances) = &report.condensation_shortest {
        pretty_kv(
            w,
            "Reachable components",
            format!(
                "{} from component {}",
                distances.reachable.len(),
                distances.source
            ),
        )?;
    }
    if let Some(distances) = &report.original_shortest {
        pretty_kv(
            w,
            "Reachable vertices",
            format!("{} from vertex {}", distances.reachable.len(), distances.source),
        )?;
    }
    if let Some(critical) = &report.condensation_critical {
        write_pretty_critical(w, "Critical (components)", critical, max)?;
        if let Some(vertices) = &critical.vertex_path {
            pretty_kv(w, "  as vertices", bracket_list(vertices, max))?;
        }
    }
    if let Some(critical) = &report.original_critical {
        write_pretty_critical(w, "Critical (vertices)", critical, max)?;
    }

    if !report.task_types.is_empty() {
        writeln!(w)?;
        for (task_type, count) in &report.task_types {
            pretty_kv(w, task_type, count.to_string())?;
        }
        pretty_kv(w, "Average duration", format!("{:.2}", report.average_duration))?;
    }

    pretty_rule(w)?;
    let total = report
        .counters
        .values()
        .fold(Counters::new(), |acc, c| acc + *c);
    pretty_kv(
        w,
        "Work",
        format!(
            "{} operations ({} visits, {} relaxations, {} frontier pops)",
            total.total(),
            total.visits,
            total.edge_relaxations,
            total.frontier_ops
        ),
    )
}

fn write_pretty_critical(
    w: &mut dyn Write,
    key: &str,
    critical: &CriticalPath,
    max: usize,
) -> std::io::Result<()> {
    match critical.length {
        Some(length) => pretty_kv(
            w,
            key,
            format!("{length} via {}", bracket_list(&critical.path, max)),
        ),
        None => pretty_kv(
            w,
            key,
            format!("{} does not reach {}", critical.from, critical.to),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depflow_core::generate::assignment_graph;

    fn report() -> AnalysisReport {
        analyze_graph("task.json", &assignment_graph(), Frontier::Fifo).expect("analysis")
    }

    #[test]
    fn assignment_graph_components_and_orders() {
        let r = report();
        assert_eq!(r.component_stats.total, 6);
        assert_eq!(r.component_stats.cyclic, 1);
        assert_eq!(r.component_order, vec![1, 5, 0, 4, 3, 2]);
        assert_eq!(r.task_order, vec![0, 4, 3, 2, 1, 5, 6, 7]);
        assert_eq!(r.condensation.source_components, vec![1, 5]);
        assert_eq!(r.condensation.sink_components, vec![0, 2]);
        assert!(!r.original_is_dag);
        assert!(r.original_shortest.is_none());
        assert!(r.original_critical.is_none());
    }

    #[test]
    fn assignment_graph_paths() {
        let r = report();

        // Vertex 4 lives in component 5; the chain 4 -> 5 -> 6 -> 7 costs 8.
        let shortest = r.condensation_shortest.expect("source component");
        assert_eq!(shortest.source, 5);
        let last = shortest.reachable.iter().find(|reach| reach.to == 2).expect("sink");
        assert!((last.distance - 8.0).abs() < 1e-9);

        let critical = r.condensation_critical.expect("critical path");
        assert_eq!((critical.from, critical.to), (1, 0));
        assert_eq!(critical.length, Some(3.0));
        assert_eq!(critical.path, vec![1, 0]);
        assert_eq!(critical.vertex_path, Some(vec![0, 3, 2, 1]));
    }

    #[test]
    fn acyclic_graph_gets_original_paths() {
        let g = Graph::directed_from_edges(3, &[(0, 1, 2.0), (1, 2, 3.0), (0, 2, 1.0)])
            .expect("graph");
        let r = analyze_graph("dag.json", &g, Frontier::HighDegree).expect("analysis");
        assert!(r.original_is_dag);
        assert!(r.original_shortest.is_none(), "no source set");

        let critical = r.original_critical.expect("DAG");
        assert_eq!(critical.length, Some(5.0));
        assert_eq!(critical.path, vec![0, 1, 2]);
        assert!(r.counters.contains_key("original_order"));
    }

    #[test]
    fn empty_graph_has_nothing_to_walk() {
        let r = analyze_graph("empty.json", &Graph::new(0, true), Frontier::Fifo)
            .expect("analysis");
        assert_eq!(r.component_stats.total, 0);
        assert!(r.task_order.is_empty());
        assert!(r.condensation_shortest.is_none());
        assert!(r.condensation_critical.is_none());
        assert!(r.original_critical.is_none());
    }

    #[test]
    fn text_output_lists_orders() {
        let mut out = Vec::new();
        render_analyze_text(&vec![report()], &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("components 6\n"));
        assert!(text.contains("component_order 1 5 0 4 3 2\n"));
        assert!(text.contains("task_order 0 4 3 2 1 5 6 7\n"));
        assert!(text.contains("condensation_critical 3 1 0\n"));
    }

    #[test]
    fn pretty_output_honours_list_limit() {
        let config = AnalyzeConfig {
            show_components: false,
            max_listed: 2,
        };
        let mut out = Vec::new();
        render_analyze_pretty(&vec![report()], &mut out, &config).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Analysis of task.json"));
        assert!(text.contains("[0, 4, … +6 more]"));
        assert!(!text.contains("#0"));
    }

    #[test]
    fn json_report_shape() {
        let json = serde_json::to_value(report()).expect("json");
        assert_eq!(json["graph"]["source"], 4);
        assert_eq!(json["frontier"], "fifo");
        assert_eq!(json["components"][0]["members"], serde_json::json!([3, 2, 1]));
        assert!(json["original_critical"].is_null());
    }
}
