//! `depflow generate` — write the standard random datasets.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use depflow_core::generate::{DataGenerator, assignment_graph};
use depflow_core::graph::{Graph, is_dag};
use depflow_core::save_graph;
use serde::Serialize;
use tracing::info;

use crate::config::DepflowConfig;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::timing::timed;

/// Arguments for `depflow generate`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Output directory (default from config, else `data`).
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// RNG seed (default from config, else 42).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Attach random task metadata (type, duration, priority) to every vertex.
    #[arg(long)]
    pub with_metadata: bool,
}

#[derive(Debug, Serialize)]
struct GeneratedFile {
    name: String,
    path: PathBuf,
    nodes: usize,
    edges: usize,
    acyclic: bool,
    content_hash: String,
}

#[derive(Debug, Serialize)]
struct GenerateOutput {
    out_dir: PathBuf,
    seed: u64,
    files: Vec<GeneratedFile>,
}

/// Execute `depflow generate`.
pub fn run_generate(
    args: &GenerateArgs,
    config: &DepflowConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| config.generate.out_dir.clone());
    let seed = args.seed.unwrap_or(config.generate.seed);

    let mut generator = DataGenerator::new(seed);
    let mut datasets = timed("generate", || generator.standard_datasets());
    datasets.push(("task".to_string(), assignment_graph()));
    if args.with_metadata {
        for (_, graph) in &mut datasets {
            generator.assign_task_metadata(graph);
        }
    }

    let mut files = Vec::with_capacity(datasets.len());
    for (name, graph) in &datasets {
        let path = out_dir.join(format!("{name}.json"));
        timed("save", || save_graph(&path, graph))
            .with_context(|| format!("Failed to write dataset {name}"))?;
        info!(path = %path.display(), nodes = graph.vertex_count(), "dataset written");
        files.push(describe(name, path, graph));
    }

    let payload = GenerateOutput {
        out_dir,
        seed,
        files,
    };
    render_mode(output, &payload, render_generate_text, render_generate_pretty)
}

fn describe(name: &str, path: PathBuf, graph: &Graph) -> GeneratedFile {
    GeneratedFile {
        name: name.to_string(),
        path,
        nodes: graph.vertex_count(),
        edges: graph.edge_count(),
        acyclic: is_dag(graph),
        content_hash: graph.content_hash(),
    }
}

fn render_generate_text(payload: &GenerateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for file in &payload.files {
        writeln!(
            w,
            "{} nodes={} edges={} acyclic={}",
            file.path.display(),
            file.nodes,
            file.edges,
            file.acyclic
        )?;
    }
    Ok(())
}

fn render_generate_pretty(payload: &GenerateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Generated datasets")?;
    pretty_kv(w, "Directory", payload.out_dir.display().to_string())?;
    pretty_kv(w, "Seed", payload.seed.to_string())?;
    writeln!(w)?;
    for file in &payload.files {
        let shape = if file.acyclic { "DAG" } else { "cyclic" };
        writeln!(
            w,
            "  {:<10} {:>3} nodes, {:>4} edges  {shape}",
            file.name, file.nodes, file.edges
        )?;
    }
    Ok(())
}
