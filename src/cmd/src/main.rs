// Copyright 2026 The NebulaStream-rs Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `nes-node`: a single-process walkthrough of placement and code generation
//! over an in-memory topology and query plan, wiring Components A/B/C/E/F
//! together the way a coordinator would across a real cluster. This binary
//! is deliberately not a network service: it builds its own topology and
//! query plan fixture rather than accepting either over the wire.

mod fixtures;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use nes_codegen::{generate_pipeline, Arity, CompilerBackend, CppSourceBackend, MlirBackend};
use nes_common::ids::{IdGenerator, OperatorId};
use nes_config::NesConfig;
use nes_execution_plan::GlobalExecutionPlan;
use nes_placement::{PlacementPlanner, PlacementRequest};
use nes_plan::{OperatorNode, QuerySubPlan};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Backend {
    Cpp,
    Mlir,
}

/// Runs one placement amendment over a fixed demo query and prints the
/// pipeline fragments the code generator produced for it.
#[derive(Parser, Debug)]
#[command(name = "nes-node", about = "Place and compile a demo streaming query across an in-memory worker topology")]
struct Args {
    /// Optional TOML config file, layered under `NesConfig::default()` and
    /// the `NES_*` environment overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which code generation backend to drive each compiled pipeline through.
    #[arg(long, value_enum, default_value_t = Backend::Cpp)]
    backend: Backend,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = load_config(&args)?;
    tracing::info!(?config.placement_amendment_mode, ?config.fault_tolerance_mode, "loaded configuration");

    let demo = fixtures::build();
    let id_gen = IdGenerator::starting_at(100);

    let request = PlacementRequest {
        shared_query_id: demo.query_plan.shared_query_id,
        pinned_upstream: vec![OperatorId(1)],
        pinned_downstream: vec![OperatorId(5)],
        pinned_upstream_workers: HashSet::from([demo.source_worker]),
        pinned_downstream_workers: HashSet::from([demo.sink_worker]),
        mode: config.placement_amendment_mode,
    };

    let planner = PlacementPlanner::new(config.retry);
    let amendment = planner
        .plan(&demo.topology, &demo.query_plan, &request, &id_gen)
        .context("placement planning failed")?;
    let worker_count = amendment.worker_node_ids_in_bfs.len();
    let committed = planner.commit(&demo.topology, amendment).context("placement commit failed")?;
    tracing::info!(workers_on_path = worker_count, "placement committed");

    let mut global_plan = GlobalExecutionPlan::new();
    global_plan.apply_amendment(committed, &id_gen).context("failed to fold amendment into the global execution plan")?;

    let backend: Box<dyn CompilerBackend> = match args.backend {
        Backend::Cpp => Box::new(CppSourceBackend),
        Backend::Mlir => Box::new(MlirBackend),
    };

    for worker in global_plan.hosting_workers(demo.query_plan.shared_query_id) {
        let node = global_plan.execution_node(worker)?;
        for sub_plan in node.sub_plans(demo.query_plan.shared_query_id) {
            compile_sub_plan(sub_plan, backend.as_ref())?;
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<NesConfig> {
    let config = match &args.config {
        Some(path) => NesConfig::from_file(path).with_context(|| format!("failed to load config from {}", path.display()))?,
        None => NesConfig::default(),
    };
    config.with_env_overrides().context("invalid NES_* environment override")
}

fn compile_sub_plan(sub_plan: &QuerySubPlan, backend: &dyn CompilerBackend) -> anyhow::Result<()> {
    let ordered = topological_order(sub_plan);
    if ordered.len() < 2 || ordered.iter().all(|op| op.kind.is_network()) {
        // A relay sub-plan (network source feeding straight into a network
        // sink on an intermediate hop) has nothing for the code generator to
        // scan; it only stitches a buffer from one worker to the next.
        tracing::debug!(worker = %sub_plan.worker_id, sub_plan = %sub_plan.id, "skipping relay sub-plan, no pipeline to generate");
        return Ok(());
    }

    let pipeline = generate_pipeline(&ordered, Arity::Unary).with_context(|| format!("code generation failed for sub-plan {}", sub_plan.id))?;
    let entry_symbol = format!("pipeline_w{}_s{}", sub_plan.worker_id.0, sub_plan.id.0);
    let artifact = backend.compile(pipeline, &entry_symbol).with_context(|| format!("backend compilation failed for {entry_symbol}"))?;

    println!("=== worker {} / sub-plan {} ===", sub_plan.worker_id, sub_plan.id);
    println!("entry symbol: {}", artifact.entry_symbol);
    println!("operator handlers: {:?}", artifact.handler_types);
    println!("{}", artifact.source);
    println!();

    Ok(())
}

/// Kahn's algorithm over `OperatorHeader::children`/`parents`, starting from
/// the sub-plan's leaves (sources), so the result can be handed directly to
/// [`generate_pipeline`], which requires a source-first, sink-last ordering.
fn topological_order(sub_plan: &QuerySubPlan) -> Vec<OperatorNode> {
    let mut remaining_children: HashMap<OperatorId, usize> = sub_plan
        .arena
        .ids()
        .map(|id| (id, sub_plan.arena.get(id).map(|op| op.header.children.len()).unwrap_or(0)))
        .collect();

    let mut queue: Vec<OperatorId> = remaining_children.iter().filter(|(_, &count)| count == 0).map(|(&id, _)| id).collect();
    queue.sort_by_key(|id| id.0);

    let mut order = Vec::with_capacity(remaining_children.len());
    let mut cursor = 0;
    while cursor < queue.len() {
        let id = queue[cursor];
        cursor += 1;
        let Ok(op) = sub_plan.arena.get(id) else { continue };
        for &parent in &op.header.parents {
            if let Some(count) = remaining_children.get_mut(&parent) {
                *count -= 1;
                if *count == 0 {
                    queue.push(parent);
                }
            }
        }
        order.push(op.clone());
    }
    order
}
