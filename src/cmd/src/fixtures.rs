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

//! An in-memory three-worker topology and a hand-built `QueryPlan`, standing
//! in for the coordinator service and parser/optimizer front end this binary
//! does not implement. A real deployment discovers workers over the network
//! and compiles a query plan from a submitted query; this fixture exists so
//! the placement-through-codegen pipeline can be driven end to end from a
//! single process.

use std::time::Duration;

use nes_common::ids::{OperatorId, SharedQueryId, WorkerId};
use nes_common::property::{PropertyKey, PropertyValue};
use nes_plan::expr::{ComparisonOp, Expression};
use nes_plan::{
    AggregationFunction, DataType, Field, MemoryLayout, OperatorKind, OperatorNode, QueryPlan, Schema, TimeCharacteristic, TriggerPolicy, WatermarkUnit,
    WindowDescriptor, WindowType,
};
use nes_topology::{Capacities, Topology, TopologyNode};

/// `source -> selection -> watermarkAssigner -> window -> sink`, pinned
/// across three workers: the source on `worker(1)`, the selection/watermark/
/// window fragment on `worker(2)`, and the sink on `worker(3)`. Placement
/// stitches the two worker boundaries with network sink/source pairs.
pub struct Demo {
    pub topology: Topology,
    pub query_plan: QueryPlan,
    pub source_worker: WorkerId,
    pub sink_worker: WorkerId,
}

pub fn build() -> Demo {
    let topology = build_topology();
    let query_plan = build_query_plan();
    Demo {
        topology,
        query_plan,
        source_worker: WorkerId(1),
        sink_worker: WorkerId(3),
    }
}

fn build_topology() -> Topology {
    let topology = Topology::new();
    topology.add_node(TopologyNode::new(WorkerId(1), "10.0.0.1", 4000, 4, Capacities::new(1 << 20, 1 << 20), 0.99));
    topology.add_node(TopologyNode::new(WorkerId(2), "10.0.0.2", 4000, 4, Capacities::new(1 << 20, 1 << 20), 0.99));
    topology.add_node(TopologyNode::new(WorkerId(3), "10.0.0.3", 4000, 4, Capacities::new(1 << 20, 1 << 20), 0.99));
    topology.add_link(WorkerId(1), WorkerId(2));
    topology.add_link(WorkerId(2), WorkerId(3));
    topology
}

fn reading_schema() -> Schema {
    Schema::new(
        vec![
            Field::new("sensor_id", DataType::Int64),
            Field::new("temperature", DataType::Int64),
            Field::new("event_time", DataType::Int64),
        ],
        MemoryLayout::Row,
    )
}

fn build_query_plan() -> QueryPlan {
    let schema = reading_schema();
    let mut plan = QueryPlan::new(SharedQueryId(1));

    let mut source = OperatorNode::new(
        OperatorId(1),
        OperatorKind::Source {
            logical_source_name: "temperature_readings".to_string(),
        },
    );
    source.header.output_schema = schema.clone();

    let mut selection = OperatorNode::new(
        OperatorId(2),
        OperatorKind::Selection {
            predicate: Expression::compare(ComparisonOp::Gt, Expression::field("temperature"), Expression::int(-40)),
        },
    );
    selection.header.input_schema = schema.clone();
    selection.header.output_schema = schema.clone();

    let mut watermark = OperatorNode::new(
        OperatorId(3),
        OperatorKind::WatermarkAssigner {
            timestamp_field: "event_time".to_string(),
            unit: WatermarkUnit::Milliseconds,
            lateness: Duration::from_secs(2),
        },
    );
    watermark.header.input_schema = schema.clone();
    watermark.header.output_schema = schema.clone();

    let mut window = OperatorNode::new(
        OperatorId(4),
        OperatorKind::Window(WindowDescriptor {
            keyed: true,
            key_field: Some("sensor_id".to_string()),
            window_type: WindowType::Tumbling { size: Duration::from_secs(10) },
            time_characteristic: TimeCharacteristic::EventTime,
            timestamp_field: Some("event_time".to_string()),
            aggregation: AggregationFunction::Avg,
            aggregated_field: "temperature".to_string(),
            trigger_policy: TriggerPolicy::OnWatermark,
        }),
    );
    window.header.input_schema = schema.clone();
    window.header.output_schema = schema.clone();

    let mut sink = OperatorNode::new(
        OperatorId(5),
        OperatorKind::Sink {
            logical_sink_name: "temperature_alerts".to_string(),
        },
    );
    sink.header.input_schema = schema;

    // Pin every operator's worker up front. `compute_sub_plans` walks the
    // plan strict-BFS from the pinned upstream operators and requires
    // PINNED_WORKER_ID on each one it visits, not only on the source/sink
    // endpoints a placement strategy would normally have pinned.
    for (op, worker) in [
        (&mut source, WorkerId(1)),
        (&mut selection, WorkerId(2)),
        (&mut watermark, WorkerId(2)),
        (&mut window, WorkerId(2)),
        (&mut sink, WorkerId(3)),
    ] {
        op.header.properties.set(PropertyKey::PinnedWorkerId, PropertyValue::Worker(worker));
    }

    plan.arena.insert(source);
    plan.arena.insert(selection);
    plan.arena.insert(watermark);
    plan.arena.insert(window);
    plan.arena.insert(sink);

    plan.arena.add_edge(OperatorId(1), OperatorId(2)).expect("source -> selection");
    plan.arena.add_edge(OperatorId(2), OperatorId(3)).expect("selection -> watermark");
    plan.arena.add_edge(OperatorId(3), OperatorId(4)).expect("watermark -> window");
    plan.arena.add_edge(OperatorId(4), OperatorId(5)).expect("window -> sink");

    plan
}
