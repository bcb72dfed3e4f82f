//! Performance benchmarks for ems_core using Criterion.rs.

use bevy_ecs::prelude::World;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ems_core::allocator::AllocationPlan;
use ems_core::config::DispatchStrategyKind;
use ems_core::ecs::Triage;
use ems_core::grid::GridId;
use ems_core::runner::{run_until_empty, simulation_schedule};
use ems_core::scenario::{
    build_simulation, DispatchPolicy, IncidentRecord, ShiftWindow, SimulationOptions,
};
use ems_core::tables::stations::StationKind;
use ems_core::tables::SharedTables;
use ems_core::test_helpers::{test_record, test_station, test_tables};

fn grid(x: i64) -> GridId {
    GridId::from_utm(100_000 + x * 10_000, 200_000)
}

fn bench_tables(depots: usize) -> SharedTables {
    let mut stations = Vec::new();
    for index in 0..depots {
        stations.push(test_station(
            &format!("Depot {index}"),
            StationKind::Depot,
            grid(index as i64),
            index % 2 == 0,
        ));
    }
    stations.push(test_station(
        "Hospital",
        StationKind::Hospital,
        grid(depots as i64),
        true,
    ));

    let mut od_entries = Vec::new();
    for a in 0..=depots as i64 {
        for b in 0..=depots as i64 {
            if a != b {
                od_entries.push((grid(a), grid(b), 120.0 + 60.0 * (a - b).abs() as f32));
            }
        }
    }
    test_tables(stations, &od_entries)
}

fn records(count: usize, depots: usize) -> Vec<IncidentRecord> {
    (0..count)
        .map(|index| {
            let triage = match index % 3 {
                0 => Triage::Acute,
                1 => Triage::Urgent,
                _ => Triage::Scheduled,
            };
            let mut record = test_record(index as i64 * 30, grid((index % depots) as i64), triage);
            record.wait_prepare_departure = 60;
            record.wait_departure_scene = if index % 4 == 0 { None } else { Some(300) };
            record.wait_available = Some(240);
            record
        })
        .collect()
}

fn run_once(strategy: DispatchStrategyKind, incident_count: usize, depots: usize) -> usize {
    let tables = bench_tables(depots);
    let depot_indices = tables.stations.depot_indices(true, -1);
    let plan = AllocationPlan::new(vec![vec![2; depot_indices.len()]], depot_indices);
    let options = SimulationOptions {
        policy: DispatchPolicy {
            kind: strategy,
            prioritize_triage: true,
            response_restricted: false,
        },
        shift: ShiftWindow {
            start: 0,
            end: 12 * 3600,
            segments: 4,
        },
        schedule_breaks: false,
        acute_travel_factor: 0.8,
        travel_noise_clamp: None,
        seed: 42,
    };

    let mut world = World::new();
    build_simulation(
        &mut world,
        tables,
        &records(incident_count, depots),
        plan,
        &options,
    );
    let mut schedule = simulation_schedule();
    run_until_empty(&mut world, &mut schedule, 5_000_000)
}

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![("small", 100, 4), ("medium", 500, 8), ("large", 2000, 15)];

    let mut group = c.benchmark_group("simulation_run");
    for (name, incidents, depots) in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(incidents, depots),
            |b, &(incidents, depots)| {
                b.iter(|| {
                    black_box(run_once(DispatchStrategyKind::Closest, incidents, depots));
                });
            },
        );
    }
    group.finish();
}

fn bench_dispatch_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_strategies");
    group.bench_function("random_500", |b| {
        b.iter(|| black_box(run_once(DispatchStrategyKind::Random, 500, 8)));
    });
    group.bench_function("closest_500", |b| {
        b.iter(|| black_box(run_once(DispatchStrategyKind::Closest, 500, 8)));
    });
    group.finish();
}

criterion_group!(benches, bench_simulation_run, bench_dispatch_strategies);
criterion_main!(benches);
