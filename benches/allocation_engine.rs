use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::time::Duration;

use backhouse_api::allocation::{
    adjustment, build_plan, catalog, formula, product_key, AdjustmentNote, Board, ClosureWindow,
    DayOfWeek, DurationUnit, InstructionNote, PlanningInputs, RoundingRule, WEEK,
};

/// A snapshot shaped like a busy store: every product configured, buffers
/// set, a closure mid-week, and `messages` active adjustment notes.
fn populated_inputs(messages: usize) -> PlanningInputs {
    let today = NaiveDate::from_ymd_opt(2025, 6, 18).expect("valid date");
    let mut inputs = PlanningInputs {
        today,
        now: Utc
            .with_ymd_and_hms(2025, 6, 18, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
        plan_next_week: false,
        ..Default::default()
    };

    for (i, &day) in WEEK.iter().enumerate() {
        inputs
            .baseline_sales
            .insert(day, Decimal::from(9_000 + i as i64 * 1_250));
    }
    inputs.future_sales.insert(
        NaiveDate::from_ymd_opt(2025, 6, 21).expect("valid date"),
        Decimal::from(21_500),
    );

    for (i, spec) in catalog::CATALOG.iter().enumerate() {
        let key = product_key(spec.name);
        inputs
            .upts
            .insert(key.clone(), Decimal::new(385 + i as i64 * 45, 1));
        inputs
            .buffers
            .insert(key, Decimal::from(5 + (i as i64 % 4) * 5));
    }
    inputs.daily_buffers.insert(
        (DayOfWeek::Saturday, product_key("Nugget")),
        Decimal::from(35),
    );

    let notes = ["+2 cases for catering", "-1 bag back Saturday", "+1 pan, -1 bucket"];
    for i in 0..messages {
        let spec = &catalog::CATALOG[i % catalog::CATALOG.len()];
        inputs.adjustments.push(AdjustmentNote {
            day: WEEK[i % WEEK.len()],
            product_name: spec.name.to_string(),
            message: notes[i % notes.len()].to_string(),
        });
    }

    inputs.closures.push(ClosureWindow::new(
        NaiveDate::from_ymd_opt(2025, 6, 20).expect("valid date"),
        1,
        DurationUnit::Days,
        "Dining room renovation",
    ));

    inputs.instructions.push(InstructionNote {
        day: DayOfWeek::Saturday,
        message: "Start the second lemonade batch by 9am".to_string(),
        prep_only: false,
    });
    inputs.instructions.push(InstructionNote {
        day: DayOfWeek::Monday,
        message: "Date-check every salad bucket".to_string(),
        prep_only: true,
    });

    inputs
}

// Benchmark for building a full week plan on each board
fn board_build_benchmark(c: &mut Criterion) {
    let inputs = populated_inputs(12);
    let mut group = c.benchmark_group("build_plan");

    group.bench_function("thaw", |b| {
        b.iter(|| black_box(build_plan(Board::Thaw, black_box(&inputs))))
    });
    group.bench_function("prep", |b| {
        b.iter(|| black_box(build_plan(Board::Prep, black_box(&inputs))))
    });

    group.finish();
}

// Benchmark for plan builds as active adjustment messages pile up
fn adjustment_scaling_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_plan_with_messages");

    for size in [0usize, 8, 32, 128].iter() {
        let inputs = populated_inputs(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &inputs, |b, inputs| {
            b.iter(|| black_box(build_plan(Board::Thaw, black_box(inputs))));
        });
    }

    group.finish();
}

// Benchmark for the adjustment message grammar
fn adjustment_parse_benchmark(c: &mut Criterion) {
    let message =
        "Team: +3 cases for the football crowd, -1 case back Saturday and +2 bags, -1 bucket";

    c.bench_function("adjustment_parse", |b| {
        b.iter(|| black_box(adjustment::parse(black_box(message))))
    });
}

// Benchmark for the per-item container formula
fn container_formula_benchmark(c: &mut Criterion) {
    let sales = Decimal::from(14_800);
    let utp = Decimal::new(385, 1);
    let servings = Decimal::from(96);
    let buffer = Decimal::from(15);

    c.bench_function("buffered_containers", |b| {
        b.iter(|| {
            let buffered = formula::buffered_containers(
                black_box(sales),
                black_box(utp),
                black_box(servings),
                black_box(buffer),
            );
            black_box(formula::apply_rounding(buffered, RoundingRule::Ceil))
        })
    });
}

// Benchmark for serializing a finished plan, the hot path of every board GET
fn plan_serialization_benchmark(c: &mut Criterion) {
    let inputs = populated_inputs(12);
    let plan = build_plan(Board::Thaw, &inputs);

    c.bench_function("plan_serialize", |b| {
        b.iter(|| {
            let serialized = serde_json::to_string(&plan).unwrap();
            black_box(serialized)
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets =
        board_build_benchmark,
        adjustment_scaling_benchmark,
        adjustment_parse_benchmark,
        container_formula_benchmark,
        plan_serialization_benchmark
}

criterion_main!(benches);
