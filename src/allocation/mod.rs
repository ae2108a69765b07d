//! The allocation engine.
//!
//! Pure computation: the service layer snapshots every table the plan
//! depends on into [`PlanningInputs`], and `build_plan` turns that
//! snapshot into a week of per-product container counts for one board.
//! Identical snapshots always produce identical plans, which keeps the
//! engine trivially testable and the HTTP layer free of business math.

pub mod adjustment;
pub mod calendar;
pub mod catalog;
pub mod closure;
pub mod formula;

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use calendar::{DayOfWeek, WEEK};
pub use catalog::{Board, ContainerUnit, MixMapping, ProductSpec, RoundingRule};
pub use closure::{ClosureWindow, DurationUnit};

/// Normalized map key for product names.
pub fn product_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// An active adjustment message attached to one day and product.
#[derive(Clone, Debug)]
pub struct AdjustmentNote {
    pub day: DayOfWeek,
    pub product_name: String,
    pub message: String,
}

/// A standing instruction attached to one day.
#[derive(Clone, Debug)]
pub struct InstructionNote {
    pub day: DayOfWeek,
    pub message: String,
    pub prep_only: bool,
}

/// Everything a plan depends on, read once and passed by value.
///
/// Product-keyed maps use [`product_key`] keys.
#[derive(Clone, Debug, Default)]
pub struct PlanningInputs {
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
    pub plan_next_week: bool,
    /// Weekday baseline sales projections.
    pub baseline_sales: HashMap<DayOfWeek, Decimal>,
    /// Date-specific overrides, e.g. a catering spike.
    pub future_sales: HashMap<NaiveDate, Decimal>,
    pub upts: HashMap<String, Decimal>,
    pub buffers: HashMap<String, Decimal>,
    pub daily_buffers: HashMap<(DayOfWeek, String), Decimal>,
    pub adjustments: Vec<AdjustmentNote>,
    pub closures: Vec<ClosureWindow>,
    pub instructions: Vec<InstructionNote>,
}

impl PlanningInputs {
    /// Sales used for a date: exact-date projection first, then the
    /// weekday baseline, then zero.
    pub fn sales_for(&self, date: NaiveDate, day: DayOfWeek) -> Decimal {
        self.future_sales
            .get(&date)
            .or_else(|| self.baseline_sales.get(&day))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Buffer percentage for a day and product: daily override first,
    /// then the product's global buffer, then zero.
    pub fn buffer_for(&self, day: DayOfWeek, key: &str) -> Decimal {
        self.daily_buffers
            .get(&(day, key.to_string()))
            .or_else(|| self.buffers.get(key))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// One product row on a board day.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AllocationItem {
    pub product: String,
    pub unit: ContainerUnit,
    /// Final count after adjustments, never negative.
    pub quantity: i64,
    /// Rounded count before adjustments.
    pub base_quantity: i64,
    pub buffer_pct: Decimal,
    pub adjustment_delta: i64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub adjustment_notes: Vec<String>,
}

/// One day of a board plan.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AllocationDay {
    pub day: DayOfWeek,
    pub date: NaiveDate,
    pub sales: Decimal,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub closure_reason: Option<String>,
    pub items: Vec<AllocationItem>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub instructions: Vec<String>,
}

/// A full week for one board.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AllocationPlan {
    pub board: Board,
    pub week_start: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub days: Vec<AllocationDay>,
    /// Catalog products skipped for lack of a stored UTP.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub missing_upt: Vec<String>,
}

/// Builds the week plan for one board from a snapshot.
pub fn build_plan(board: Board, inputs: &PlanningInputs) -> AllocationPlan {
    let week_start = calendar::week_start(inputs.today, inputs.plan_next_week);

    let missing_upt: Vec<String> = catalog::for_board(board)
        .filter(|spec| !inputs.upts.contains_key(&product_key(spec.name)))
        .map(|spec| spec.name.to_string())
        .collect();

    let days = WEEK
        .iter()
        .map(|&day| build_day(board, inputs, week_start, day))
        .collect();

    AllocationPlan {
        board,
        week_start,
        generated_at: inputs.now,
        days,
        missing_upt,
    }
}

fn build_day(
    board: Board,
    inputs: &PlanningInputs,
    week_start: NaiveDate,
    day: DayOfWeek,
) -> AllocationDay {
    let date = calendar::date_in_week(week_start, day);

    let instructions: Vec<String> = inputs
        .instructions
        .iter()
        .filter(|note| note.day == day && (!note.prep_only || board == Board::Prep))
        .map(|note| note.message.clone())
        .collect();

    if let Some(window) = closure::first_covering(&inputs.closures, date) {
        return AllocationDay {
            day,
            date,
            sales: Decimal::ZERO,
            closed: true,
            closure_reason: Some(window.reason.clone()),
            items: Vec::new(),
            instructions,
        };
    }

    let sales = inputs.sales_for(date, day);
    let items = catalog::for_board(board)
        .filter_map(|spec| build_item(inputs, day, sales, spec))
        .collect();

    AllocationDay {
        day,
        date,
        sales,
        closed: false,
        closure_reason: None,
        items,
        instructions,
    }
}

fn build_item(
    inputs: &PlanningInputs,
    day: DayOfWeek,
    sales: Decimal,
    spec: &ProductSpec,
) -> Option<AllocationItem> {
    let key = product_key(spec.name);
    let utp = *inputs.upts.get(&key)?;
    let buffer_pct = inputs.buffer_for(day, &key);

    let buffered = formula::buffered_containers(sales, utp, spec.servings_per_unit, buffer_pct);
    let base_quantity = formula::apply_rounding(buffered, spec.rounding);

    let mut adjustment_delta = 0;
    let mut adjustment_notes = Vec::new();
    for note in &inputs.adjustments {
        if note.day != day || product_key(&note.product_name) != key {
            continue;
        }
        adjustment_delta += adjustment::parse(&note.message).delta_for(spec.unit);
        adjustment_notes.push(note.message.clone());
    }

    Some(AllocationItem {
        product: spec.name.to_string(),
        unit: spec.unit,
        quantity: (base_quantity + adjustment_delta).max(0),
        base_quantity,
        buffer_pct,
        adjustment_delta,
        adjustment_notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A Wednesday; its week runs 2025-06-16 through 2025-06-22.
    fn today() -> NaiveDate {
        date(2025, 6, 18)
    }

    fn base_inputs() -> PlanningInputs {
        let mut inputs = PlanningInputs {
            today: today(),
            ..Default::default()
        };
        for day in WEEK {
            inputs.baseline_sales.insert(day, dec!(3000));
        }
        inputs.upts.insert(product_key("Breaded Filet"), dec!(16));
        inputs.upts.insert(product_key("Nugget"), dec!(170));
        inputs
    }

    fn find_item<'a>(day: &'a AllocationDay, product: &str) -> &'a AllocationItem {
        day.items
            .iter()
            .find(|i| i.product == product)
            .unwrap_or_else(|| panic!("{product} missing from {:?}", day.day))
    }

    #[test]
    fn plans_the_monday_anchored_week() {
        let plan = build_plan(Board::Thaw, &base_inputs());
        assert_eq!(plan.week_start, date(2025, 6, 16));
        assert_eq!(plan.days.len(), 7);
        assert_eq!(plan.days[0].day, DayOfWeek::Monday);
        assert_eq!(plan.days[0].date, date(2025, 6, 16));
        assert_eq!(plan.days[6].date, date(2025, 6, 22));
    }

    #[test]
    fn plan_next_week_shifts_every_date() {
        let mut inputs = base_inputs();
        inputs.plan_next_week = true;
        let plan = build_plan(Board::Thaw, &inputs);
        assert_eq!(plan.week_start, date(2025, 6, 23));
        assert_eq!(plan.days[0].date, date(2025, 6, 23));
    }

    #[test]
    fn quantities_follow_the_formula() {
        let plan = build_plan(Board::Thaw, &base_inputs());
        let monday = &plan.days[0];
        assert_eq!(monday.sales, dec!(3000));
        // 3000/1000*16 = 48 servings / 96 per case = 0.5, ceil -> 1.
        assert_eq!(find_item(monday, "Breaded Filet").quantity, 1);
        // 3000/1000*170 = 510 / 510 = 1.0, ceil -> 1.
        assert_eq!(find_item(monday, "Nugget").quantity, 1);
    }

    #[test]
    fn products_without_upt_are_skipped_and_reported_once() {
        let plan = build_plan(Board::Thaw, &base_inputs());
        // Only two thaw products have UTPs in the base snapshot.
        assert_eq!(plan.days[0].items.len(), 2);
        assert!(plan.missing_upt.contains(&"Spicy Filet".to_string()));
        assert!(plan.missing_upt.contains(&"Strip".to_string()));
        assert_eq!(plan.missing_upt.len(), 4);
    }

    #[test]
    fn future_projection_overrides_the_baseline() {
        let mut inputs = base_inputs();
        inputs.future_sales.insert(date(2025, 6, 20), dec!(9000));
        let plan = build_plan(Board::Thaw, &inputs);
        let friday = &plan.days[4];
        assert_eq!(friday.sales, dec!(9000));
        // 9000/1000*16 = 144 / 96 = 1.5, ceil -> 2.
        assert_eq!(find_item(friday, "Breaded Filet").quantity, 2);
        // Other days keep the baseline.
        assert_eq!(plan.days[0].sales, dec!(3000));
    }

    #[test]
    fn day_without_any_projection_computes_zero() {
        let mut inputs = base_inputs();
        inputs.baseline_sales.remove(&DayOfWeek::Sunday);
        let plan = build_plan(Board::Thaw, &inputs);
        let sunday = &plan.days[6];
        assert_eq!(sunday.sales, Decimal::ZERO);
        assert_eq!(find_item(sunday, "Breaded Filet").quantity, 0);
    }

    #[test]
    fn daily_buffer_overrides_the_global_buffer() {
        let mut inputs = base_inputs();
        inputs
            .buffers
            .insert(product_key("Breaded Filet"), dec!(10));
        inputs
            .daily_buffers
            .insert((DayOfWeek::Saturday, product_key("Breaded Filet")), dec!(200));
        let plan = build_plan(Board::Thaw, &inputs);

        let monday_item = find_item(&plan.days[0], "Breaded Filet");
        assert_eq!(monday_item.buffer_pct, dec!(10));
        // 0.5 * 1.10 = 0.55, ceil -> 1.
        assert_eq!(monday_item.quantity, 1);

        let saturday_item = find_item(&plan.days[5], "Breaded Filet");
        assert_eq!(saturday_item.buffer_pct, dec!(200));
        // 0.5 * 3.0 = 1.5, ceil -> 2.
        assert_eq!(saturday_item.quantity, 2);
    }

    #[test]
    fn adjustments_shift_the_rounded_count() {
        let mut inputs = base_inputs();
        inputs.adjustments.push(AdjustmentNote {
            day: DayOfWeek::Monday,
            product_name: "Breaded Filet".into(),
            message: "+2 cases for catering".into(),
        });
        let plan = build_plan(Board::Thaw, &inputs);
        let item = find_item(&plan.days[0], "Breaded Filet");
        assert_eq!(item.base_quantity, 1);
        assert_eq!(item.adjustment_delta, 2);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.adjustment_notes, vec!["+2 cases for catering"]);
    }

    #[test]
    fn negative_adjustments_clamp_at_zero() {
        let mut inputs = base_inputs();
        inputs.adjustments.push(AdjustmentNote {
            day: DayOfWeek::Monday,
            product_name: "Breaded Filet".into(),
            message: "-5 cases".into(),
        });
        let plan = build_plan(Board::Thaw, &inputs);
        let item = find_item(&plan.days[0], "Breaded Filet");
        assert_eq!(item.base_quantity, 1);
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn adjustment_units_must_match_the_container() {
        let mut inputs = base_inputs();
        // Breaded Filet counts in cases; a bag clause displays but adds 0.
        inputs.adjustments.push(AdjustmentNote {
            day: DayOfWeek::Monday,
            product_name: "Breaded Filet".into(),
            message: "+3 bags".into(),
        });
        let plan = build_plan(Board::Thaw, &inputs);
        let item = find_item(&plan.days[0], "Breaded Filet");
        assert_eq!(item.adjustment_delta, 0);
        assert_eq!(item.quantity, item.base_quantity);
        assert_eq!(item.adjustment_notes.len(), 1);
    }

    #[test]
    fn closure_suppresses_the_day() {
        let mut inputs = base_inputs();
        inputs.closures.push(ClosureWindow::new(
            date(2025, 6, 19),
            2,
            DurationUnit::Days,
            "power outage",
        ));
        let plan = build_plan(Board::Thaw, &inputs);

        for (idx, closed) in [(2, false), (3, true), (4, true), (5, false)] {
            assert_eq!(plan.days[idx].closed, closed, "day index {idx}");
        }
        let thursday = &plan.days[3];
        assert!(thursday.items.is_empty());
        assert_eq!(thursday.sales, Decimal::ZERO);
        assert_eq!(thursday.closure_reason.as_deref(), Some("power outage"));
    }

    #[test]
    fn prep_only_instructions_stay_off_the_thaw_board() {
        let mut inputs = base_inputs();
        inputs.upts.insert(product_key("Diced Chicken"), dec!(14));
        inputs.instructions.push(InstructionNote {
            day: DayOfWeek::Monday,
            message: "Sanitize the thaw cabinet".into(),
            prep_only: false,
        });
        inputs.instructions.push(InstructionNote {
            day: DayOfWeek::Monday,
            message: "Batch chicken salad early".into(),
            prep_only: true,
        });

        let thaw = build_plan(Board::Thaw, &inputs);
        assert_eq!(thaw.days[0].instructions, vec!["Sanitize the thaw cabinet"]);

        let prep = build_plan(Board::Prep, &inputs);
        assert_eq!(prep.days[0].instructions.len(), 2);
    }

    #[test]
    fn boards_only_carry_their_own_products() {
        let mut inputs = base_inputs();
        inputs.upts.insert(product_key("Diced Chicken"), dec!(14));
        let prep = build_plan(Board::Prep, &inputs);
        assert!(prep.days[0].items.iter().all(|i| i.product == "Diced Chicken"));
        assert!(!prep.missing_upt.contains(&"Breaded Filet".to_string()));
    }

    #[test]
    fn identical_snapshots_produce_identical_plans() {
        let mut inputs = base_inputs();
        inputs.future_sales.insert(date(2025, 6, 20), dec!(7250.50));
        inputs.adjustments.push(AdjustmentNote {
            day: DayOfWeek::Friday,
            product_name: "Nugget".into(),
            message: "+1 case and -1 case".into(),
        });
        let a = serde_json::to_value(build_plan(Board::Thaw, &inputs)).unwrap();
        let b = serde_json::to_value(build_plan(Board::Thaw, &inputs)).unwrap();
        assert_eq!(a, b);
    }
}
