//! Static product catalog for the thaw and prep boards.
//!
//! Container sizes and rounding behavior are fixed properties of the
//! products the store carries, so they live in code rather than in a
//! table. Store-tunable numbers (UTP, buffers) stay in the database.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which board a product renders on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Board {
    Thaw,
    Prep,
}

/// Physical container a product is counted in.
///
/// `FromStr` accepts both singular and plural tokens so the adjustment
/// grammar ("+2 cases", "-1 bag") can reuse it.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ContainerUnit {
    #[strum(serialize = "case", to_string = "cases")]
    Cases,
    #[strum(serialize = "bag", to_string = "bags")]
    Bags,
    #[strum(serialize = "pan", to_string = "pans")]
    Pans,
    #[strum(serialize = "bucket", to_string = "buckets")]
    Buckets,
}

/// How a buffered container count is snapped to a whole number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoundingRule {
    /// Always round up; running out mid-shift costs more than thawing extra.
    Ceil,
    /// Round half away from zero.
    Nearest,
    /// Always round down; used where overage spoils.
    Floor,
}

/// Sales-mix line that drives a product's UTP suggestion.
#[derive(Clone, Copy, Debug)]
pub struct MixMapping {
    /// Report line item name, matched case-insensitively.
    pub item: &'static str,
    /// Servings consumed per item sold, e.g. 8 for an 8-count entree.
    pub servings_each: Decimal,
}

/// One catalog product: identity plus the constants the formula needs.
#[derive(Clone, Copy, Debug)]
pub struct ProductSpec {
    pub name: &'static str,
    pub board: Board,
    pub unit: ContainerUnit,
    pub servings_per_unit: Decimal,
    pub rounding: RoundingRule,
    /// Sales-mix line whose sold quantity suggests this product's UTP.
    pub mix: Option<MixMapping>,
}

pub static CATALOG: [ProductSpec; 10] = [
    ProductSpec {
        name: "Breaded Filet",
        board: Board::Thaw,
        unit: ContainerUnit::Cases,
        servings_per_unit: dec!(96),
        rounding: RoundingRule::Ceil,
        mix: Some(MixMapping {
            item: "Chicken Sandwich",
            servings_each: dec!(1),
        }),
    },
    ProductSpec {
        name: "Spicy Filet",
        board: Board::Thaw,
        unit: ContainerUnit::Cases,
        servings_per_unit: dec!(96),
        rounding: RoundingRule::Ceil,
        mix: Some(MixMapping {
            item: "Spicy Chicken Sandwich",
            servings_each: dec!(1),
        }),
    },
    ProductSpec {
        name: "Nugget",
        board: Board::Thaw,
        unit: ContainerUnit::Cases,
        servings_per_unit: dec!(510),
        rounding: RoundingRule::Ceil,
        mix: Some(MixMapping {
            item: "Nuggets 8-count",
            servings_each: dec!(8),
        }),
    },
    ProductSpec {
        name: "Strip",
        board: Board::Thaw,
        unit: ContainerUnit::Cases,
        servings_per_unit: dec!(225),
        rounding: RoundingRule::Nearest,
        mix: Some(MixMapping {
            item: "Strips 3-count",
            servings_each: dec!(3),
        }),
    },
    ProductSpec {
        name: "Grilled Filet",
        board: Board::Thaw,
        unit: ContainerUnit::Bags,
        servings_per_unit: dec!(24),
        rounding: RoundingRule::Nearest,
        mix: Some(MixMapping {
            item: "Grilled Sandwich",
            servings_each: dec!(1),
        }),
    },
    ProductSpec {
        name: "Grilled Nugget",
        board: Board::Thaw,
        unit: ContainerUnit::Bags,
        servings_per_unit: dec!(69),
        rounding: RoundingRule::Nearest,
        mix: Some(MixMapping {
            item: "Grilled Nuggets 8-count",
            servings_each: dec!(8),
        }),
    },
    ProductSpec {
        name: "Diced Chicken",
        board: Board::Prep,
        unit: ContainerUnit::Bags,
        servings_per_unit: dec!(42),
        rounding: RoundingRule::Ceil,
        mix: None,
    },
    ProductSpec {
        name: "Mac & Cheese",
        board: Board::Prep,
        unit: ContainerUnit::Pans,
        servings_per_unit: dec!(36),
        rounding: RoundingRule::Nearest,
        mix: Some(MixMapping {
            item: "Mac & Cheese Medium",
            servings_each: dec!(1),
        }),
    },
    ProductSpec {
        name: "Chicken Salad",
        board: Board::Prep,
        unit: ContainerUnit::Buckets,
        servings_per_unit: dec!(48),
        rounding: RoundingRule::Floor,
        mix: Some(MixMapping {
            item: "Chicken Salad Sandwich",
            servings_each: dec!(1),
        }),
    },
    ProductSpec {
        name: "Lemonade Mix",
        board: Board::Prep,
        unit: ContainerUnit::Buckets,
        servings_per_unit: dec!(30),
        rounding: RoundingRule::Nearest,
        mix: None,
    },
];

/// Case-insensitive lookup by product name.
pub fn find(name: &str) -> Option<&'static ProductSpec> {
    let name = name.trim();
    CATALOG.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Products for one board, in catalog (render) order.
pub fn for_board(board: Board) -> impl Iterator<Item = &'static ProductSpec> {
    CATALOG.iter().filter(move |p| p.board == board)
}

pub fn product_names() -> Vec<&'static str> {
    CATALOG.iter().map(|p| p.name).collect()
}
