// Planning inputs
pub mod daily_buffer;
pub mod future_projection;
pub mod product_upt;
pub mod projection_config;
pub mod sales_projection;

// Board overlays
pub mod adjustment_message;
pub mod closure_plan;
pub mod instruction;

// Ordering and reporting
pub mod sales_mix_batch;
pub mod sales_mix_row;
pub mod truck_item;

pub mod buffer;
