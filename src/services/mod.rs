// Planning inputs
pub mod buffers;
pub mod projections;
pub mod sales;
pub mod upts;

// Board overlays
pub mod closures;
pub mod instructions;
pub mod messages;

// The engine over a live snapshot
pub mod allocations;

// Ordering and reporting
pub mod salesmix;
pub mod truck_items;

// Background upkeep
pub mod maintenance;
