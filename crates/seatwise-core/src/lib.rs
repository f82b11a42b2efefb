//! seatwise-core library.
//!
//! Guest relationship forests and seat allocation for wedding venues.
//!
//! # Conventions
//!
//! - **Errors**: module errors are `thiserror` enums that fold into
//!   [`error::PlanError`]; every error exposes a stable [`error::ErrorCode`].
//!   `anyhow::Result` is used only for configuration loading.
//! - **Logging**: `tracing` `debug!` events for committed state changes. The
//!   engine returns errors and never logs them.
//! - **Concurrency**: no internal threads. Share a plan across callers with
//!   [`plan::SharedPlan`].

pub mod config;
pub mod coordinator;
pub mod error;
pub mod graph;
pub mod model;
pub mod plan;
pub mod seating;

pub use config::{EngineConfig, GeometryConfig, PlanningConfig};
pub use error::{ErrorCode, PlanError};
pub use graph::{FamilyGraph, Forest, GraphError};
pub use model::{Attendee, AttendeeId, Capacity, Point, Shape, Side, Table, TableNumber};
pub use plan::{SharedPlan, TablePlan, Version};
pub use seating::{SeatingError, SeatingStats, VenueLayout, Violation};
