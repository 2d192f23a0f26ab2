//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the seams between the scheduler and the outside world.
//! Adapters in [`crate::adapter`] implement them; the testkit provides
//! scripted fakes.
//!
//! # Architecture
//!
//! ```text
//!                  ┌───────────────────────────┐
//!                  │    RebalanceScheduler     │
//!                  └───────────────────────────┘
//!        │                │               │               │
//!        ▼                ▼               ▼               ▼
//! ┌────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐
//! │  Target    │  │   Chain     │  │   Chain     │  │    Pass      │
//! │  Registry  │  │   Reader    │  │   Writer    │  │   Recorder   │
//! └────────────┘  └─────────────┘  └─────────────┘  └──────────────┘
//! ```

pub mod outbound;

pub use outbound::chain::{ChainReader, ChainWriter};
pub use outbound::recorder::PassRecorder;
pub use outbound::registry::TargetRegistry;
