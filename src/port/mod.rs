//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! Outbound ports are implemented by storage adapters; inbound ports are the
//! request shapes external drivers (controllers, the CLI) hand to the
//! application services.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!     ┌──────────┐   │      Application        │   ┌─────────────┐
//!     │   CLI /  ├──▶│ VoteLedger ChatResolver ├──▶│   Store     │
//!     │Controller│   │  Messenger  Subjects    │   │   Adapter   │
//!     └──────────┘   └─────────────────────────┘   └─────────────┘
//! ```

pub mod inbound;
pub mod outbound;
