//! Key-based authorization subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → extractor.rs (x-functions-key header, else ?code=)
//!     → slot.rs (per-request memo, resolve at most once)
//!     → resolver.rs (match key against secret tiers via comparer.rs)
//!     → bypass.rs (compare level with the route's requirement)
//!     → allow, or 401
//! ```
//!
//! # Design Decisions
//! - Fail closed: store errors and cancellation deny, they never downgrade to Anonymous
//! - Secrets are compared in constant time with respect to content
//! - Requirements are fixed when routes are registered

pub mod bypass;
pub mod comparer;
pub mod extractor;
pub mod level;
pub mod resolver;
pub mod slot;

pub use bypass::{authorize, Decision, DenyReason, RouteRequirement};
pub use comparer::secure_equals;
pub use extractor::{extract, extract_from_request, FUNCTIONS_KEY_HEADER, FUNCTIONS_KEY_QUERY};
pub use level::{AuthorizationLevel, MisconfiguredRequirement};
pub use resolver::{AuthError, LevelResolver, MatchedTier, Resolution, ResolutionOutcome};
pub use slot::{AuthorizationSlot, SlotState};
