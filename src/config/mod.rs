//! Policy configuration subsystem.
//!
//! # Data Flow
//! ```text
//! policy file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → HeaderPolicy (typed, immutable)
//!     → read by the compiler on every request
//! ```
//!
//! # Design Decisions
//! - A policy is immutable once loaded; the compiler only reads it
//! - All fields have defaults so an empty document yields the baseline set
//! - Off sentinels (`null`/`false`/absent) are normalized into the
//!   `Setting` tri-state at deserialization time, never re-checked later

pub mod loader;
pub mod schema;

pub use loader::{load_policy, PolicyError};
pub use schema::{
    ClearSiteDataConfig, CspConfig, ExpectCtConfig, FeaturePolicyConfig, HeaderPolicy, HstsConfig,
    Setting, SourceList,
};
