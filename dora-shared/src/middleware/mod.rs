// auth_extractor only provides the FromRequestParts impl for AuthUser,
// which is visible without a re-export.
mod auth_extractor;
mod tracing_layer;
mod metrics_layer;

pub use tracing_layer::*;
pub use metrics_layer::*;
