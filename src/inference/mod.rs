//! Inference module
//!
//! Serving-time half of the pipeline: a raw request is validated against the
//! feature schema, encoded with the artifact's frozen transform and scored by
//! its forest. Nothing here fits or mutates model state.

mod request;
mod response;
mod service;

pub use request::PredictionRequest;
pub use response::PredictionResponse;
pub use service::{predict, InferenceService};
