//! Core library for the city info gateway.
//!
//! This crate defines:
//! - Configuration loading (file + environment)
//! - Clients for the insights and weather upstreams, behind provider traits
//! - The in-process recipe store
//! - Aggregation of the city view and validation of recipe submissions
//! - The HTTP router and server runtime
//!
//! It is used by `cityinfo-server`, but the router can be mounted by other binaries too.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod server;
pub mod store;
pub mod submission;

pub use aggregator::CityInfoAggregator;
pub use api::{AppState, router};
pub use config::Config;
pub use error::{CityError, ValidationError};
pub use model::{CityInfoResponse, CityInsights, Coordinates, Day, Recipe, WeatherOutlook};
pub use provider::{CityInsightsClient, InsightsProvider, Upstream, WeatherClient, WeatherProvider};
pub use server::{LogReadyHook, ReadyHook, ServerHandle, WebhookReadyHook};
pub use store::RecipeStore;
pub use submission::RecipeSubmissionService;
