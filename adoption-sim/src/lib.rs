//! Discrete-event simulation of product adoption: consumers develop needs,
//! companies advertise, and consumers adopt products that satisfy their needs.

pub mod agents;
pub mod communication;
pub mod config;
pub mod context;
pub mod distribution;
pub mod error;
pub mod events;
pub mod expiration;
pub mod logging;
pub mod messages;
pub mod need;
pub mod need_scheme;
pub mod output;
pub mod pending;
pub mod process_model;
pub mod product;
pub mod scenarios;
pub mod scheduler;
pub mod sim_engine;
pub mod time_model;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use sim_engine::SimEngine;
