//! `forecourt-infra` — durable storage backends for the station core.

pub mod json_store;

pub use json_store::JsonFileStore;
