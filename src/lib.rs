pub mod cli;
pub mod conference;
pub mod config;
pub mod error;
pub mod overlay;
pub mod provider;
pub mod selection;
pub mod shutdown;
pub mod startup;
pub mod tracker;
