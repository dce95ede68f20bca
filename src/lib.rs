//! Core library for the p2p-market-aggregator project.
//!
//! Offers for the Bolivian P2P USDT/BOB market are loaded by [`feed`],
//! validated into [`models::Offer`], and turned into the by-user table, the
//! by-price table and the market summary by [`market`]. [`aggregator`] runs
//! that pipeline on a timer and [`export`] can persist each snapshot as JSON.

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod export;
pub mod feed;
pub mod market;
pub mod models;
pub mod utils;
