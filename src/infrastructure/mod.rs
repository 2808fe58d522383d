pub mod config;
pub mod confirm;
pub mod divine_pride;
pub mod listing_parser;
pub mod persistence;
