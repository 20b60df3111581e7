pub mod fetcher;
pub mod registry;
