pub mod aggregator;
pub mod collector;
pub mod providers;
pub mod sheets_service;
pub mod sink;
pub mod youtube_service;

#[cfg(test)]
pub(crate) mod testing;
