pub mod catalog;
pub mod enrichment;
pub mod providers;
pub mod recommendations;
pub mod search;
