mod catalog;
mod circulation;
mod db;
mod fines;
mod migrations;
mod people;
mod sql;
mod stats;

pub use db::{Database, OpenOptions};
pub use migrations::{Migration, MIGRATIONS};
pub use stats::CatalogStats;
