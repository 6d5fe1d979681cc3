pub mod facade;

pub use facade::SearchService;
