pub mod reporter;

pub use reporter::{LocalStation, QueuedReporter, ReportingGateway, Spot};
