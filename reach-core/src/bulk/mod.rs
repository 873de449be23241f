mod executor;

pub use executor::{parse_domains_from_file, BulkExecutor, BulkResult, ProgressCallback};
