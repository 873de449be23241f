mod resolver;

pub use resolver::{DnsOutcome, HostResolver, Resolution};
