pub mod probe;
pub mod proxy;
pub mod report;
pub mod scanner;
pub mod sources;
