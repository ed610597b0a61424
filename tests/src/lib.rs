#[cfg(test)]
mod probe_integration;
#[cfg(test)]
mod scan_integration;
