mod config;
mod importer;
#[cfg(test)]
mod tests;

pub use config::ImporterConfig;
pub use importer::DealImporter;
