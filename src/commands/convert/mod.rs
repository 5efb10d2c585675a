mod pipeline;
mod run;
#[cfg(test)]
mod tests;

pub use pipeline::{CancelToken, ConversionOutcome, Converter};
pub use run::run;
