pub mod classifier;

pub use classifier::ClassifierConfig;
