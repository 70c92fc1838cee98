// Batch pipeline: drives the classifier over an ordered list of comments.

pub mod batch;
pub mod progress;
