mod diff;

pub use diff::*;
