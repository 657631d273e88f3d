// Presentation layer: the line-oriented admin console.

pub mod console;
