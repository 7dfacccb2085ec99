// Document-to-score pipeline and the HTTP surface around it.
// Extraction, parsing and scoring live in their own modules; this one wires them
// together, persists results and exposes them to callers.

pub mod handlers;
pub mod repository;
pub mod runner;
