//! External collaborators consumed by the composition shell.

pub mod ollama;
