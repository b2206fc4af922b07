// ABOUTME: Configuration constants shared across the sprint bulletin packages
// ABOUTME: Environment variable names and their defaults

pub mod constants;
