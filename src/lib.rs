//! Subfmt - Subtitle Filename Convention Converter
//!
//! Detects which naming convention a subtitle filename follows, decomposes it
//! and renames library subtitles to another convention without losing the
//! language, source or default/forced track information.

pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod formatter;
pub mod scanner;
