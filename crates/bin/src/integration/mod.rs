//! Steps of an interactive run: settings, prompts and the archive loop.

pub(crate) mod archive;
pub(crate) mod prompt;
pub(crate) mod settings;
