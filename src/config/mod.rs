pub mod path_matcher;
pub mod settings;

pub use path_matcher::{list_directory, GlobExpander};
pub use settings::Settings;
