/// Centralized constants for vttclean
pub mod constants {
    /// Global config directory name (in the user config directory)
    pub const GLOBAL_CONFIG_DIR_NAME: &str = "vttclean";

    /// Global configuration filename
    pub const CONFIG_FILENAME: &str = "config.toml";

    /// Per-folder configuration filename, looked up inside the input folder
    pub const LOCAL_CONFIG_FILENAME: &str = ".vttclean.toml";

    /// Extension of the subtitle files to clean (matched case-insensitively)
    pub const INPUT_EXTENSION: &str = "vtt";

    /// Appended to the input file stem to name the output file
    pub const DEFAULT_OUTPUT_SUFFIX: &str = "_cleaned";

    /// Written after every chunk in text output
    pub const CHUNK_SEPARATOR: &str = "\n\n";

    /// Directories never descended into when scanning recursively
    pub const IGNORED_DIRECTORIES: &[&str] = &[".git", "node_modules", "target"];
}
