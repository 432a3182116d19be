// src/constants.rs

/// Environment variable that points directly at the configuration file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Name of the application directory inside the user's config dir.
pub const APP_CONFIG_DIR: &str = "project-helper";

/// Name of the configuration file looked up inside [`APP_CONFIG_DIR`].
pub const APP_CONFIG_FILENAME: &str = "application.toml";

/// Additional arg holding the application root path.
pub const APPLICATION_PATH_TAG: &str = "application-path";

/// Additional arg holding the resolved execution path of a path-changing operation.
pub const EXECUTION_PATH_TAG: &str = "execution-path";

/// Key of the common entry of a predefined-argument table.
pub const WILDCARD_ARG_KEY: &str = "*";

/// Name of the built-in flag selecting the operation to run.
pub const OPERATION_FLAG: &str = "operation";

/// Separator used whenever a list of values is flattened into one argument.
pub const VALUE_SEPARATOR: &str = ",";
