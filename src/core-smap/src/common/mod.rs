pub mod db_env;
pub mod deadline;
pub mod destination_config;
pub mod logging;
