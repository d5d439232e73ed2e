pub mod link_cmd;
pub mod models_cmd;
pub mod records;
