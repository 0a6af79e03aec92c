pub mod decompose;
pub mod fit;
pub mod init_db;
pub mod predict;
pub mod quantize;
pub mod run;
