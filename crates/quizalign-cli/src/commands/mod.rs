pub mod generate;
pub mod init;
pub mod keywords;
pub mod validate;
