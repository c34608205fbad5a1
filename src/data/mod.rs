pub mod inserter;
pub mod parser;
pub mod reader;
pub mod source;
pub mod storage;
