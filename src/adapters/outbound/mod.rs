pub mod network;
pub mod storage;
