pub mod store;

pub use store::MemoryRecordStore;
