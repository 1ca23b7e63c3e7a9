pub mod colleges;
pub mod partitions;
