pub mod disk;
pub mod jobs;
pub mod library;
pub mod worker;
