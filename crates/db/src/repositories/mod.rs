//! Repository layer: one zero-sized struct per table with static async methods.

pub mod user_repo;

pub use user_repo::UserRepo;
