pub mod resource;
pub mod user_challenges;
