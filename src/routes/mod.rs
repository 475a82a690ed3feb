pub mod health;
pub mod historic;
