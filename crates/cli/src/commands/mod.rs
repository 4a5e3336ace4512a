pub mod check;
pub mod schema;
pub mod solve;
pub mod verify;
