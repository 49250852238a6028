pub mod gameplay;
pub mod invitation;
pub mod ranking;
