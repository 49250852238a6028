pub mod history;
pub mod rankings;
