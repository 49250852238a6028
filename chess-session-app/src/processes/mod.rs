pub mod clock_sweep_runner;
pub mod game_timeout_runner;
