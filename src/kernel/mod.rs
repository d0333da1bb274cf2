pub mod cycle;
pub mod effect;
pub mod event;
pub mod reactor;
pub mod time;
