pub mod ingest;
pub mod power;
pub mod wave;
pub mod window;

pub use power::{power_db, POWER_FLOOR_DB};
pub use wave::{WaveHeader, TARGET_DATA_BYTES, TARGET_RATE_HZ};
pub use window::{AudioWindow, FinalizedWindow, WindowFinalizer};
