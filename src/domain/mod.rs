mod mvp;

pub use mvp::{Mvp, SpawnPoint};
