mod mvp_store;

pub use mvp_store::{load_sink, LoadSummary, MvpStore};
