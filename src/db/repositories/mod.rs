pub mod intervals;
pub mod sessions;

pub use intervals::IntervalRepository;
pub use sessions::SessionRepository;
