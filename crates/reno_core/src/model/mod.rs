mod task;
mod zone;

pub use task::{
    DEFAULT_DURATION_DAYS, MAX_DURATION_DAYS, Priority, Task, TaskStatus, canonical_key,
    whole_days,
};
pub use zone::{DEFAULT_ZONES, Zone};
