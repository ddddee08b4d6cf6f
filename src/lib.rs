pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod image;
pub mod model;
pub mod query;
pub mod rating;
pub mod registry;
pub mod seed;
pub mod storage;
pub mod write_queue;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::RegistryConfig;
pub use error::{Result, StallError};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use image::{encode_data_uri, ingest};
pub use model::{CurrentUser, NewReview, NewStall, Review, Stall, CURRENT_USER};
pub use query::{ReviewWithStall, StallFilter, StallSort};
pub use registry::{InitReport, RegistryStats, StallRegistry};
pub use storage::{Collection, KeyValueStore, MemoryStore, SqliteStore};
pub use write_queue::WriteQueueHandle;
