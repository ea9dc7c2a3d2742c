pub mod memory;
pub mod postgres;
pub mod redis;
mod store;

pub use memory::MemoryStore;
pub use postgres::{create_pool, run_migrations, PgStore};
pub use redis::create_redis_client;
pub use redis::{Cache, CacheKey, CacheWriterHandle};
pub use store::{MovieStore, UserStore};

#[cfg(test)]
pub use store::{MockMovieStore, MockUserStore};
