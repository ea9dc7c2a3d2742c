/// Read-through caching for catalog lookups.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`,
/// queues the result for a background write with `$ttl` seconds to live, and
/// returns it. A failed cache read is logged and treated as a miss. Errors from
/// `$block` propagate with `?`, so the macro must be the tail expression of a
/// function returning `AppResult`.
///
/// ```rust,ignore
/// async fn genre_map(&self) -> AppResult<HashMap<u64, String>> {
///     cached!(self.cache, CacheKey::GenreList, GENRE_TTL, async {
///         self.request_genres().await
///     })
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        };
        if let Some(cached) = hit {
            tracing::debug!(key = %key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
