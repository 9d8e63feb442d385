//! Sitemap construction: records, rendering and shards.

mod record;
mod render;
mod shard;

pub use record::{
    ChangeFreq, UrlRecord, build_records, content_records, dedupe_by_path, route_records,
};
pub use render::{IndexEntry, render_index, render_urlset};
pub use shard::{GroupedShards, INDEX_FILE, Shard, ShardSource, write_shards};
