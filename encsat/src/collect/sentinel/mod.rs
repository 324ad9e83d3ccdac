pub mod tile_collect;
pub mod window;

pub use tile_collect::{SentinelTileCollect, TileSource};
pub use window::load_window;
