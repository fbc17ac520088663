pub mod cache;
pub mod extract;
pub mod heuristic;
pub mod layout;
pub mod rules;
pub mod segmenter;

use std::sync::Arc;

use scholia_core::config::AppConfig;
use scholia_core::error::Result;
use scholia_core::parser::DocumentParser;

pub use cache::ArtifactCache;
pub use heuristic::HeuristicParser;
pub use layout::LayoutAwareParser;
pub use segmenter::HttpLayoutSegmenter;

/// Picks the parsing strategy from configuration: layout-aware when a layout
/// service is configured, heuristic otherwise.
pub fn parser_from_config(config: &AppConfig) -> Result<Arc<dyn DocumentParser>> {
    let cache = ArtifactCache::new(config.parsed_dir());
    match &config.layout_url {
        Some(url) => {
            let segmenter = Arc::new(HttpLayoutSegmenter::new(url.clone())?);
            Ok(Arc::new(LayoutAwareParser::new(segmenter).with_cache(cache)))
        }
        None => Ok(Arc::new(HeuristicParser::new().with_cache(cache))),
    }
}
