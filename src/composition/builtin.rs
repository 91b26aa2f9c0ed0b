use crate::animation::ease::Ease;
use crate::behavior::assignment::BehaviorAssignment;
use crate::behavior::builtin::{SCROLL_PARALLAX, SCROLL_PROGRESS, SCROLL_REVEAL};
use crate::behavior::options::BehaviorOptions;
use crate::composition::dsl::CompositionBuilder;
use crate::composition::model::{CompositionConfig, CompositionMeta, PresentationModel, WILDCARD};
use crate::composition::registry::CompositionRegistry;
use crate::foundation::error::MotionResult;

pub const CLASSIC: &str = "classic";
pub const COVER_SCROLL: &str = "cover-scroll";
pub const SLIDESHOW: &str = "slideshow";
pub const INFINITE_CAROUSEL: &str = "infinite-carousel";
pub const STATIC: &str = "static";

const COVER_SCROLL_JSON: &str = include_str!("presets/cover-scroll.json");
const SLIDESHOW_JSON: &str = include_str!("presets/slideshow.json");
const INFINITE_CAROUSEL_JSON: &str = include_str!("presets/infinite-carousel.json");

/// Register the built-in compositions into `registry`. Idempotent.
///
/// `classic` and `static` are built in code and registered loaded; the track-based
/// presets are JSON documents parsed on first resolution.
pub fn ensure_builtin_compositions(registry: &CompositionRegistry) -> MotionResult<()> {
    if !registry.mark_builtins_registered() {
        return Ok(());
    }
    registry.register(classic()?);
    registry.register(bare()?);

    registry.register_lazy(
        CompositionMeta::new(COVER_SCROLL, "Cover scroll", PresentationModel::CoverScroll),
        || async { parse_preset(COVER_SCROLL_JSON) },
    );
    registry.register_lazy(
        CompositionMeta::new(SLIDESHOW, "Slideshow", PresentationModel::Slideshow),
        || async { parse_preset(SLIDESHOW_JSON) },
    );
    registry.register_lazy(
        CompositionMeta::new(
            INFINITE_CAROUSEL,
            "Infinite carousel",
            PresentationModel::InfiniteCarousel,
        ),
        || async { parse_preset(INFINITE_CAROUSEL_JSON) },
    );
    tracing::debug!(count = registry.len(), "built-in compositions registered");
    Ok(())
}

fn parse_preset(json: &str) -> anyhow::Result<CompositionConfig> {
    Ok(CompositionConfig::from_json_str(json)?)
}

fn classic() -> MotionResult<CompositionConfig> {
    CompositionBuilder::new(CLASSIC, PresentationModel::Stacking)
        .label("Classic")
        .describe("Stacked sections under native scrolling, revealed as they enter view.")
        .transition(600.0, Ease::OutCubic)
        .section(WILDCARD, vec![BehaviorAssignment::new(SCROLL_REVEAL)])?
        .section(
            "hero",
            vec![BehaviorAssignment::new(SCROLL_PARALLAX)
                .with_options(BehaviorOptions::new().with("speed", 0.2))],
        )?
        .chrome(WILDCARD, vec![BehaviorAssignment::new(SCROLL_PROGRESS)])?
        .build()
}

fn bare() -> MotionResult<CompositionConfig> {
    CompositionBuilder::new(STATIC, PresentationModel::Static)
        .label("Static")
        .describe("No motion. Every assignment is ignored.")
        .bare()
        .build()
}

#[cfg(test)]
#[path = "../../tests/unit/composition/builtin.rs"]
mod tests;
