use std::f64::consts::TAU;

use crate::animation::ease::Ease;
use crate::behavior::definition::{BehaviorDefinition, BehaviorMeta};
use crate::behavior::options::BehaviorOptions;
use crate::behavior::registry::BehaviorRegistry;
use crate::foundation::error::{MotionError, MotionResult};
use crate::style::value::{StyleUpdate, StyleValue, fmt_num};
use crate::trigger::state::{TriggerField, TriggerState};

pub const SCROLL_FADE: &str = "scroll/fade";
pub const SCROLL_REVEAL: &str = "scroll/reveal";
pub const SCROLL_PARALLAX: &str = "scroll/parallax";
pub const SCROLL_PROGRESS: &str = "scroll/progress";
pub const SCROLL_SCALE: &str = "scroll/scale";
pub const HOVER_TILT: &str = "hover/tilt";
pub const TIME_PULSE: &str = "time/pulse";
pub const CAROUSEL_SLIDE: &str = "carousel/slide";
pub const COVER_STACK: &str = "cover/stack";

/// Register the built-in catalog into `registry`.
///
/// Safe to call any number of times; only the first call registers. Scroll behaviors and
/// `carousel/slide` are loaded eagerly, the rest register metadata and load on demand.
pub fn ensure_builtin_behaviors(registry: &BehaviorRegistry) {
    if !registry.mark_builtins_registered() {
        return;
    }
    registry.register(BehaviorDefinition::new(fade_meta(), fade));
    registry.register(BehaviorDefinition::new(reveal_meta(), reveal));
    registry.register(BehaviorDefinition::new(parallax_meta(), parallax));
    registry.register(BehaviorDefinition::new(progress_meta(), progress));
    registry.register(BehaviorDefinition::new(scale_meta(), scale));
    registry.register(BehaviorDefinition::new(slide_meta(), slide));

    registry.register_lazy(tilt_meta(), || async {
        anyhow::Ok(BehaviorDefinition::new(tilt_meta(), tilt))
    });
    registry.register_lazy(pulse_meta(), || async {
        anyhow::Ok(BehaviorDefinition::new(pulse_meta(), pulse))
    });
    registry.register_lazy(cover_meta(), || async {
        anyhow::Ok(BehaviorDefinition::new(cover_meta(), cover_stack))
    });
    tracing::debug!(count = registry.len(), "built-in behaviors registered");
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn translate_y(px: f64) -> StyleValue {
    StyleValue::text(format!("translate3d(0, {}px, 0)", fmt_num(px)))
}

fn fade_meta() -> BehaviorMeta {
    BehaviorMeta::new(SCROLL_FADE, "Fade in", &[TriggerField::Visibility])
        .describe("Opacity follows the element's intersection ratio.")
}

fn fade(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    let from = opts.number("from", 0.0)?;
    let to = opts.number("to", 1.0)?;
    let ease = opts.ease("ease", Ease::OutCubic)?;
    // Fade out while entering instead.
    let ratio = if opts.flag("invert", false)? {
        1.0 - state.element.intersection_ratio
    } else {
        state.element.intersection_ratio
    };
    let t = ease.apply(ratio);
    Ok(StyleUpdate::new().with("opacity", StyleValue::number(lerp(from, to, t))))
}

fn reveal_meta() -> BehaviorMeta {
    BehaviorMeta::new(SCROLL_REVEAL, "Reveal", &[TriggerField::Visibility])
        .describe("Slides up and fades in as the element enters the viewport.")
}

fn reveal(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    let distance = opts.number("distance", 40.0)?;
    // Ratio at which the reveal is complete.
    let full_at = opts.number("full_at", 0.5)?;
    let ease = opts.ease("ease", Ease::OutCubic)?;
    if full_at <= 0.0 {
        return Err(MotionError::compute("option 'full_at' must be > 0"));
    }
    let t = ease.apply((state.element.intersection_ratio / full_at).clamp(0.0, 1.0));
    Ok(StyleUpdate::new()
        .with("opacity", StyleValue::number(t))
        .with("transform", translate_y((1.0 - t) * distance)))
}

fn parallax_meta() -> BehaviorMeta {
    BehaviorMeta::new(SCROLL_PARALLAX, "Parallax", &[TriggerField::Scroll])
        .describe("Translates against the scroll offset at a fraction of its speed.")
}

fn parallax(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    let speed = opts.number("speed", 0.3)?;
    Ok(StyleUpdate::new().with("transform", translate_y(-state.scroll.offset * speed)))
}

fn progress_meta() -> BehaviorMeta {
    BehaviorMeta::new(SCROLL_PROGRESS, "Scroll progress", &[TriggerField::Scroll])
        .describe("Publishes page scroll progress as a custom property.")
}

fn progress(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    let property = opts.text("property", "--scroll-progress")?;
    if !property.starts_with("--") {
        return Err(MotionError::compute(format!(
            "option 'property' must be a custom property, got '{property}'"
        )));
    }
    Ok(StyleUpdate::new().with(property, StyleValue::number(state.scroll.progress)))
}

fn scale_meta() -> BehaviorMeta {
    BehaviorMeta::new(SCROLL_SCALE, "Scale in", &[TriggerField::Visibility])
}

fn scale(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    let from = opts.number("from", 0.9)?;
    let to = opts.number("to", 1.0)?;
    let ease = opts.ease("ease", Ease::OutQuad)?;
    let s = lerp(from, to, ease.apply(state.element.intersection_ratio));
    Ok(StyleUpdate::new().with("transform", StyleValue::text(format!("scale({})", fmt_num(s)))))
}

fn tilt_meta() -> BehaviorMeta {
    BehaviorMeta::new(
        HOVER_TILT,
        "Hover tilt",
        &[TriggerField::Pointer, TriggerField::Viewport],
    )
    .describe("Rotates toward the pointer; neutral when the pointer leaves.")
}

fn tilt(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    let max_deg = opts.number("max_deg", 8.0)?;
    let perspective = opts.number("perspective", 800.0)?;
    let n = state.pointer.normalized;
    let (rx, ry) = if state.pointer.inside {
        (-n.y * max_deg, n.x * max_deg)
    } else {
        (0.0, 0.0)
    };
    Ok(StyleUpdate::new().with(
        "transform",
        StyleValue::text(format!(
            "perspective({}px) rotateX({}deg) rotateY({}deg)",
            fmt_num(perspective),
            fmt_num(rx),
            fmt_num(ry)
        )),
    ))
}

fn pulse_meta() -> BehaviorMeta {
    BehaviorMeta::new(TIME_PULSE, "Pulse", &[TriggerField::Time])
}

fn pulse(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    let period = opts.number("period_ms", 2000.0)?;
    let amplitude = opts.number("amplitude", 0.04)?;
    if period <= 0.0 {
        return Err(MotionError::compute("option 'period_ms' must be > 0"));
    }
    let phase = (state.time.elapsed_ms / period).fract();
    let s = 1.0 + amplitude * (phase * TAU).sin();
    Ok(StyleUpdate::new().with("transform", StyleValue::text(format!("scale({})", fmt_num(s)))))
}

fn slide_meta() -> BehaviorMeta {
    BehaviorMeta::new(CAROUSEL_SLIDE, "Carousel slide", &[TriggerField::Track])
        .describe("Positions a section relative to the momentum track.")
}

fn slide(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    if state.element.section_index.is_none() {
        return Ok(StyleUpdate::new());
    }
    let offset = fmt_num(state.element.section_offset);
    let transform = match opts.text("axis", "y")? {
        "y" => format!("translate3d(0, {offset}px, 0)"),
        "x" => format!("translate3d({offset}px, 0, 0)"),
        other => {
            return Err(MotionError::compute(format!(
                "option 'axis' must be 'x' or 'y', got '{other}'"
            )));
        }
    };
    Ok(StyleUpdate::new()
        .with("transform", StyleValue::text(transform))
        .with(
            "--section-progress",
            StyleValue::number(state.track.section_progress),
        ))
}

fn cover_meta() -> BehaviorMeta {
    BehaviorMeta::new(
        COVER_STACK,
        "Cover stack",
        &[TriggerField::Scroll, TriggerField::Viewport],
    )
    .describe("Sticky sections recede as the next one scrolls over them.")
}

fn cover_stack(state: &TriggerState, opts: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    let depth = opts.number("depth", 0.08)?;
    let dim = opts.number("dim", 0.5)?;
    let el = &state.element;
    if el.section_index.is_none() || el.section_length <= 0.0 {
        return Ok(StyleUpdate::new());
    }
    // Negative offset: the section start has scrolled past the viewport top.
    let covered = (-el.section_offset / el.section_length).clamp(0.0, 1.0);
    Ok(StyleUpdate::new()
        .with(
            "transform",
            StyleValue::text(format!("scale({})", fmt_num(1.0 - covered * depth))),
        )
        .with("--cover-dim", StyleValue::number(covered * dim)))
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/builtin.rs"]
mod tests;
