//! Headless preview - scroll a sample page and sample its motion
//!
//! The page is a viewport-high hero (three depth layers under a scroll
//! blend mask) followed by a heading, a parallax image, a divider, a row of
//! service cards and a statistics band.

use anyhow::{Context, Result};
use kinetic_animation::{
    ArchitecturalDivider, AnimationScheduler, Counter, CounterOptions, DepthLayer,
    DividerOrientation, MotionContext, NumberFormat, Parallax, ParallaxOptions, Preset, Reveal,
    ScrollBlendMask, StaggerGroup,
};
use kinetic_core::{AnimationController, MotionConfig, Rect};
use kinetic_platform::{EventHub, HostEvent, LayoutBox};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

const FRAME: f32 = 1.0 / 60.0;

/// Viewport size given as `WIDTHxHEIGHT`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let parse = |part: &str| -> std::result::Result<f32, String> {
            match part.trim().parse::<f32>() {
                Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
                _ => Err(format!("invalid viewport dimension '{}'", part)),
            }
        };
        Ok(Self {
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub struct PreviewOptions {
    pub scroll: f32,
    pub viewport: Viewport,
    pub frames: u32,
    pub settle: u32,
    pub every: u32,
    pub reduced_motion: bool,
}

/// Run the simulation and return one JSON sample per `every` frames, plus
/// the final frame
pub fn run(config: MotionConfig, options: &PreviewOptions) -> Result<Vec<Value>> {
    let Viewport { width, height } = options.viewport;

    let scheduler = AnimationScheduler::new();
    let hub = EventHub::new(width, height);
    let controller = AnimationController::new(&config.capability);
    controller.set_reduced_motion(options.reduced_motion);
    let ctx = MotionContext::new(controller, &scheduler, hub.clone(), config);

    let depth_layers: Vec<DepthLayer> = (0..3).map(|depth| DepthLayer::new(&ctx, depth)).collect();
    let hero_mask = ScrollBlendMask::new(&ctx);

    let heading = Reveal::preset(
        &ctx,
        LayoutBox::new(&hub, Rect::new(0.0, height + 200.0, width, 120.0)),
        Preset::FadeUp,
    )
    .context("heading reveal")?;
    let image = Parallax::new(
        &ctx,
        LayoutBox::new(&hub, Rect::new(0.0, height + 400.0, width, 400.0)),
        ParallaxOptions::default(),
    )
    .context("image parallax")?;
    let divider = ArchitecturalDivider::new(
        &ctx,
        LayoutBox::new(&hub, Rect::new(0.0, height + 900.0, width, 1.0)),
        DividerOrientation::Horizontal,
    );
    let services = StaggerGroup::new(
        &ctx,
        LayoutBox::new(&hub, Rect::new(0.0, height + 1000.0, width, 360.0)),
        Preset::FadeUp,
        3,
    )
    .context("service cards")?;
    let counter_options = CounterOptions::stat_card(1200.0, 0, &ctx.config().counter)
        .context("statistics counter")?
        .with_format(NumberFormat::new().suffix("+"));
    let counter = Counter::new(
        &ctx,
        LayoutBox::new(&hub, Rect::new(0.0, height + 1400.0, width / 4.0, 160.0)),
        counter_options,
    );

    let frames = options.frames.max(1);
    let total = frames.saturating_add(options.settle);
    let every = options.every.max(1);
    let mut samples = Vec::new();

    for frame in 0..total {
        if frame < frames {
            let y = options.scroll * (frame + 1) as f32 / frames as f32;
            hub.dispatch(&HostEvent::Scroll { x: 0.0, y });
        }
        scheduler.advance(FRAME);

        if frame % every != 0 && frame + 1 != total {
            continue;
        }

        samples.push(json!({
            "frame": frame,
            "scroll": hub.state().scroll.y,
            "hero": {
                "depth_offsets": depth_layers.iter().map(DepthLayer::offset).collect::<Vec<_>>(),
                "mask_opacity": hero_mask.opacity(),
            },
            "heading": {
                "phase": heading.phase(),
                "style": heading.style(),
            },
            "image_offset": image.offset(),
            "divider": divider.style(),
            "services": services
                .children()
                .iter()
                .map(|child| child.progress())
                .collect::<Vec<_>>(),
            "counter": counter.display(),
        }));
    }

    tracing::debug!("preview produced {} samples over {} frames", samples.len(), total);
    Ok(samples)
}
