//! 活动场景：标题揭示、逐词副标题、常驻的细线滚动与整体浮动，顶部打字机。

use crate::config::EngineConfig;
use crate::easing::Easing;
use crate::error::TimelineError;
use crate::target::PropertySet;
use crate::timeline::{Position, Repeat, Step, Timeline, TimelineConfig};
use crate::typewriter::Typewriter;

use super::{EventContent, SceneBuilder};

pub(super) fn build(
    b: &mut SceneBuilder<'_>,
    content: &EventContent,
    config: &EngineConfig,
) -> Result<(), TimelineError> {
    let hidden = PropertySet::new().num("opacity", 0.0).num("y", 0.0);

    let container = b.element("container", PropertySet::new().num("y", 0.0));
    let ticker = b.element("ticker", hidden.clone());
    let title = b.element(
        "title",
        hidden.clone().num("clip_top", 100.0).text("text", content.event_title.as_str()),
    );
    let words: Vec<&str> = content.event_subtitle.split(' ').collect();
    let subtitle = b.elements("subtitle", words.len(), &hidden);
    for (element, word) in subtitle.iter().zip(&words) {
        element.set("text", *word);
    }
    let theme = b.element("theme", hidden.clone().text("text", content.event_theme.as_str()));
    let meta = b.element("meta", hidden.clone().text("text", content.event_meta.as_str()));
    let hairline = b.element(
        "hairline",
        PropertySet::new().num("opacity", 0.0).num("x_percent", 0.0),
    );
    b.element(
        "cta",
        PropertySet::new().num("opacity", 1.0).text("text", content.cta_label.as_str()),
    );

    let mut tl = Timeline::new(TimelineConfig::named("event-entrance"));
    tl.add_step(
        Step::from_to(
            &title,
            PropertySet::new().num("clip_top", 100.0).num("opacity", 0.0).num("y", 50.0),
            PropertySet::new().num("clip_top", 0.0).num("opacity", 1.0).num("y", 0.0),
        )
        .duration(1500)
        .ease(Easing::Power4Out),
    )?;
    tl.add_step(
        Step::from_to(
            &ticker,
            PropertySet::new().num("opacity", 0.0).num("y", 10.0),
            PropertySet::new().num("opacity", 1.0).num("y", 0.0),
        )
        .duration(800)
        .ease(Easing::Power2Out)
        .at(Position::AfterEnd(-500)),
    )?;
    tl.add_step(
        Step::from_to(
            subtitle,
            PropertySet::new().num("opacity", 0.0).num("y", 10.0),
            PropertySet::new().num("opacity", 1.0).num("y", 0.0),
        )
        .duration(800)
        .stagger(50)
        .ease(Easing::Power2Out)
        .at(Position::AfterEnd(-800)),
    )?;
    tl.add_step(
        Step::from_to(
            &theme,
            PropertySet::new().num("opacity", 0.0).num("y", 8.0),
            PropertySet::new().num("opacity", 1.0).num("y", 0.0),
        )
        .duration(700)
        .ease(Easing::Power2Out)
        .at(Position::AfterEnd(-450)),
    )?;
    tl.add_step(
        Step::from_to(
            vec![meta, hairline.clone()],
            PropertySet::new().num("opacity", 0.0),
            PropertySet::new().num("opacity", 1.0),
        )
        .duration(1000)
        .at(Position::AfterEnd(-500)),
    )?;
    b.run(tl)?;

    let mut scroll = Timeline::new(TimelineConfig::named("event-hairline"));
    scroll.add_step(
        Step::to(&hairline, PropertySet::new().num("x_percent", 100.0))
            .duration(10_000)
            .ease(Easing::Linear)
            .repeat(Repeat::Infinite),
    )?;
    b.run(scroll)?;

    let mut float = Timeline::new(TimelineConfig::named("event-float"));
    float.add_step(
        Step::to(&container, PropertySet::new().num("y", -4.0))
            .duration(4_000)
            .ease(Easing::SineInOut)
            .repeat(Repeat::Infinite)
            .yoyo(true),
    )?;
    b.run(float)?;

    b.typewriter(
        "ticker",
        Typewriter::new(&content.event_phrases, config.typewriter.clone()),
    );
    Ok(())
}
