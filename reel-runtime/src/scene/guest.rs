//! 嘉宾场景。

use crate::easing::Easing;
use crate::error::TimelineError;
use crate::target::PropertySet;
use crate::timeline::{Position, Repeat, Step, Timeline, TimelineConfig};

use super::{GuestContent, SceneBuilder};

pub(super) fn build(b: &mut SceneBuilder<'_>, content: &GuestContent) -> Result<(), TimelineError> {
    let hidden = PropertySet::new().num("opacity", 0.0).num("y", 0.0);

    let portrait = b.optional(
        "portrait",
        !content.guest_image_url.is_empty(),
        PropertySet::new()
            .num("clip_right", 100.0)
            .num("scale", 1.1)
            .num("x", 0.0)
            .text("image", content.guest_image_url.as_str()),
    );
    let name = b.element("name", hidden.clone().text("text", content.guest_name.as_str()));
    let meta = b.element(
        "meta",
        hidden
            .clone()
            .text("text", format!("{} / {}", content.guest_role, content.guest_company)),
    );
    let words: Vec<&str> = content.guest_bio.split(' ').collect();
    let bio = b.elements("bio", words.len(), &hidden);
    for (element, word) in bio.iter().zip(&words) {
        element.set("text", *word);
    }
    // 标签静态显示，不参与入场
    let tags = b.elements(
        "tag",
        content.guest_tags.len(),
        &PropertySet::new().num("opacity", 1.0),
    );
    for (element, tag) in tags.iter().zip(&content.guest_tags) {
        element.set("text", tag.as_str());
    }

    let mut tl = Timeline::new(TimelineConfig::named("guest-entrance"));
    // 肖像横向揭示并轻微缩小
    tl.add_step(
        Step::from_to(
            portrait.as_ref(),
            PropertySet::new().num("clip_right", 100.0).num("scale", 1.1),
            PropertySet::new().num("clip_right", 0.0).num("scale", 1.0),
        )
        .duration(2000)
        .ease(Easing::Power3InOut),
    )?;
    tl.add_step(
        Step::from_to(
            &name,
            PropertySet::new().num("y", 30.0).num("opacity", 0.0),
            PropertySet::new().num("y", 0.0).num("opacity", 1.0),
        )
        .duration(1200)
        .ease(Easing::Power4Out)
        .at(Position::AfterEnd(-500)),
    )?;
    tl.add_step(
        Step::from_to(
            &meta,
            PropertySet::new().num("y", 20.0).num("opacity", 0.0),
            PropertySet::new().num("y", 0.0).num("opacity", 1.0),
        )
        .duration(1000)
        .ease(Easing::Power3Out)
        .at(Position::AfterEnd(-800)),
    )?;
    tl.add_step(
        Step::from_to(
            bio,
            PropertySet::new().num("opacity", 0.0).num("y", 5.0),
            PropertySet::new().num("opacity", 1.0).num("y", 0.0),
        )
        .duration(800)
        .stagger(20)
        .ease(Easing::Power2Out)
        .at(Position::AfterEnd(-500)),
    )?;
    b.run(tl)?;

    let mut float = Timeline::new(TimelineConfig::named("guest-portrait-float"));
    float.add_step(
        Step::to(portrait.as_ref(), PropertySet::new().num("x", 4.0))
            .duration(6_000)
            .ease(Easing::SineInOut)
            .repeat(Repeat::Infinite)
            .yoyo(true),
    )?;
    b.run(float)?;
    Ok(())
}
