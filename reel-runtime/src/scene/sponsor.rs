//! 赞助商场景：标语、logo 弹跳，卡片分开翻转展示背面，再合回完整 logo。

use crate::easing::Easing;
use crate::error::TimelineError;
use crate::target::PropertySet;
use crate::timeline::{Position, Repeat, Step, Timeline, TimelineConfig};

use super::{SceneBuilder, SponsorContent};

/// 卡片出现的时间点，卡片的横向展开以它为基准
pub(super) const CARDS_LABEL: &str = "cards";

fn ms(s: f32) -> u64 {
    (s * 1000.0).round() as u64
}

pub(super) fn build(
    b: &mut SceneBuilder<'_>,
    content: &SponsorContent,
) -> Result<(), TimelineError> {
    let card_count = content.cards.len();

    let container = b.element("container", PropertySet::new().num("y", 0.0));
    let phrase = b.element(
        "phrase",
        PropertySet::new()
            .num("opacity", 0.0)
            .num("y", 0.0)
            .text("text", content.sponsor_impact_phrase.as_str()),
    );
    let logo = b.optional(
        "logo",
        !content.sponsor_logo_url.is_empty(),
        PropertySet::new()
            .num("opacity", 0.0)
            .num("scale", 0.9)
            .num("y", 18.0)
            .text("image", content.sponsor_logo_url.as_str()),
    );
    let grid = b.element("grid", PropertySet::new().num("opacity", 0.0));
    let cards = b.elements(
        "card",
        card_count,
        &PropertySet::new().num("opacity", 0.0).num("x", 0.0),
    );
    let inners = b.elements("card_inner", card_count, &PropertySet::new().num("rotate_y", 0.0));
    let backs = b.elements(
        "card_back",
        card_count,
        &PropertySet::new().num("opacity", 0.0).num("y", 0.0),
    );
    for (i, (back, card)) in backs.iter().zip(&content.cards).enumerate() {
        back.set("title", card.title.as_str());
        back.set("cta", card.cta_label.as_str());
        back.set("href", card.cta_href.as_str());
        // 要点随背面一起淡入，自身不做动画
        let bullets = b.elements(
            &format!("card_bullet.{i}"),
            card.bullets.len(),
            &PropertySet::new(),
        );
        for (element, bullet) in bullets.iter().zip(&card.bullets) {
            element.set("text", bullet.as_str());
        }
    }
    let first = cards.first();
    let last = cards.get(2);

    let mut tl = Timeline::new(TimelineConfig::named("sponsor-entrance"));
    tl.add_step(
        Step::from_to(
            &phrase,
            PropertySet::new().num("opacity", 0.0).num("y", 20.0),
            PropertySet::new().num("opacity", 1.0).num("y", 0.0),
        )
        .duration(900)
        .ease(Easing::Power2Out),
    )?;
    tl.add_step(
        Step::to(
            logo.as_ref(),
            PropertySet::new().num("opacity", 1.0).num("scale", 1.0).num("y", 0.0),
        )
        .duration(750)
        .ease(Easing::Power3Out)
        .at(Position::AfterEnd(-100)),
    )?;
    tl.add_step(
        Step::to(logo.as_ref(), PropertySet::new().num("y", -6.0))
            .duration(450)
            .ease(Easing::Power1InOut)
            .repeat(Repeat::Count(1))
            .yoyo(true)
            .at(Position::AfterEnd(250)),
    )?;

    // 网格淡入，logo 同时淡出，卡片出现
    tl.add_step(
        Step::to(&grid, PropertySet::new().num("opacity", 1.0))
            .duration(200)
            .ease(Easing::Linear)
            .at(Position::AfterEnd(-150)),
    )?;
    tl.add_step(
        Step::to(logo.as_ref(), PropertySet::new().num("opacity", 0.0))
            .duration(250)
            .ease(Easing::Power1Out)
            .at(Position::WithStart(0)),
    )?;
    tl.add_label(CARDS_LABEL, Position::WithStart(0))?;
    tl.add_step(
        Step::from_to(
            cards.clone(),
            PropertySet::new().num("opacity", 0.0),
            PropertySet::new().num("opacity", 1.0),
        )
        .duration(350)
        .ease(Easing::Power2Out)
        .at(Position::label(CARDS_LABEL)),
    )?;
    tl.add_step(
        Step::to(first, PropertySet::new().num("x", -70.0))
            .duration(750)
            .ease(Easing::Power3InOut)
            .at(Position::label_offset(CARDS_LABEL, 50)),
    )?;
    tl.add_step(
        Step::to(last, PropertySet::new().num("x", 70.0))
            .duration(750)
            .ease(Easing::Power3InOut)
            .at(Position::WithStart(0)),
    )?;

    // 翻到背面
    tl.add_step(
        Step::to(inners.clone(), PropertySet::new().num("rotate_y", 180.0))
            .duration(ms(1.15))
            .stagger(120)
            .ease(Easing::Power3InOut)
            .at(Position::AfterEnd(200)),
    )?;
    tl.add_step(
        Step::from_to(
            backs.clone(),
            PropertySet::new().num("opacity", 0.0).num("y", 8.0),
            PropertySet::new().num("opacity", 1.0).num("y", 0.0),
        )
        .duration(500)
        .stagger(80)
        .ease(Easing::Power2Out)
        .at(Position::AfterEnd(-350)),
    )?;

    // 停留后翻回
    tl.add_step(
        Step::to(backs, PropertySet::new().num("opacity", 0.0).num("y", -8.0))
            .duration(350)
            .stagger(40)
            .ease(Easing::Power2In)
            .at(Position::AfterEnd(ms(1.1) as i64)),
    )?;
    tl.add_step(
        Step::to(inners, PropertySet::new().num("rotate_y", 0.0))
            .duration(1000)
            .stagger(100)
            .ease(Easing::Power3InOut)
            .at(Position::AfterEnd(50)),
    )?;
    tl.add_step(
        Step::to(first, PropertySet::new().num("x", 0.0))
            .duration(750)
            .ease(Easing::Power3InOut)
            .at(Position::AfterEnd(-350)),
    )?;
    tl.add_step(
        Step::to(last, PropertySet::new().num("x", 0.0))
            .duration(750)
            .ease(Easing::Power3InOut)
            .at(Position::WithStart(0)),
    )?;

    // 合回完整 logo
    tl.add_step(
        Step::to(logo.as_ref(), PropertySet::new().num("opacity", 1.0))
            .duration(300)
            .ease(Easing::Power1Out)
            .at(Position::AfterEnd(-100)),
    )?;
    tl.add_step(
        Step::to(&grid, PropertySet::new().num("opacity", 0.0))
            .duration(300)
            .ease(Easing::Power1Out)
            .at(Position::WithStart(0)),
    )?;
    tl.add_step(
        Step::to(logo.as_ref(), PropertySet::new().num("y", 0.0).num("scale", 1.0))
            .duration(350)
            .ease(Easing::Power2Out)
            .at(Position::WithStart(0)),
    )?;
    b.run(tl)?;

    let mut float = Timeline::new(TimelineConfig::named("sponsor-float"));
    float.add_step(
        Step::to(&container, PropertySet::new().num("y", -3.0))
            .duration(5_000)
            .ease(Easing::SineInOut)
            .repeat(Repeat::Infinite)
            .yoyo(true),
    )?;
    b.run(float)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::scene::{ActiveScene, SceneContent, SceneKind};
    use crate::timeline::TimelineScheduler;

    #[test]
    fn test_cards_flip_and_return() {
        let content = SceneContent::demo().unwrap();
        let mut scheduler = TimelineScheduler::new();
        let scene = ActiveScene::mount(
            SceneKind::Sponsor,
            &content,
            &EngineConfig::default(),
            &mut scheduler,
        )
        .unwrap();

        let inner = scene.element("card_inner.1").unwrap().clone();
        let left = scene.element("card.0").unwrap().clone();
        let mut saw_flipped = false;
        let mut saw_spread = false;
        for _ in 0..1_000 {
            scheduler.advance(10);
            saw_flipped |= inner.number_or("rotate_y", 0.0) > 179.0;
            saw_spread |= left.number_or("x", 0.0) < -69.0;
        }
        assert!(saw_flipped);
        assert!(saw_spread);
        assert_eq!(inner.number_or("rotate_y", -1.0), 0.0);
        assert_eq!(left.number_or("x", -1.0), 0.0);
        let logo = scene.element("logo").unwrap();
        assert_eq!(logo.number_or("opacity", 0.0), 1.0);
        assert_eq!(logo.number_or("y", 1.0), 0.0);
    }

    #[test]
    fn test_card_backs_carry_bullets() {
        let content = SceneContent::demo().unwrap();
        let mut scheduler = TimelineScheduler::new();
        let scene = ActiveScene::mount(
            SceneKind::Sponsor,
            &content,
            &EngineConfig::default(),
            &mut scheduler,
        )
        .unwrap();

        let card = &content.sponsor.cards[2];
        let back = scene.element("card_back.2").unwrap();
        assert_eq!(back.text("cta").as_deref(), Some(card.cta_label.as_str()));
        for (j, bullet) in card.bullets.iter().enumerate() {
            let element = scene.element(&format!("card_bullet.2.{j}")).unwrap();
            assert_eq!(element.text("text").as_deref(), Some(bullet.as_str()));
        }
    }

    #[test]
    fn test_missing_logo_keeps_timing() {
        let mut content = SceneContent::demo().unwrap();
        let mut scheduler = TimelineScheduler::new();
        let with_logo = ActiveScene::mount(
            SceneKind::Sponsor,
            &content,
            &EngineConfig::default(),
            &mut scheduler,
        )
        .unwrap();
        content.sponsor.sponsor_logo_url.clear();
        let without_logo = ActiveScene::mount(
            SceneKind::Sponsor,
            &content,
            &EngineConfig::default(),
            &mut scheduler,
        )
        .unwrap();
        assert!(without_logo.element("logo").is_none());

        let durations: Vec<_> = [&with_logo, &without_logo]
            .iter()
            .map(|scene| {
                scene
                    .timelines
                    .iter()
                    .filter_map(|h| scheduler.timeline(*h))
                    .find(|tl| tl.name() == "sponsor-entrance")
                    .and_then(|tl| tl.duration())
            })
            .collect();
        assert!(durations[0].is_some());
        assert_eq!(durations[0], durations[1]);
    }
}
