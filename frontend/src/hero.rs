use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, Event, HtmlVideoElement};

use crate::config::SiteConfig;
use crate::dom::{self, DomError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroPlan {
    /// Try the video, fall back to the still image if it will not play.
    PlayVideo,
    /// Narrow viewport: never load the video.
    StaticImage,
}

pub fn hero_plan(viewport_width: f64, min_video_width: f64) -> HeroPlan {
    if viewport_width > min_video_width {
        HeroPlan::PlayVideo
    } else {
        HeroPlan::StaticImage
    }
}

/// The still image shown instead of the video: `#heroFallback`, else `#heroImage`.
fn fallback_image(document: &Document, config: &SiteConfig) -> Option<Element> {
    dom::query(document, &config.selectors.hero_fallback)
        .or_else(|| dom::query(document, &config.selectors.hero_image))
}

fn show_fallback(video: &HtmlVideoElement, fallback: Option<&Element>) {
    dom::warn_on_failure("pause hero video", video.pause());
    dom::set_display(video, "none");
    if let Some(image) = fallback {
        dom::set_display(image, "block");
    }
}

pub fn install(config: &SiteConfig) -> Result<(), DomError> {
    let window = dom::window()?;
    let document = dom::document()?;
    let Some(video) = dom::query(&document, &config.selectors.hero_video) else {
        debug!("No hero video on this page");
        return Ok(());
    };
    let video = video
        .dyn_into::<HtmlVideoElement>()
        .map_err(|_| DomError::WrongType(config.selectors.hero_video.clone(), "video"))?;
    let fallback = fallback_image(&document, config);

    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    match hero_plan(width, config.layout.hero_video_min_width) {
        HeroPlan::StaticImage => {
            info!("Viewport {}px, hero video skipped", width);
            video.set_autoplay(false);
            video.set_preload("none");
            show_fallback(&video, fallback.as_ref());
        }
        HeroPlan::PlayVideo => {
            {
                let target = video.clone();
                let fallback = fallback.clone();
                dom::listen(&video, "error", move |_: Event| {
                    warn!("Hero video failed to decode, showing still image");
                    show_fallback(&target, fallback.as_ref());
                })?;
            }

            video.set_muted(true);
            match video.play() {
                Ok(promise) => {
                    spawn_local(async move {
                        if let Err(e) = JsFuture::from(promise).await {
                            warn!("Hero video playback rejected: {:?}", e);
                            show_fallback(&video, fallback.as_ref());
                        }
                    });
                }
                Err(e) => {
                    warn!("Hero video could not start: {:?}", e);
                    show_fallback(&video, fallback.as_ref());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_viewports_get_the_still_image() {
        assert_eq!(hero_plan(375.0, 560.0), HeroPlan::StaticImage);
        assert_eq!(hero_plan(560.0, 560.0), HeroPlan::StaticImage);
    }

    #[test]
    fn wide_viewports_try_the_video() {
        assert_eq!(hero_plan(561.0, 560.0), HeroPlan::PlayVideo);
        assert_eq!(hero_plan(1440.0, 560.0), HeroPlan::PlayVideo);
    }
}
