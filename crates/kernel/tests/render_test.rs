#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end rendering: formatter output through the theme engine.

mod common;

use common::{TestDir, banner_id, state_from, write_site_config};
use responsive_image::{FormatterSettings, ImageLink};
use uuid::Uuid;
use vetrina_kernel::error::KernelError;
use vetrina_sdk::types::{AttributedItem, FieldItem, FieldItemList, HostEntity};

fn banner_item() -> AttributedItem {
    AttributedItem::from(FieldItem::new(banner_id()).alt("Harbour at dusk").dimensions(1920, 1080))
}

#[tokio::test]
async fn renders_picture_for_imported_style() {
    let dir = TestDir::new("render_picture");
    write_site_config(&dir);
    let state = state_from(&dir).await;

    let formatter = state.responsive_image_formatter(FormatterSettings::new("wide_banner"));
    let elements = formatter
        .render(FieldItemList::new(HostEntity::unsaved("item")).item(banner_item()))
        .await
        .unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].responsive_image_style_id, "wide_banner");
    assert_eq!(
        elements[0].cache.tags,
        vec![
            "config:image.style.crop_16x9",
            "config:image.style.crop_4x3",
            "config:responsive_image.styles.wide_banner",
        ]
    );

    let html = state.render_html(&elements).await.unwrap();
    assert!(html.starts_with("<picture>"), "{html}");
    assert!(html.contains("<source media=\"(min-width: 960px)\""), "{html}");
    assert!(html.contains("styles&#x2F;crop_16x9&#x2F;images&#x2F;banner.jpg 1x"), "{html}");
    assert!(html.contains("alt=\"Harbour at dusk\""), "{html}");
    assert!(html.contains("width=\"800\" height=\"600\""), "{html}");
    assert!(!html.contains("<a href"), "{html}");
}

#[tokio::test]
async fn file_link_wraps_picture() {
    let dir = TestDir::new("render_file_link");
    write_site_config(&dir);
    let state = state_from(&dir).await;

    let formatter = state.responsive_image_formatter(
        FormatterSettings::new("wide_banner").link(ImageLink::File),
    );
    let elements = formatter
        .render(FieldItemList::new(HostEntity::unsaved("item")).item(banner_item()))
        .await
        .unwrap();
    assert_eq!(elements[0].url.as_deref(), Some("/files/images/banner.jpg"));

    let html = state.render_html(&elements).await.unwrap();
    assert!(html.starts_with("<a href="), "{html}");
    assert!(html.ends_with("</a>"), "{html}");
}

#[tokio::test]
async fn content_link_uses_site_url() {
    let dir = TestDir::new("render_content_link");
    write_site_config(&dir);
    let state = state_from(&dir).await;
    let entity_id = Uuid::now_v7();

    let formatter = state.responsive_image_formatter(
        FormatterSettings::new("wide_banner").link(ImageLink::Content),
    );
    let elements = formatter
        .render(FieldItemList::new(HostEntity::saved("item", entity_id)).item(banner_item()))
        .await
        .unwrap();

    assert_eq!(
        elements[0].url,
        Some(format!("http://localhost:3000/item/{entity_id}"))
    );
}

#[tokio::test]
async fn item_attributes_reach_the_img_tag() {
    let dir = TestDir::new("render_attrs");
    write_site_config(&dir);
    let state = state_from(&dir).await;

    let formatter = state.responsive_image_formatter(FormatterSettings::new("wide_banner"));
    let elements = formatter
        .render(
            FieldItemList::new(HostEntity::unsaved("item"))
                .item(banner_item().attr("loading", "lazy")),
        )
        .await
        .unwrap();

    let html = state.render_html(&elements).await.unwrap();
    assert!(html.contains("loading=\"lazy\""), "{html}");
}

#[tokio::test]
async fn missing_style_renders_original() {
    let dir = TestDir::new("render_missing_style");
    write_site_config(&dir);
    let state = state_from(&dir).await;

    let formatter = state.responsive_image_formatter(FormatterSettings::new("deleted_style"));
    let elements = formatter
        .render(FieldItemList::new(HostEntity::unsaved("item")).item(banner_item()))
        .await
        .unwrap();
    assert_eq!(elements[0].responsive_image_style_id, "");
    assert!(elements[0].cache.tags.is_empty());

    let html = state.render_html(&elements).await.unwrap();
    assert!(!html.contains("<source"), "{html}");
    assert!(html.contains("src=\"&#x2F;files&#x2F;images&#x2F;banner.jpg\""), "{html}");
    assert!(html.contains("width=\"1920\""), "{html}");
}

#[tokio::test]
async fn unknown_files_render_nothing() {
    let dir = TestDir::new("render_unknown_file");
    write_site_config(&dir);
    let state = state_from(&dir).await;

    let formatter = state.responsive_image_formatter(FormatterSettings::new("wide_banner"));
    let elements = formatter
        .render(
            FieldItemList::new(HostEntity::unsaved("item"))
                .item(FieldItem::new(Uuid::now_v7()))
                .item(FieldItem::default()),
        )
        .await
        .unwrap();

    assert!(elements.is_empty());
    assert_eq!(state.render_html(&elements).await.unwrap(), "");
}

#[tokio::test]
async fn validate_settings_against_imported_styles() {
    let dir = TestDir::new("render_validate");
    write_site_config(&dir);
    let state = state_from(&dir).await;

    let ok = state.responsive_image_formatter(FormatterSettings::new("wide_banner"));
    assert!(ok.validate_settings().await.is_ok());

    let unmapped = state.responsive_image_formatter(FormatterSettings::new("unmapped"));
    let err = KernelError::from(unmapped.validate_settings().await.unwrap_err());
    assert!(err.to_string().contains("unmapped"), "{err}");

    let options = ok.style_options().await.unwrap();
    assert_eq!(
        options,
        vec![("wide_banner".to_string(), "Wide banner".to_string())]
    );
}
