//! The `responsive_image` field formatter.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use vetrina_sdk::prelude::*;

use crate::settings::{FormatterSettings, ImageLink, SettingsError, SettingsForm};

/// Renders image field items through a responsive image style.
///
/// Every host capability the formatter needs is injected at construction.
/// The formatter itself holds no mutable state and loads the configured
/// styles fresh on every call; caching is left to the host, keyed by the
/// cache tags attached to each element.
pub struct ResponsiveImageFormatter {
    settings: FormatterSettings,
    responsive_image_styles: Arc<dyn EntityStorage<ResponsiveImageStyle>>,
    image_styles: Arc<dyn EntityStorage<ImageStyle>>,
    files: Arc<dyn EntityStorage<FileInfo>>,
    urls: Arc<dyn UrlGenerator>,
}

impl ResponsiveImageFormatter {
    pub fn new(
        settings: FormatterSettings,
        responsive_image_styles: Arc<dyn EntityStorage<ResponsiveImageStyle>>,
        image_styles: Arc<dyn EntityStorage<ImageStyle>>,
        files: Arc<dyn EntityStorage<FileInfo>>,
        urls: Arc<dyn UrlGenerator>,
    ) -> Self {
        Self {
            settings,
            responsive_image_styles,
            image_styles,
            files,
            urls,
        }
    }

    pub fn default_settings() -> FormatterSettings {
        FormatterSettings::default()
    }

    pub fn settings(&self) -> &FormatterSettings {
        &self.settings
    }

    /// Selectable responsive image styles as (id, label) pairs.
    ///
    /// Styles without a usable breakpoint mapping are left out: they would
    /// render nothing.
    pub async fn style_options(&self) -> Result<Vec<(String, String)>> {
        let styles = self
            .responsive_image_styles
            .load_all()
            .await
            .context("failed to load responsive image styles")?;

        Ok(styles
            .into_iter()
            .filter(|(_, style)| style.has_image_style_mappings())
            .map(|(id, style)| (id, style.label))
            .collect())
    }

    pub async fn settings_form(&self) -> Result<SettingsForm> {
        let responsive_image_style = SelectElement::new(
            "Responsive image style",
            self.style_options().await?,
        )
        .default_value(self.settings.responsive_image_style.clone())
        .required();

        let image_link = SelectElement::new(
            "Link image to",
            vec![
                ("content".to_string(), "Content".to_string()),
                ("file".to_string(), "File".to_string()),
            ],
        )
        .default_value(match self.settings.image_link {
            ImageLink::None => "",
            link => link.as_str(),
        })
        .empty_option("Nothing");

        Ok(SettingsForm {
            responsive_image_style,
            image_link,
        })
    }

    /// Check the configured style before the settings are saved.
    ///
    /// Rendering never calls this: a style deleted after configuration only
    /// degrades the output.
    pub async fn validate_settings(&self) -> Result<(), SettingsError> {
        let id = &self.settings.responsive_image_style;
        if id.is_empty() {
            return Err(SettingsError::MissingStyle);
        }

        let style = self
            .responsive_image_styles
            .load(id)
            .await?
            .ok_or_else(|| SettingsError::UnknownStyle(id.clone()))?;

        if !style.has_image_style_mappings() {
            return Err(SettingsError::StyleWithoutMappings(id.clone()));
        }
        Ok(())
    }

    /// Human-readable description of the current settings.
    pub async fn summary(&self) -> Result<Vec<String>> {
        let style = self
            .responsive_image_styles
            .load(&self.settings.responsive_image_style)
            .await?;

        let Some(style) = style else {
            return Ok(vec!["Select a responsive image style.".to_string()]);
        };

        let mut summary = vec![format!("Responsive image style: {}", style.label)];
        // Display this setting only if image is linked.
        if let Some(link) = self.settings.image_link.summary() {
            summary.push(link.to_string());
        }
        Ok(summary)
    }

    /// Build one render element per item whose file resolves.
    ///
    /// Elements keep the input order and all carry the same merged cache
    /// tags: the responsive image style's plus those of every image style it
    /// references that still exists.
    pub async fn render(&self, items: FieldItemList) -> Result<Vec<ResponsiveImageElement>> {
        let FieldItemList { entity, items } = items;
        let files = self.entities_to_view(items).await?;

        // Early opt-out if the field is empty.
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = None;
        if self.settings.image_link == ImageLink::Content {
            if entity.is_new() {
                debug!(entity_type = %entity.entity_type, "unsaved entity has no URL, rendering without link");
            } else {
                url = self.urls.entity_url(&entity);
            }
        }

        let style_id = &self.settings.responsive_image_style;
        let style = self.responsive_image_styles.load(style_id).await?;

        let mut cache = CacheMetadata::default();
        let mut image_style_ids = Vec::new();
        match &style {
            Some(style) => {
                cache.add_tags(&style.cache_tags());
                image_style_ids = style.image_style_ids();
            }
            None => {
                debug!(style = %style_id, "responsive image style not found, rendering without it");
            }
        }

        let image_styles = self.image_styles.load_multiple(&image_style_ids).await?;
        if image_styles.len() < image_style_ids.len() {
            debug!(
                style = %style_id,
                expected = image_style_ids.len(),
                found = image_styles.len(),
                "some referenced image styles are missing"
            );
        }
        for image_style in image_styles.values() {
            cache.add_tags(&image_style.cache_tags());
        }

        let resolved_id = style.map(|s| s.id).unwrap_or_default();

        Ok(files
            .into_iter()
            .map(|(file, AttributedItem { item, attributes })| {
                // Link the <picture> element to the original file.
                let url = match self.settings.image_link {
                    ImageLink::File => Some(self.urls.file_url(&file.uri)),
                    _ => url.clone(),
                };
                ResponsiveImageElement::new(item, attributes)
                    .style(resolved_id.clone())
                    .url(url)
                    .cache(cache.clone())
            })
            .collect())
    }

    /// Resolve the files referenced by `items`, keeping input order.
    ///
    /// Items without a target, or whose file no longer exists, are dropped.
    async fn entities_to_view(
        &self,
        items: Vec<AttributedItem>,
    ) -> Result<Vec<(FileInfo, AttributedItem)>> {
        let ids: Vec<String> = items
            .iter()
            .filter_map(|a| a.item.target_id.map(|id| id.to_string()))
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let files: BTreeMap<String, FileInfo> = self
            .files
            .load_multiple(&ids)
            .await
            .context("failed to load image field files")?;

        Ok(items
            .into_iter()
            .filter_map(|attributed| {
                let id = attributed.item.target_id?.to_string();
                // A file referenced twice renders twice.
                let file = files.get(&id).cloned();
                if file.is_none() {
                    debug!(file = %id, "referenced file not found, skipping item");
                }
                file.map(|f| (f, attributed))
            })
            .collect())
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vetrina_test_utils::fixtures::{self, crop_styles, test_file, wide_banner};
    use vetrina_test_utils::{FixtureStorage, FixtureUrls};

    struct Harness {
        styles: Arc<FixtureStorage<ResponsiveImageStyle>>,
        image_styles: Arc<FixtureStorage<ImageStyle>>,
        files: Arc<FixtureStorage<FileInfo>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                styles: Arc::new(FixtureStorage::with([wide_banner(), fixtures::unmapped("bare")])),
                image_styles: Arc::new(FixtureStorage::with(crop_styles())),
                files: Arc::new(FixtureStorage::new()),
            }
        }

        fn file(&self, name: &str) -> FileInfo {
            let file = test_file(name);
            self.files.insert(file.clone());
            file
        }

        fn formatter(&self, settings: FormatterSettings) -> ResponsiveImageFormatter {
            ResponsiveImageFormatter::new(
                settings,
                self.styles.clone(),
                self.image_styles.clone(),
                self.files.clone(),
                Arc::new(FixtureUrls),
            )
        }
    }

    #[tokio::test]
    async fn empty_field_skips_style_lookups() {
        let h = Harness::new();
        let formatter = h.formatter(FormatterSettings::new("wide_banner"));

        let elements = formatter
            .render(FieldItemList::new(HostEntity::unsaved("item")))
            .await
            .unwrap();

        assert!(elements.is_empty());
        assert_eq!(h.styles.counts().total(), 0);
        assert_eq!(h.image_styles.counts().total(), 0);
        assert_eq!(h.files.counts().total(), 0);
    }

    #[tokio::test]
    async fn unresolvable_files_count_as_empty() {
        let h = Harness::new();
        let formatter = h.formatter(FormatterSettings::new("wide_banner"));
        let items = FieldItemList::new(HostEntity::unsaved("item"))
            .item(FieldItem::new(Uuid::now_v7()))
            .item(FieldItem::default());

        assert!(formatter.render(items).await.unwrap().is_empty());
        assert_eq!(h.styles.counts().total(), 0);
        assert_eq!(h.image_styles.counts().total(), 0);
    }

    #[tokio::test]
    async fn one_element_per_file_in_order() {
        let h = Harness::new();
        let files: Vec<_> = ["a.jpg", "b.jpg", "c.jpg"].iter().map(|n| h.file(n)).collect();
        let formatter = h.formatter(FormatterSettings::new("wide_banner"));

        let elements = formatter.render(fixtures::field_items(&files)).await.unwrap();

        assert_eq!(elements.len(), 3);
        for (element, file) in elements.iter().zip(&files) {
            assert_eq!(element.item.target_id, Some(file.id));
            assert_eq!(element.theme, RESPONSIVE_IMAGE_FORMATTER_THEME);
            assert_eq!(element.responsive_image_style_id, "wide_banner");
            assert_eq!(element.cache, elements[0].cache);
            assert!(element.url.is_none());
        }
        assert_eq!(
            elements[0].cache.tags,
            vec![
                "config:image.style.crop_16x9",
                "config:image.style.crop_4x3",
                "config:responsive_image.styles.wide_banner",
            ]
        );
        assert_eq!(h.styles.counts().load(), 1);
        assert_eq!(h.image_styles.counts().load_multiple(), 1);
    }

    #[tokio::test]
    async fn missing_files_are_skipped() {
        let h = Harness::new();
        let kept = h.file("kept.jpg");
        let items = FieldItemList::new(HostEntity::unsaved("item"))
            .item(FieldItem::new(Uuid::now_v7()))
            .item(FieldItem::new(kept.id));

        let elements = h
            .formatter(FormatterSettings::new("wide_banner"))
            .render(items)
            .await
            .unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].item.target_id, Some(kept.id));
    }

    #[tokio::test]
    async fn attributes_move_to_the_element() {
        let h = Harness::new();
        let file = h.file("hero.jpg");
        let items = FieldItemList::new(HostEntity::unsaved("item"))
            .item(AttributedItem::from(FieldItem::new(file.id).alt("Hero")).attr("class", "hero"));

        let elements = h
            .formatter(FormatterSettings::new("wide_banner"))
            .render(items)
            .await
            .unwrap();

        assert_eq!(elements[0].item_attributes.get("class").unwrap(), "hero");
        assert_eq!(elements[0].item.alt, "Hero");
    }

    #[tokio::test]
    async fn content_link_on_unsaved_entity() {
        let h = Harness::new();
        let file = h.file("a.jpg");
        let items = FieldItemList::new(HostEntity::unsaved("item")).item(FieldItem::new(file.id));

        let elements = h
            .formatter(FormatterSettings::new("wide_banner").link(ImageLink::Content))
            .render(items)
            .await
            .unwrap();

        assert_eq!(elements.len(), 1);
        assert!(elements[0].url.is_none());
    }

    #[tokio::test]
    async fn content_link_is_shared() {
        let h = Harness::new();
        let files = vec![h.file("a.jpg"), h.file("b.jpg")];
        let items = fixtures::field_items(&files);
        let expected = format!("/item/{}", items.entity.id.unwrap());

        let elements = h
            .formatter(FormatterSettings::new("wide_banner").link(ImageLink::Content))
            .render(items)
            .await
            .unwrap();

        assert!(elements.iter().all(|e| e.url.as_deref() == Some(expected.as_str())));
    }

    #[tokio::test]
    async fn file_link_per_item() {
        let h = Harness::new();
        let files = vec![h.file("a.jpg"), h.file("b.jpg")];

        let elements = h
            .formatter(FormatterSettings::new("wide_banner").link(ImageLink::File))
            .render(fixtures::field_items(&files))
            .await
            .unwrap();

        assert_eq!(elements[0].url.as_deref(), Some("/files/images/a.jpg"));
        assert_eq!(elements[1].url.as_deref(), Some("/files/images/b.jpg"));
    }

    #[tokio::test]
    async fn missing_style_degrades() {
        let h = Harness::new();
        let file = h.file("a.jpg");
        let items = FieldItemList::new(HostEntity::unsaved("item")).item(FieldItem::new(file.id));

        let elements = h
            .formatter(FormatterSettings::new("deleted_style"))
            .render(items)
            .await
            .unwrap();

        assert_eq!(elements.len(), 1);
        assert!(elements[0].responsive_image_style_id.is_empty());
        assert!(elements[0].cache.tags.is_empty());
    }

    #[tokio::test]
    async fn deleted_image_style_drops_its_tag() {
        let h = Harness::new();
        let file = h.file("a.jpg");
        assert!(h.image_styles.remove("crop_4x3"));
        let items = FieldItemList::new(HostEntity::unsaved("item")).item(FieldItem::new(file.id));

        let elements = h
            .formatter(FormatterSettings::new("wide_banner"))
            .render(items)
            .await
            .unwrap();

        assert_eq!(elements[0].responsive_image_style_id, "wide_banner");
        assert_eq!(
            elements[0].cache.tags,
            vec![
                "config:image.style.crop_16x9",
                "config:responsive_image.styles.wide_banner",
            ]
        );
    }

    #[tokio::test]
    async fn options_exclude_unmapped_styles() {
        let h = Harness::new();
        let formatter = h.formatter(ResponsiveImageFormatter::default_settings());

        let options = formatter.style_options().await.unwrap();
        assert_eq!(
            options,
            vec![("wide_banner".to_string(), "Wide banner".to_string())]
        );

        let form = formatter.settings_form().await.unwrap();
        assert!(form.responsive_image_style.required);
        assert!(!form.responsive_image_style.has_option("bare"));
        assert!(form.image_link.has_option("file"));
        assert_eq!(form.image_link.empty_option.as_deref(), Some("Nothing"));
    }

    #[tokio::test]
    async fn summary_with_style_and_link() {
        let h = Harness::new();
        let summary = h
            .formatter(FormatterSettings::new("wide_banner").link(ImageLink::Content))
            .summary()
            .await
            .unwrap();
        assert_eq!(
            summary,
            vec!["Responsive image style: Wide banner", "Linked to content"]
        );
    }

    #[tokio::test]
    async fn summary_without_style() {
        let h = Harness::new();
        let summary = h
            .formatter(FormatterSettings::new("gone").link(ImageLink::File))
            .summary()
            .await
            .unwrap();
        assert_eq!(summary, vec!["Select a responsive image style."]);
    }

    #[tokio::test]
    async fn validate_settings() {
        let h = Harness::new();
        assert!(h.formatter(FormatterSettings::new("wide_banner")).validate_settings().await.is_ok());
        assert!(matches!(
            h.formatter(FormatterSettings::default()).validate_settings().await,
            Err(SettingsError::MissingStyle)
        ));
        assert!(matches!(
            h.formatter(FormatterSettings::new("gone")).validate_settings().await,
            Err(SettingsError::UnknownStyle(id)) if id == "gone"
        ));
        assert!(matches!(
            h.formatter(FormatterSettings::new("bare")).validate_settings().await,
            Err(SettingsError::StyleWithoutMappings(id)) if id == "bare"
        ));
    }
}
