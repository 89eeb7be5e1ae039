//! Localized bot messages backed by Fluent bundles.

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use tracing::warn;
use unic_langid::LanguageIdentifier;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "pt"];

const EN_RESOURCE: &str = include_str!("../locales/en/main.ftl");
const PT_RESOURCE: &str = include_str!("../locales/pt/main.ftl");

/// Localization manager for the bot
pub struct LocalizationManager {
    bundles: HashMap<&'static str, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every supported language loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();
        bundles.insert("en", Self::create_bundle("en", EN_RESOURCE)?);
        bundles.insert("pt", Self::create_bundle("pt", PT_RESOURCE)?);
        Ok(Self { bundles })
    }

    fn create_bundle(locale: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let langid: LanguageIdentifier = locale.parse()?;
        let mut bundle = FluentBundle::new_concurrent(vec![langid]);
        // plain text output, Telegram does not need bidi isolation marks
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid {locale} resource: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate {locale} messages: {errors:?}"))?;

        Ok(bundle)
    }

    /// Get a localized message in the given language, falling back to English
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) else {
            return format!("Missing translation: {key}");
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(value.to_string()));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, language, errors = ?errors, "Message formatted with errors");
        }

        value.into_owned()
    }
}

/// Map a Telegram language code onto a supported language
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    let primary = language_code
        .and_then(|code| code.split(['-', '_']).next())
        .map(|code| code.to_ascii_lowercase());

    match primary {
        Some(code) => SUPPORTED_LANGUAGES
            .iter()
            .copied()
            .find(|supported| *supported == code)
            .unwrap_or(DEFAULT_LANGUAGE),
        None => DEFAULT_LANGUAGE,
    }
}

static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_none() {
        let manager = LocalizationManager::new()?;
        // a concurrent initializer winning the race is fine
        let _ = LOCALIZATION_MANAGER.set(manager);
    }
    Ok(())
}

fn manager() -> Option<&'static LocalizationManager> {
    let manager = LOCALIZATION_MANAGER.get();
    if manager.is_none() {
        warn!("Localization used before init_localization");
    }
    manager
}

/// Localized message for the user's language code
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    match manager() {
        Some(manager) => manager.get_message_in_language(key, detect_language(language_code), None),
        None => format!("Missing translation: {key}"),
    }
}

/// Localized message with arguments for the user's language code
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let args_map: HashMap<&str, &str> = args.iter().copied().collect();
    match manager() {
        Some(manager) => {
            manager.get_message_in_language(key, detect_language(language_code), Some(&args_map))
        }
        None => format!("Missing translation: {key}"),
    }
}
