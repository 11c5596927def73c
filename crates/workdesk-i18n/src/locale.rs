//! Translation lookup with dotted keys and `{{param}}` substitution.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::language::Language;

const EN_TABLE: &str = include_str!("locales/en.json");
const ZH_TABLE: &str = include_str!("locales/zh.json");

struct Tables {
    en: Value,
    zh: Value,
}

fn parse_table(name: &str, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::error!("Failed to parse {} translation table: {}", name, e);
        Value::Null
    })
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| Tables {
        en: parse_table("en", EN_TABLE),
        zh: parse_table("zh", ZH_TABLE),
    })
}

/// Resolved translations and formatting rules for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Locale {
    language: Language,
}

impl Locale {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Only English and Chinese ship full tables; the rest read English.
    fn table(&self) -> &'static Value {
        let tables = tables();
        match self.language {
            Language::Zh => &tables.zh,
            _ => &tables.en,
        }
    }

    /// Translate `key`. Returns the key itself when any path segment is missing.
    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    /// Translate `key` and substitute `{{name}}` placeholders from `params`.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut node = self.table();
        for segment in key.split('.') {
            match node.get(segment) {
                Some(next) => node = next,
                None => return key.to_string(),
            }
        }

        match node.as_str() {
            Some(template) => interpolate(template, params),
            None => key.to_string(),
        }
    }
}

/// Replace `{{name}}` placeholders. Unknown names are left in place.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !valid {
            out.push_str("{{");
            rest = after;
            continue;
        }

        match params.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(name);
                out.push_str("}}");
            }
        }
        rest = &after[close + 2..];
    }

    out.push_str(rest);
    out
}

/// Locale handle shared by everything that renders text.
///
/// Cloning shares the same underlying locale; `set_language` is visible to all clones.
#[derive(Debug, Clone, Default)]
pub struct SharedLocale {
    inner: Arc<RwLock<Locale>>,
}

impl SharedLocale {
    pub fn new(language: Language) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Locale::new(language))),
        }
    }

    /// Snapshot of the current locale.
    pub fn get(&self) -> Locale {
        *self.inner.read()
    }

    pub fn language(&self) -> Language {
        self.inner.read().language()
    }

    /// Re-resolve the locale. Returns true if the language changed.
    pub fn set_language(&self, language: Language) -> bool {
        let mut locale = self.inner.write();
        if locale.language() == language {
            return false;
        }
        tracing::info!("Locale changed from {} to {}", locale.language(), language);
        *locale = Locale::new(language);
        true
    }

    pub fn t(&self, key: &str) -> String {
        self.get().t(key)
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.get().t_with(key, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_lookup() {
        assert_eq!(Locale::new(Language::En).t("common.save"), "Save");
        assert_eq!(Locale::new(Language::Zh).t("common.save"), "保存");
    }

    #[test]
    fn test_nested_lookup() {
        let zh = Locale::new(Language::Zh);
        assert_eq!(zh.t("calendar.views.agenda"), "日程");
        assert_eq!(
            zh.t("settings.notifications.browser.title"),
            "浏览器通知"
        );
    }

    #[test]
    fn test_missing_key_returns_key() {
        let en = Locale::new(Language::En);
        assert_eq!(en.t("common.nope"), "common.nope");
        assert_eq!(en.t("nope.deeper.key"), "nope.deeper.key");
    }

    #[test]
    fn test_non_leaf_returns_key() {
        assert_eq!(Locale::new(Language::En).t("calendar.views"), "calendar.views");
    }

    #[test]
    fn test_other_languages_read_english_table() {
        assert_eq!(Locale::new(Language::Fr).t("common.cancel"), "Cancel");
    }

    #[test]
    fn test_params() {
        let en = Locale::new(Language::En);
        assert_eq!(
            en.t_with("calendar.eventAdded", &[("title", "Standup")]),
            "Event \"Standup\" added"
        );
        assert_eq!(
            en.t_with("eventDialog.timeValidation", &[("min", "7")]),
            "Selected time must be between 7:00 and {{max}}:00"
        );
    }

    #[test]
    fn test_interpolate_edge_cases() {
        assert_eq!(interpolate("no params", &[("a", "b")]), "no params");
        assert_eq!(interpolate("{{a}}{{a}}", &[("a", "x")]), "xx");
        assert_eq!(interpolate("open {{ only", &[]), "open {{ only");
        assert_eq!(interpolate("{{bad key}} {{k}}", &[("k", "v")]), "{{bad key}} v");
    }

    #[test]
    fn test_shared_locale_switch_is_visible_to_clones() {
        let locale = SharedLocale::new(Language::En);
        let reader = locale.clone();
        assert_eq!(reader.t("common.save"), "Save");

        assert!(locale.set_language(Language::Zh));
        assert!(!locale.set_language(Language::Zh));
        assert_eq!(reader.t("common.save"), "保存");
    }
}
