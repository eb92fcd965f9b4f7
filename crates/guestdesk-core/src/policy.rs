use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What the pipeline does with a structured extraction in a given language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Keep the structured record as extracted.
    Trust,
    /// Send the structured record through the translator.
    Translate,
    /// Discard the structured record and re-read the image with OCR plus a language model.
    Fallback,
}

impl Route {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trust => "trust",
            Self::Translate => "translate",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing table from ISO 639-1 language codes to [`Route`]s.
///
/// Codes not in the table are trusted. Lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePolicy {
    routes: BTreeMap<String, Route>,
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self::empty()
            .with_route("ru", Route::Translate)
            .with_route("ja", Route::Fallback)
    }
}

impl LanguagePolicy {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_route(mut self, language: &str, route: Route) -> Self {
        self.set_route(language, route);
        self
    }

    pub fn set_route(&mut self, language: &str, route: Route) {
        let code = normalize(language);
        if code.is_empty() {
            return;
        }
        if route == Route::Trust {
            self.routes.remove(&code);
        } else {
            self.routes.insert(code, route);
        }
    }

    /// Builds a table from two code lists.
    ///
    /// A code listed in both is reported back as an error string naming it.
    pub fn from_lists<'a>(
        translate: impl IntoIterator<Item = &'a str>,
        fallback: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, String> {
        let mut policy = Self::empty();

        for code in translate {
            policy.set_route(code, Route::Translate);
        }

        for code in fallback {
            if policy.route_for(code) == Route::Translate {
                return Err(normalize(code));
            }
            policy.set_route(code, Route::Fallback);
        }

        Ok(policy)
    }

    #[must_use]
    pub fn route_for(&self, language: &str) -> Route {
        self.routes
            .get(&normalize(language))
            .copied()
            .unwrap_or(Route::Trust)
    }

    /// Decides the route for a detected language and the content signal
    /// of the structured record. An empty signal falls back unless the
    /// language is routed to translation.
    #[must_use]
    pub fn decide(&self, language: &str, content_signal: &str) -> Route {
        match self.route_for(language) {
            Route::Translate => Route::Translate,
            _ if content_signal.is_empty() => Route::Fallback,
            route => route,
        }
    }

    pub fn languages(&self, route: Route) -> impl Iterator<Item = &str> {
        self.routes
            .iter()
            .filter(move |(_, r)| **r == route)
            .map(|(code, _)| code.as_str())
    }
}

fn normalize(language: &str) -> String {
    language.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes() {
        let policy = LanguagePolicy::default();

        assert_eq!(policy.route_for("ru"), Route::Translate);
        assert_eq!(policy.route_for("ja"), Route::Fallback);
        assert_eq!(policy.route_for("en"), Route::Trust);
        assert_eq!(policy.route_for("de"), Route::Trust);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let policy = LanguagePolicy::default();

        assert_eq!(policy.route_for("RU"), Route::Translate);
        assert_eq!(policy.route_for(" Ja "), Route::Fallback);
    }

    #[test]
    fn test_empty_signal_forces_fallback() {
        let policy = LanguagePolicy::default();

        assert_eq!(policy.decide("en", ""), Route::Fallback);
        assert_eq!(policy.decide("(Unknown)", ""), Route::Fallback);
        assert_eq!(policy.decide("en", "Ada Lovelace"), Route::Trust);
        assert_eq!(policy.decide("ja", "山田"), Route::Fallback);
    }

    #[test]
    fn test_whitespace_signal_is_not_empty() {
        let policy = LanguagePolicy::default();

        assert_eq!(policy.decide("en", " "), Route::Trust);
    }

    #[test]
    fn test_russian_translates_before_signal_check() {
        let policy = LanguagePolicy::default();

        assert_eq!(policy.decide("ru", ""), Route::Translate);
    }

    #[test]
    fn test_from_lists() {
        let policy = LanguagePolicy::from_lists(["ru", "uk"], ["ja", "zh"]).unwrap();

        assert_eq!(policy.route_for("uk"), Route::Translate);
        assert_eq!(policy.route_for("zh"), Route::Fallback);
        assert_eq!(policy.languages(Route::Translate).collect::<Vec<_>>(), ["ru", "uk"]);
    }

    #[test]
    fn test_from_lists_rejects_overlap() {
        let err = LanguagePolicy::from_lists(["ru"], ["RU"]).unwrap_err();

        assert_eq!(err, "ru");
    }

    #[test]
    fn test_trust_route_removes_entry() {
        let policy = LanguagePolicy::default().with_route("ja", Route::Trust);

        assert_eq!(policy.languages(Route::Fallback).count(), 0);
    }
}
