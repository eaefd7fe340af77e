//! Preferred-language selection for series packages.
//!
//! TheTVDB publishes a fixed set of two-letter language documents. The
//! language used for a fetch is the first supported tag found in the caller's
//! preference list, falling back to [`DEFAULT_LANGUAGE`].

/// Language used when no preference matches.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages TheTVDB serves package documents in.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "sv", "no", "da", "fi", "nl", "de", "it", "es", "fr", "pl", "hu", "el", "tr", "ru",
    "he", "ja", "pt", "zh", "cs", "sl", "hr", "ko",
];

/// Environment variables consulted for the process locale, in priority order.
const LOCALE_VARIABLES: &[&str] = &["LANGUAGE", "LC_ALL", "LC_MESSAGES", "LANG"];

/// Return the canonical supported tag for `tag`, if it is supported.
pub fn supported_language(tag: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|lang| lang.eq_ignore_ascii_case(tag.trim()))
}

/// Pick the first supported two-letter tag from a preference list.
///
/// Entries that are not exactly two letters (`"en_US"`, `"C"`) are skipped;
/// callers wanting regional locales considered should expand them with
/// [`locale_variants`] first.
pub fn preferred_language<I, S>(preferences: I) -> &'static str
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    preferences
        .into_iter()
        .filter(|tag| tag.as_ref().trim().len() == 2)
        .find_map(|tag| supported_language(tag.as_ref()))
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Expand a POSIX locale name into progressively less specific variants.
///
/// `"pt_BR.UTF-8"` yields `pt_BR.UTF-8`, `pt_BR`, `pt.UTF-8`, `pt`.
pub fn locale_variants(locale: &str) -> Vec<String> {
    let locale = locale.trim();
    if locale.is_empty() || locale == "C" || locale == "POSIX" {
        return Vec::new();
    }

    let (rest, modifier) = match locale.split_once('@') {
        Some((rest, modifier)) => (rest, Some(modifier)),
        None => (locale, None),
    };
    let (rest, codeset) = match rest.split_once('.') {
        Some((rest, codeset)) => (rest, Some(codeset)),
        None => (rest, None),
    };
    let (language, territory) = match rest.split_once('_') {
        Some((language, territory)) => (language, Some(territory)),
        None => (rest, None),
    };

    let mut variants = Vec::new();
    let mut push = |value: String| {
        if !variants.contains(&value) {
            variants.push(value);
        }
    };

    push(locale.to_string());
    if let Some(territory) = territory {
        if let Some(codeset) = codeset {
            push(format!("{language}_{territory}.{codeset}"));
        }
        if let Some(modifier) = modifier {
            push(format!("{language}_{territory}@{modifier}"));
        }
        push(format!("{language}_{territory}"));
    }
    if let Some(codeset) = codeset {
        push(format!("{language}.{codeset}"));
    }
    if let Some(modifier) = modifier {
        push(format!("{language}@{modifier}"));
    }
    push(language.to_string());

    variants
}

/// Language preferences of the current process, most preferred first.
///
/// `LANGUAGE` may hold a colon-separated list; the other variables hold a
/// single locale. Lookup stops at the first variable that is set.
pub fn system_language_names() -> Vec<String> {
    let value = LOCALE_VARIABLES
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty());

    value
        .map(|value| value.split(':').flat_map(locale_variants).collect())
        .unwrap_or_default()
}
