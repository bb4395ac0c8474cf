use derive_new::new;

/// Target language of the remote project with every code form a translation
/// template can refer to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct Language {
    /// Remote identifier, also used in `excluded-target-languages` (`fr`, `es-ES`).
    pub id: String,
    pub name: String,
    pub two_letters_code: String,
    pub three_letters_code: String,
    /// `fr-FR`
    pub locale: String,
    /// `fr-rFR`
    pub android_code: String,
    /// `fr.lproj`
    pub osx_code: String,
    /// `fr`
    pub osx_locale: String,
}

impl Language {
    /// Language described only by an id and a locale, other codes derived the
    /// way the remote project derives them for simple locales.
    pub fn from_locale(id: &str, name: &str, locale: &str) -> Self {
        let (language, region) = match locale.split_once('-') {
            Some((language, region)) => (language, Some(region)),
            None => (locale, None),
        };

        Self {
            id: id.to_string(),
            name: name.to_string(),
            two_letters_code: language.to_string(),
            three_letters_code: String::new(),
            locale: locale.to_string(),
            android_code: match region {
                Some(region) => format!("{language}-r{region}"),
                None => language.to_string(),
            },
            osx_code: format!("{language}.lproj"),
            osx_locale: language.to_string(),
        }
    }
}
