// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Idiomas com catálogo próprio (ver common::i18n)
const SUPPORTED: &[&str] = &["en", "pt"];

// Nosso extrator de idioma
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

impl Locale {
    /// Escolhe o primeiro idioma suportado do cabeçalho Accept-Language.
    pub fn from_header(header_str: &str) -> Self {
        accept_language::intersection(header_str, SUPPORTED)
            .into_iter()
            .next()
            .map(Locale)
            .unwrap_or_else(|| {
                // "pt-BR" não bate com "pt" no intersection: compara só o idioma base
                accept_language::parse(header_str)
                    .iter()
                    .filter_map(|tag| tag.split('-').next())
                    .find(|lang| SUPPORTED.contains(lang))
                    .map(|lang| Locale(lang.to_string()))
                    .unwrap_or_default()
            })
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_base_language_of_regional_tag() {
        assert_eq!(Locale::from_header("pt-BR,pt;q=0.9,en;q=0.8").0, "pt");
        assert_eq!(Locale::from_header("en-US").0, "en");
        assert_eq!(Locale::from_header("fr-FR").0, "en");
    }
}
