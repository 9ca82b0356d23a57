// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "en";

// Catálogo de mensagens de erro, indexado por idioma e código estável.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn load() -> Self {
        let en = HashMap::from([
            ("validation", "One or more fields are invalid."),
            ("username-taken", "This username is already in use."),
            ("conflict", "A record with these values already exists."),
            ("invalid-credentials", "Invalid username or password."),
            ("invalid-token", "Missing or invalid authentication token."),
            ("cross-tenant", "This resource belongs to another business."),
            ("insufficient-role", "Your role does not allow this action."),
            ("not-found", "Resource not found."),
            ("invalid-state", "This action is not allowed in the current state."),
            ("integrity", "An unexpected error occurred."),
            ("internal", "An unexpected error occurred."),
        ]);

        let pt = HashMap::from([
            ("validation", "Um ou mais campos são inválidos."),
            ("username-taken", "Este nome de usuário já está em uso."),
            ("conflict", "Já existe um registro com esses valores."),
            ("invalid-credentials", "Usuário ou senha inválidos."),
            ("invalid-token", "Token de autenticação inválido ou ausente."),
            ("cross-tenant", "Este recurso pertence a outro negócio."),
            ("insufficient-role", "Seu cargo não permite esta ação."),
            ("not-found", "Recurso não encontrado."),
            ("invalid-state", "Esta ação não é permitida no estado atual."),
            ("integrity", "Ocorreu um erro inesperado."),
            ("internal", "Ocorreu um erro inesperado."),
        ]);

        Self {
            catalogs: HashMap::from([("en", en), ("pt", pt)]),
        }
    }

    /// Traduz o código; cai para inglês e, por fim, para o próprio código.
    pub fn translate<'a>(&'a self, lang: &str, code: &'a str) -> &'a str {
        self.catalogs
            .get(lang)
            .and_then(|catalog| catalog.get(code))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|catalog| catalog.get(code)))
            .copied()
            .unwrap_or(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_then_code() {
        let store = I18nStore::load();
        assert_eq!(store.translate("pt", "not-found"), "Recurso não encontrado.");
        assert_eq!(store.translate("de", "not-found"), "Resource not found.");
        assert_eq!(store.translate("pt", "no-such-code"), "no-such-code");
    }
}
