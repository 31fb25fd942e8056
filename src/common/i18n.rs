// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// Catálogo em português (idioma padrão da API)
const PT: &[(&str, &str)] = &[
    ("validation.failed", "Um ou mais campos são inválidos."),
    ("validation.malformed_body", "O corpo da requisição não é um JSON válido para este recurso."),
    ("required", "Campo obrigatório."),
    ("positive_id", "O ID deve ser um número inteiro positivo."),
    ("date_format", "A data deve estar no formato YYYY-MM-DD."),
    ("notes_too_long", "Observações não podem ter mais de 500 caracteres."),
    ("name_too_long", "O nome não pode ter mais de 100 caracteres."),
    ("name_required", "O nome é obrigatório."),
    ("not_negative", "O valor não pode ser negativo."),
    ("date_rule.planned_end_before_start", "Data prevista para término não pode ser anterior à data de início."),
    ("date_rule.actual_end_before_start", "Data de desalocação não pode ser anterior à data de início."),
    ("date_rule.actual_end_before_planned_end", "Data de desalocação não pode ser anterior à data prevista para término."),
    ("date_rule.range_start_after_end", "A data inicial do período não pode ser posterior à data final."),
    ("reference_not_found.tool", "Ferramenta com ID {id} não encontrada ou inativa."),
    ("reference_not_found.cost_center", "Centro de Custo com ID {id} não encontrado ou inativo."),
    ("reference_not_found.employee", "Funcionário com ID {id} não encontrado ou inativo."),
    ("not_found.tool", "Ferramenta com ID {id} não encontrada."),
    ("not_found.cost_center", "Centro de Custo com ID {id} não encontrado."),
    ("not_found.employee", "Funcionário com ID {id} não encontrado."),
    ("not_found.allocation", "Alocação com ID {id} não encontrada."),
    ("allocation.conflict", "Já existe uma alocação ativa para esta ferramenta e funcionário no período de {start} a {end}."),
    ("period.open_end", "data indefinida"),
    ("internal.unexpected", "Ocorreu um erro inesperado."),
];

const EN: &[(&str, &str)] = &[
    ("validation.failed", "One or more fields are invalid."),
    ("validation.malformed_body", "The request body is not valid JSON for this resource."),
    ("required", "Required field."),
    ("positive_id", "The ID must be a positive integer."),
    ("date_format", "The date must use the YYYY-MM-DD format."),
    ("notes_too_long", "Notes cannot exceed 500 characters."),
    ("name_too_long", "The name cannot exceed 100 characters."),
    ("name_required", "The name is required."),
    ("not_negative", "The value cannot be negative."),
    ("date_rule.planned_end_before_start", "The planned end date cannot be earlier than the start date."),
    ("date_rule.actual_end_before_start", "The deallocation date cannot be earlier than the start date."),
    ("date_rule.actual_end_before_planned_end", "The deallocation date cannot be earlier than the planned end date."),
    ("date_rule.range_start_after_end", "The period start cannot be after the period end."),
    ("reference_not_found.tool", "Tool (Ferramenta) with ID {id} not found or inactive."),
    ("reference_not_found.cost_center", "Cost center with ID {id} not found or inactive."),
    ("reference_not_found.employee", "Employee with ID {id} not found or inactive."),
    ("not_found.tool", "Tool (Ferramenta) with ID {id} not found."),
    ("not_found.cost_center", "Cost center with ID {id} not found."),
    ("not_found.employee", "Employee with ID {id} not found."),
    ("not_found.allocation", "Allocation with ID {id} not found."),
    ("allocation.conflict", "An active allocation already exists for this tool and employee in the period {start} to {end}."),
    ("period.open_end", "open end"),
    ("internal.unexpected", "An unexpected error occurred."),
];

/// Catálogo de mensagens por idioma. As chaves são as mesmas usadas nos
/// `message` dos payloads validados.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("pt", PT.iter().copied().collect());
        catalogs.insert("en", EN.iter().copied().collect());
        Self { catalogs }
    }

    /// Busca a mensagem no idioma pedido, cai para o português e, em último
    /// caso, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Igual ao `translate`, trocando os marcadores `{nome}` pelos argumentos.
    pub fn format(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.catalogs.get(lang).and_then(|catalog| catalog.get(key)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "required"), "Campo obrigatório.");
    }

    #[test]
    fn unknown_key_is_returned_as_is() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "some.custom.code"), "some.custom.code");
    }

    #[test]
    fn placeholders_are_replaced() {
        let store = I18nStore::new();
        let message = store.format("en", "not_found.allocation", &[("id", "42".to_string())]);
        assert_eq!(message, "Allocation with ID 42 not found.");
    }

    #[test]
    fn every_portuguese_key_has_an_english_counterpart() {
        let store = I18nStore::new();
        for (key, _) in PT {
            assert!(store.lookup("en", key).is_some(), "chave sem tradução: {key}");
        }
    }
}
