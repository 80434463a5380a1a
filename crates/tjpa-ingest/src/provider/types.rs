//! Provider response documents
//!
//! The provider is loose about scalar types (codes arrive as numbers or
//! strings, labels are sometimes null), so scalar fields are kept as
//! [`Value`] and normalized when converted into [`ProcessRecord`]s.

use serde::Deserialize;
use serde_json::Value;
use tjpa_common::{Movement, Party, ProcessRecord};

/// Response of the process lookup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessLookupResponse {
    #[serde(default)]
    pub lista_processos: Vec<ProcessEntry>,
}

/// One process as listed by the provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEntry {
    #[serde(default)]
    pub numero_formatado: Value,
    #[serde(default)]
    pub classe: Value,
    #[serde(default)]
    pub assunto: Value,
    #[serde(default)]
    pub instancia: Value,
    #[serde(default)]
    pub partes: Vec<PartyEntry>,
    /// Document code, first half of the movement lookup key
    #[serde(default)]
    pub cd_doc_processo: Value,
    /// Instance code, second half of the movement lookup key
    #[serde(default)]
    pub cd_instancia: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyEntry {
    #[serde(default)]
    pub nome: Value,
    #[serde(default)]
    pub tipo: Value,
    #[serde(default)]
    pub polo: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementEntry {
    #[serde(default)]
    pub data_movimentacao_formatada: Value,
    #[serde(default)]
    pub texto_movimentacao: Value,
}

impl ProcessEntry {
    /// Document and instance codes, when both are present.
    ///
    /// A code is present when it is truthy: a non-empty string (whitespace
    /// included), a non-zero number or `true`. Null, `false`, empty strings,
    /// zero and containers count as absent.
    pub fn movement_key(&self) -> Option<(String, String)> {
        Some((
            linkage_code(&self.cd_doc_processo)?,
            linkage_code(&self.cd_instancia)?,
        ))
    }

    pub fn into_record(self, movements: Vec<Movement>) -> ProcessRecord {
        ProcessRecord {
            number: text(&self.numero_formatado),
            class: text(&self.classe),
            subject: text(&self.assunto),
            instance_label: text(&self.instancia),
            parties: self.partes.iter().map(PartyEntry::to_party).collect(),
            movements,
        }
    }
}

impl PartyEntry {
    fn to_party(&self) -> Party {
        Party {
            name: text(&self.nome),
            role: text(&self.tipo),
            side: text(&self.polo),
        }
    }
}

impl MovementEntry {
    pub fn to_movement(&self) -> Movement {
        Movement {
            date_label: text(&self.data_movimentacao_formatada),
            description: text(&self.texto_movimentacao),
        }
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn linkage_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|v| v != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some(true.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_with_numeric_codes() {
        let entry: ProcessEntry = serde_json::from_value(json!({
            "numeroFormatado": "0818800-53.2023.8.14.0040",
            "classe": "PROCEDIMENTO COMUM CÍVEL",
            "assunto": "Indenização por Dano Moral",
            "instancia": 1,
            "partes": [{"nome": "MARIA", "tipo": "AUTOR", "polo": "ATIVO"}],
            "cdDocProcesso": 998877,
            "cdInstancia": 1
        }))
        .unwrap();

        assert_eq!(
            entry.movement_key(),
            Some(("998877".to_string(), "1".to_string()))
        );

        let record = entry.into_record(Vec::new());
        assert_eq!(record.instance_label.as_deref(), Some("1"));
        assert_eq!(record.parties.len(), 1);
        assert_eq!(record.parties[0].side.as_deref(), Some("ATIVO"));
    }

    #[test]
    fn test_missing_or_blank_codes_skip_movements() {
        let missing: ProcessEntry =
            serde_json::from_value(json!({"cdDocProcesso": "abc"})).unwrap();
        assert_eq!(missing.movement_key(), None);

        let zero: ProcessEntry =
            serde_json::from_value(json!({"cdDocProcesso": 0, "cdInstancia": 2})).unwrap();
        assert_eq!(zero.movement_key(), None);

        let blank: ProcessEntry =
            serde_json::from_value(json!({"cdDocProcesso": "12", "cdInstancia": ""})).unwrap();
        assert_eq!(blank.movement_key(), None);

        let unset: ProcessEntry =
            serde_json::from_value(json!({"cdDocProcesso": false, "cdInstancia": 1})).unwrap();
        assert_eq!(unset.movement_key(), None);
    }

    #[test]
    fn test_truthy_codes_are_present() {
        let spaced: ProcessEntry =
            serde_json::from_value(json!({"cdDocProcesso": " ", "cdInstancia": 1})).unwrap();
        assert_eq!(spaced.movement_key(), Some((" ".to_string(), "1".to_string())));

        let flagged: ProcessEntry =
            serde_json::from_value(json!({"cdDocProcesso": 77, "cdInstancia": true})).unwrap();
        assert_eq!(flagged.movement_key(), Some(("77".to_string(), "true".to_string())));
    }

    #[test]
    fn test_absent_fields_become_null() {
        let entry: ProcessEntry = serde_json::from_value(json!({})).unwrap();
        let record = entry.into_record(Vec::new());
        assert_eq!(record.number, None);
        assert!(record.parties.is_empty());
    }

    #[test]
    fn test_movement_entry() {
        let entry: MovementEntry = serde_json::from_value(json!({
            "dataMovimentacaoFormatada": "10/03/2023 09:12",
            "textoMovimentacao": "Distribuído por sorteio",
            "cdMovimentacao": 55
        }))
        .unwrap();
        let movement = entry.to_movement();
        assert_eq!(movement.date_label.as_deref(), Some("10/03/2023 09:12"));
        assert_eq!(movement.description.as_deref(), Some("Distribuído por sorteio"));
    }
}
