//! Process records as they are written to the output log
//!
//! Field names on the wire keep the keys already present in existing
//! `base_tjpa.jsonl` files, so logs from earlier runs and new runs can be
//! concatenated and read with the same schema.

use serde::{Deserialize, Serialize};

/// A party to a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "nome")]
    pub name: Option<String>,

    /// Procedural role, e.g. "AUTOR" or "ADVOGADO"
    #[serde(rename = "tipo")]
    pub role: Option<String>,

    /// Active or passive side
    #[serde(rename = "polo")]
    pub side: Option<String>,
}

/// One entry of a process's movement history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Date as formatted by the provider (dd/mm/yyyy hh:mm)
    #[serde(rename = "data")]
    pub date_label: Option<String>,

    #[serde(rename = "descricao")]
    pub description: Option<String>,
}

/// A process found at a canonical identifier, one line of the output log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Formatted CNJ number reported by the provider
    #[serde(rename = "numero")]
    pub number: Option<String>,

    #[serde(rename = "classe")]
    pub class: Option<String>,

    #[serde(rename = "assunto")]
    pub subject: Option<String>,

    /// Instance label, e.g. "1º Grau"
    #[serde(rename = "instancia")]
    pub instance_label: Option<String>,

    #[serde(rename = "partes", default)]
    pub parties: Vec<Party>,

    #[serde(rename = "movimentacoes", default)]
    pub movements: Vec<Movement>,
}
