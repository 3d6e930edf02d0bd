use ethernity_core::types::{AttackType, FindingType, Severity, TransactionHash};
use serde::Serialize;

pub const ALERT_ID: &str = "FORTA-UNISWAP-V2-SANDWICH-1";
pub const FINDING_NAME: &str = "Uniswap V2 Arbitrage Attack Detected";
pub const PROTOCOL: &str = "ethereum";

/// Metadados do alerta, sempre referentes à transação vítima
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingMetadata {
    pub hash: String,
    pub victim: String,
    pub block: u64,
    pub position: u64,
    pub pair_address: String,
    pub trade_summary: String,
}

/// Anotação de diagnóstico: quais transações formaram o padrão
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTrace {
    pub finding_id: u32,
    pub frontrun: TransactionHash,
    pub victim: TransactionHash,
    pub backrun: Option<TransactionHash>,
}

impl MatchTrace {
    /// Rótulos `A1`/`V`/`A2` de cada participante
    pub fn labels(&self) -> Vec<(String, TransactionHash)> {
        let mut out = vec![
            (format!("A1 id={}", self.finding_id), self.frontrun),
            (format!("V id={}", self.finding_id), self.victim),
        ];
        if let Some(backrun) = self.backrun {
            out.push((format!("A2 id={}", self.finding_id), backrun));
        }
        out
    }
}

/// Alerta devolvido ao host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub alert_id: String,
    pub name: String,
    pub description: String,
    pub protocol: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    /// Já presente no texto de `description`
    #[serde(skip)]
    pub attack_type: AttackType,
    pub metadata: FindingMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<MatchTrace>,
}

impl Finding {
    pub fn attack(attack_type: AttackType, metadata: FindingMetadata, trace: Option<MatchTrace>) -> Self {
        Self {
            alert_id: ALERT_ID.to_string(),
            name: FINDING_NAME.to_string(),
            description: format!("Attack type: {}", attack_type),
            protocol: PROTOCOL.to_string(),
            severity: Severity::Medium,
            finding_type: FindingType::Suspicious,
            attack_type,
            metadata,
            trace,
        }
    }
}

/// Acumulador de alertas até o próximo limite de bloco.
///
/// O flush devolve tudo o que foi acumulado, sem relação com o bloco que o
/// disparou.
#[derive(Debug, Default)]
pub struct FindingSink {
    pending: Vec<Finding>,
}

impl FindingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.pending.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.pending.extend(findings);
    }

    /// Transfere os alertas acumulados ao chamador e esvazia o acumulador
    pub fn flush(&mut self) -> Vec<Finding> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
