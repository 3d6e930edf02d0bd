use crate::findings::{Finding, FindingMetadata, MatchTrace};
use crate::trade_decoder::TradeRecord;
use ethernity_core::{
    types::AttackType,
    utils::{format_address, format_h256},
};

/// Procura padrões de frontrunning/sandwich nas trades de um único bloco.
///
/// Para cada candidato a primeira perna (`i`) procura a próxima trade com o
/// mesmo caminho (`j`, a vítima) e, depois dela, a primeira trade com o
/// caminho inverso da vítima enviada pela mesma conta ou para o mesmo
/// contrato que `i` (`k`, o backrun). Índices usados em um padrão não são
/// reaproveitados. Apenas a primeira vítima de cada `i` é reportada, então
/// três ou mais trades idênticas geram um único alerta.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttackMatcher;

impl AttackMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Não altera os registros: rodar duas vezes sobre a mesma lista produz
    /// os mesmos alertas.
    pub fn match_block(&self, trades: &[TradeRecord]) -> Vec<Finding> {
        let mut ordered: Vec<&TradeRecord> = trades.iter().collect();
        ordered.sort_by_key(|t| t.position);

        let n = ordered.len();
        let mut excluded = vec![false; n];
        let mut findings = Vec::new();
        let mut finding_id = 0u32;

        for i in 0..n {
            if excluded[i] {
                continue;
            }
            let first_leg = ordered[i];

            for j in (i + 1)..n {
                if excluded[j] || ordered[j].trade_summary != first_leg.trade_summary {
                    continue;
                }
                let victim = ordered[j];
                finding_id += 1;
                excluded[i] = true;
                excluded[j] = true;

                let closing_path = &victim.trade_summary_reverse;
                let mut backrun = None;
                for k in (j + 1)..n {
                    if excluded[k] {
                        continue;
                    }
                    let candidate = ordered[k];
                    if candidate.trade_summary == *closing_path && same_counterparty(first_leg, candidate) {
                        excluded[k] = true;
                        backrun = Some(candidate);
                        break;
                    }
                }

                let attack_type = if backrun.is_some() {
                    AttackType::SandwichAttack
                } else {
                    AttackType::FrontRunning
                };
                let trace = MatchTrace {
                    finding_id,
                    frontrun: first_leg.tx_hash,
                    victim: victim.tx_hash,
                    backrun: backrun.map(|b| b.tx_hash),
                };
                findings.push(Finding::attack(attack_type, victim_metadata(victim), Some(trace)));
                break;
            }
        }

        findings
    }
}

/// Mesmo contrato de destino (bot) ou mesma conta de origem
fn same_counterparty(first_leg: &TradeRecord, closing_leg: &TradeRecord) -> bool {
    first_leg.to == closing_leg.to || first_leg.from == closing_leg.from
}

fn victim_metadata(victim: &TradeRecord) -> FindingMetadata {
    FindingMetadata {
        hash: format_h256(&victim.tx_hash),
        victim: format_address(&victim.from),
        block: victim.block_number,
        position: victim.position,
        pair_address: format_address(&victim.pair_address),
        trade_summary: victim.trade_summary.to_string(),
    }
}
