use serde::{Serialize, Serializer};
use std::collections::VecDeque;
use std::fmt;

/// Separador entre segmentos na forma textual do caminho
pub const SEGMENT_SEPARATOR: &str = "->";
/// Forma textual de um swap em par não monitorado
pub const NO_PAIR: &str = "NOPAIR";

/// Um salto do caminho de uma trade
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Token de entrada trocado pelo token de saída
    Swap { input: String, output: String },
    /// Swap em um par fora da tabela monitorada
    NoPair,
}

impl PathSegment {
    pub fn swap(input: impl Into<String>, output: impl Into<String>) -> Self {
        PathSegment::Swap { input: input.into(), output: output.into() }
    }

    /// Mesmo salto na direção oposta
    pub fn inverted(&self) -> Self {
        match self {
            PathSegment::Swap { input, output } => PathSegment::Swap {
                input: output.clone(),
                output: input.clone(),
            },
            PathSegment::NoPair => PathSegment::NoPair,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Swap { input, output } => write!(f, "{} for {}", input, output),
            PathSegment::NoPair => f.write_str(NO_PAIR),
        }
    }
}

/// Caminho ordenado de swaps de uma transação, na ordem de emissão dos logs.
///
/// A comparação é estrutural: um segmento `NoPair` nunca é igual a um swap
/// real, mesmo que algum token tenha o símbolo "NOPAIR".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TradePath {
    segments: Vec<PathSegment>,
}

impl TradePath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Caminho que desfaz exatamente esta trade: ordem invertida e cada
    /// segmento com entrada/saída trocadas.
    pub fn inverse(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().map(PathSegment::inverted).collect(),
        }
    }
}

impl fmt::Display for TradePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(SEGMENT_SEPARATOR)?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl Serialize for TradePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Monta o caminho direto e o reverso ao mesmo tempo: o direto recebe
/// segmentos no fim, o reverso recebe o segmento invertido no início.
#[derive(Debug, Default)]
pub struct TradePathBuilder {
    forward: Vec<PathSegment>,
    reverse: VecDeque<PathSegment>,
}

impl TradePathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.reverse.push_front(segment.inverted());
        self.forward.push(segment);
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Retorna `(direto, reverso)`
    pub fn finish(self) -> (TradePath, TradePath) {
        (
            TradePath::new(self.forward),
            TradePath::new(self.reverse.into_iter().collect()),
        )
    }
}
