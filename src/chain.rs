use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::PipelineError;

/// Networks the indexer serves. Either the name or the hex chain id parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Eth,
    Ropsten,
    Rinkeby,
    Goerli,
    Kovan,
    Polygon,
    Mumbai,
    Bsc,
    BscTestnet,
    Avalanche,
    AvalancheTestnet,
    Fantom,
}

const CHAINS: [Chain; 12] = [
    Chain::Eth,
    Chain::Ropsten,
    Chain::Rinkeby,
    Chain::Goerli,
    Chain::Kovan,
    Chain::Polygon,
    Chain::Mumbai,
    Chain::Bsc,
    Chain::BscTestnet,
    Chain::Avalanche,
    Chain::AvalancheTestnet,
    Chain::Fantom,
];

impl Chain {
    fn ids(&self) -> (&'static str, &'static str) {
        match self {
            Chain::Eth => ("eth", "0x1"),
            Chain::Ropsten => ("ropsten", "0x3"),
            Chain::Rinkeby => ("rinkeby", "0x4"),
            Chain::Goerli => ("goerli", "0x5"),
            Chain::Kovan => ("kovan", "0x2a"),
            Chain::Polygon => ("polygon", "0x89"),
            Chain::Mumbai => ("mumbai", "0x13881"),
            Chain::Bsc => ("bsc", "0x38"),
            Chain::BscTestnet => ("bsc testnet", "0x61"),
            Chain::Avalanche => ("avalanche", "0xa86a"),
            Chain::AvalancheTestnet => ("avalanche testnet", "0xa869"),
            Chain::Fantom => ("fantom", "0xfa"),
        }
    }

    /// Name form, sent as the `chain` query parameter.
    pub fn name(&self) -> &'static str {
        self.ids().0
    }

    pub fn hex_id(&self) -> &'static str {
        self.ids().1
    }
}

impl FromStr for Chain {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        CHAINS
            .iter()
            .find(|chain| chain.name() == needle || chain.hex_id() == needle)
            .copied()
            .ok_or_else(|| PipelineError::UnknownChain(s.to_string()))
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Label for log lines when no chain was given and the upstream default applies.
pub fn describe(chain: Option<Chain>) -> String {
    chain.map_or_else(|| "default".to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex_ids() {
        assert_eq!("eth".parse::<Chain>().unwrap(), Chain::Eth);
        assert_eq!("0x89".parse::<Chain>().unwrap(), Chain::Polygon);
        assert_eq!("BSC Testnet".parse::<Chain>().unwrap(), Chain::BscTestnet);
        assert_eq!("0xA86A".parse::<Chain>().unwrap(), Chain::Avalanche);
    }

    #[test]
    fn rejects_unknown_chain() {
        let err = "solana".parse::<Chain>().unwrap_err();
        assert!(matches!(err, PipelineError::UnknownChain(ref c) if c == "solana"));
    }

    #[test]
    fn every_variant_round_trips_through_its_name() {
        for chain in CHAINS {
            assert_eq!(chain.name().parse::<Chain>().unwrap(), chain);
            assert_eq!(chain.hex_id().parse::<Chain>().unwrap(), chain);
        }
    }

    #[test]
    fn describes_missing_chain_as_default() {
        assert_eq!(describe(None), "default");
        assert_eq!(describe(Some(Chain::Fantom)), "fantom");
    }
}
